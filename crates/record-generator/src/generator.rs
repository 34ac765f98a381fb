//! Per-collection record generator.

use crate::error::GeneratorError;
use crate::generators::word::random_word;
use crate::payload::PayloadGenerator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use record_core::{Metadata, Operation, Payload, Position, Record};

/// Source of records.
pub trait RecordGenerator: Send {
    /// Produce the next record.
    fn next_record(&mut self) -> Record;
}

/// Hook that receives every otherwise-complete record before it is returned.
pub trait PostProcessor: Send + Sync {
    fn process(&self, record: Record) -> Record;
}

impl<F> PostProcessor for F
where
    F: Fn(Record) -> Record + Send + Sync,
{
    fn process(&self, record: Record) -> Record {
        self(record)
    }
}

/// Generates records for a single collection.
///
/// Positions are the generator's own call counter, starting at 1.
pub struct CollectionGenerator {
    /// Collection name; empty for the default collection
    collection: String,
    /// Operations to pick from, never empty
    operations: Vec<Operation>,
    payload: PayloadGenerator,
    post_process: Option<Box<dyn PostProcessor>>,
    rng: StdRng,
    count: u64,
}

impl CollectionGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(
        collection: impl Into<String>,
        operations: Vec<Operation>,
        payload: PayloadGenerator,
    ) -> Result<Self, GeneratorError> {
        let collection = collection.into();
        if operations.is_empty() {
            return Err(GeneratorError::NoOperations { collection });
        }
        Ok(Self {
            collection,
            operations,
            payload,
            post_process: None,
            rng: StdRng::from_os_rng(),
            count: 0,
        })
    }

    /// Replace the randomness source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Install a post-processing hook.
    pub fn with_post_processor(mut self, processor: impl PostProcessor + 'static) -> Self {
        self.post_process = Some(Box::new(processor));
        self
    }

    /// Install an already boxed post-processing hook.
    pub fn with_boxed_post_processor(mut self, processor: Box<dyn PostProcessor>) -> Self {
        self.post_process = Some(processor);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of records produced so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    fn pick_operation(&mut self) -> Operation {
        if self.operations.len() == 1 {
            return self.operations[0];
        }
        let idx = self.rng.random_range(0..self.operations.len());
        self.operations[idx]
    }
}

impl RecordGenerator for CollectionGenerator {
    fn next_record(&mut self) -> Record {
        self.count += 1;

        let operation = self.pick_operation();
        let metadata = Metadata::now().with_collection(&self.collection);
        let key = random_word(&mut self.rng);

        // Before and after are synthesized independently.
        let mut payload = Payload::default();
        if operation.has_before() {
            payload.before = Some(self.payload.next_payload(&mut self.rng));
        }
        if operation.has_after() {
            payload.after = Some(self.payload.next_payload(&mut self.rng));
        }

        let record = Record {
            position: Position::from_counter(self.count),
            operation,
            metadata,
            key,
            payload,
        };

        match &self.post_process {
            Some(processor) => processor.process(record),
            None => record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadFormat;
    use record_core::{FieldSpec, FieldType};
    use std::collections::HashSet;

    fn raw_generator(collection: &str, operations: Vec<Operation>) -> CollectionGenerator {
        let spec = FieldSpec::new().with_field("id", FieldType::Int);
        CollectionGenerator::new(
            collection,
            operations,
            PayloadGenerator::fields(spec, PayloadFormat::Raw),
        )
        .unwrap()
        .with_seed(42)
    }

    #[test]
    fn test_positions_are_sequential() {
        let mut generator = raw_generator("", vec![Operation::Create]);

        for i in 1..=10u64 {
            let record = generator.next_record();
            assert_eq!(record.position.as_str(), i.to_string());
        }
        assert_eq!(generator.count(), 10);
    }

    #[test]
    fn test_single_operation_always_selected() {
        let mut generator = raw_generator("", vec![Operation::Delete]);

        for _ in 0..50 {
            assert_eq!(generator.next_record().operation, Operation::Delete);
        }
    }

    #[test]
    fn test_payload_matches_operation() {
        let mut generator = raw_generator("", Operation::ALL.to_vec());
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let record = generator.next_record();
            assert!(
                record.payload_matches_operation(),
                "bad payload for {}",
                record.operation
            );
            seen.insert(record.operation);
        }

        // Uniform selection over 200 draws reaches every operation.
        assert_eq!(seen.len(), Operation::ALL.len());
    }

    #[test]
    fn test_collection_metadata() {
        let mut named = raw_generator("users", vec![Operation::Create]);
        assert_eq!(named.next_record().collection(), Some("users"));

        let mut default = raw_generator("", vec![Operation::Create]);
        assert_eq!(default.next_record().collection(), None);
    }

    #[test]
    fn test_created_at_is_now() {
        let mut generator = raw_generator("", vec![Operation::Create]);
        let before = chrono::Utc::now();
        let record = generator.next_record();
        let after = chrono::Utc::now();

        assert!(record.metadata.created_at >= before && record.metadata.created_at <= after);
        assert!(!record.key.is_empty());
    }

    #[test]
    fn test_post_processor_can_mutate_record() {
        let mut generator = raw_generator("users", vec![Operation::Create]).with_post_processor(
            |mut record: Record| {
                record.metadata.set_attribute("tagged", "yes");
                record
            },
        );

        let record = generator.next_record();
        assert_eq!(record.metadata.attribute("tagged"), Some("yes"));
    }

    #[test]
    fn test_no_operations_rejected() {
        let spec = FieldSpec::new().with_field("id", FieldType::Int);
        let result = CollectionGenerator::new(
            "users",
            Vec::new(),
            PayloadGenerator::fields(spec, PayloadFormat::Raw),
        );
        assert!(matches!(result, Err(GeneratorError::NoOperations { .. })));
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut gen1 = raw_generator("", Operation::ALL.to_vec());
        let mut gen2 = raw_generator("", Operation::ALL.to_vec());

        for _ in 0..20 {
            let r1 = gen1.next_record();
            let r2 = gen2.next_record();
            assert_eq!(r1.operation, r2.operation);
            assert_eq!(r1.key, r2.key);
            assert_eq!(r1.payload, r2.payload);
        }
    }
}
