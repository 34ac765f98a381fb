//! Fan-out across several record generators.

use crate::error::GeneratorError;
use crate::generator::RecordGenerator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use record_core::Record;

/// Combine generators into one.
///
/// A single generator is returned as-is, so its positions are not rewritten.
/// `seed` only affects which generator is picked for each record.
pub fn combine(
    mut generators: Vec<Box<dyn RecordGenerator>>,
    seed: Option<u64>,
) -> Result<Box<dyn RecordGenerator>, GeneratorError> {
    match generators.len() {
        0 => Err(GeneratorError::NoGenerators),
        1 => Ok(generators.remove(0)),
        _ => {
            let mut combined = CombinedGenerator::new(generators)?;
            if let Some(seed) = seed {
                combined = combined.with_seed(seed);
            }
            Ok(Box::new(combined))
        }
    }
}

/// Picks one generator uniformly at random per record.
///
/// Positions are rewritten to `<index><position>`, with the index zero-padded
/// to a fixed width so that no two `(index, counter)` pairs produce the same
/// composite position.
pub struct CombinedGenerator {
    generators: Vec<Box<dyn RecordGenerator>>,
    prefix_width: usize,
    rng: StdRng,
}

impl CombinedGenerator {
    pub fn new(generators: Vec<Box<dyn RecordGenerator>>) -> Result<Self, GeneratorError> {
        if generators.is_empty() {
            return Err(GeneratorError::NoGenerators);
        }
        let prefix_width = (generators.len() - 1).to_string().len();
        Ok(Self {
            generators,
            prefix_width,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Replace the selection randomness with a seeded source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    fn prefix(&self, index: usize) -> String {
        format!("{index:0width$}", width = self.prefix_width)
    }
}

impl RecordGenerator for CombinedGenerator {
    fn next_record(&mut self) -> Record {
        let index = self.rng.random_range(0..self.generators.len());
        let mut record = self.generators[index].next_record();
        record.position = record.position.with_prefix(&self.prefix(index));
        record
    }
}
