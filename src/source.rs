//! The pull orchestrator.
//!
//! Each pull synthesizes a record first, then waits for the burst schedule
//! and the rate limiter, so that synthesis time is not added on top of the
//! scheduled delay.

use crate::burst::BurstScheduler;
use crate::config::{CollectionConfig, Config, FormatType};
use crate::error::SourceError;
use crate::rate_limit::RateLimiter;
use record_core::{FieldSpec, Position, Record};
use record_generator::{
    combine, CollectionGenerator, GeneratorError, PayloadFormat, PayloadGenerator,
    PostProcessor, RecordGenerator, SchemaAttacher,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Counters describing what a source has done so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMetrics {
    /// Records returned by `pull`
    pub records_produced: u64,
    /// Time spent blocked in the burst schedule
    pub burst_wait: Duration,
    /// Time spent blocked in the rate limiter
    pub rate_limit_wait: Duration,
}

/// Builds a [`Source`] from a configuration plus optional injected hooks.
pub struct SourceBuilder {
    config: Config,
    post_processors: HashMap<String, Box<dyn PostProcessor>>,
}

impl SourceBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            post_processors: HashMap::new(),
        }
    }

    /// Install a post-processor for one collection (empty name for the
    /// default collection). It replaces any built-in schema attachment.
    pub fn post_processor(
        mut self,
        collection: impl Into<String>,
        processor: impl PostProcessor + 'static,
    ) -> Self {
        self.post_processors
            .insert(collection.into(), Box::new(processor));
        self
    }

    /// Validate the configuration and wire up generators, burst schedule and
    /// rate limiter. Payload files are read here.
    pub fn build(mut self) -> Result<Source, SourceError> {
        self.config.validate()?;

        let collections = self.config.collection_configs();
        if let Some(unknown) = self
            .post_processors
            .keys()
            .find(|name| !collections.iter().any(|(c, _)| c == *name))
        {
            return Err(SourceError::UnknownCollection(unknown.clone()));
        }

        let mut generators: Vec<Box<dyn RecordGenerator>> = Vec::with_capacity(collections.len());
        for (index, (name, collection)) in collections.iter().enumerate() {
            let hook = self.post_processors.remove(name);
            let generator = build_collection(
                name,
                collection,
                hook,
                self.config.seed.map(|seed| seed_for_index(seed, index as u64 + 1)),
            )
            .map_err(|source| SourceError::Generator {
                collection: name.clone(),
                source,
            })?;
            generators.push(Box::new(generator));
        }

        let generator = combine(
            generators,
            self.config.seed.map(|seed| seed_for_index(seed, 0)),
        )
        .map_err(|source| SourceError::Generator {
            collection: String::new(),
            source,
        })?;

        let now = Instant::now();
        let burst = BurstScheduler::new(
            self.config.burst.sleep_time,
            self.config.burst.generate_time,
            now,
        );
        let rate_limiter = RateLimiter::new(self.config.rate_limit(), now);

        info!(
            "Built source with {} collection(s), rate limit {}, burst {}, record count {}",
            collections.len(),
            describe_rate(rate_limiter.rate()),
            describe_burst(&self.config),
            describe_count(self.config.record_count),
        );

        Ok(Source {
            generator,
            burst,
            rate_limiter,
            record_count: self.config.record_count,
            metrics: SourceMetrics::default(),
        })
    }
}

/// Derive a per-generator seed so seeded collections do not share a stream.
fn seed_for_index(seed: u64, index: u64) -> u64 {
    seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}

fn build_collection(
    name: &str,
    collection: &CollectionConfig,
    hook: Option<Box<dyn PostProcessor>>,
    seed: Option<u64>,
) -> Result<CollectionGenerator, GeneratorError> {
    let format = &collection.format;
    let payload = match format.format_type {
        FormatType::File => {
            let path = format.path.clone().unwrap_or_default();
            PayloadGenerator::from_file(path)?
        }
        FormatType::Raw => {
            PayloadGenerator::fields(FieldSpec::parse(&format.options)?, PayloadFormat::Raw)
        }
        FormatType::Structured => PayloadGenerator::fields(
            FieldSpec::parse(&format.options)?,
            PayloadFormat::Structured,
        ),
    };

    let schema = match (&format.schema_subject, payload.field_spec()) {
        (Some(subject), Some(spec)) => Some(SchemaAttacher::new(name, subject, spec)),
        _ => None,
    };

    let mut generator = CollectionGenerator::new(name, collection.operations.clone(), payload)?;
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }
    match (hook, schema) {
        (Some(hook), _) => generator = generator.with_boxed_post_processor(hook),
        (None, Some(schema)) => generator = generator.with_post_processor(schema),
        (None, None) => {}
    }
    Ok(generator)
}

fn describe_rate(rate: f64) -> String {
    if rate > 0.0 {
        format!("{rate}/s")
    } else {
        "unlimited".to_string()
    }
}

fn describe_burst(config: &Config) -> String {
    if config.burst.is_enabled() {
        format!(
            "sleep {:?} / generate {:?}",
            config.burst.sleep_time, config.burst.generate_time
        )
    } else {
        "disabled".to_string()
    }
}

fn describe_count(count: u64) -> String {
    if count > 0 {
        count.to_string()
    } else {
        "unlimited".to_string()
    }
}

/// Pull-based record source.
///
/// A single caller is expected to pull sequentially. All waits end as soon
/// as the cancellation token fires.
pub struct Source {
    generator: Box<dyn RecordGenerator>,
    burst: BurstScheduler,
    rate_limiter: RateLimiter,
    /// Record ceiling; zero means unlimited
    record_count: u64,
    metrics: SourceMetrics,
}

impl Source {
    /// Build a source without injected hooks.
    pub fn build(config: Config) -> Result<Self, SourceError> {
        SourceBuilder::new(config).build()
    }

    /// Pull the next record.
    ///
    /// Once the record ceiling is reached this blocks until `cancel` fires
    /// and then reports cancellation; it never signals end-of-stream.
    pub async fn pull(&mut self, cancel: &CancellationToken) -> Result<Record, SourceError> {
        if cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }

        if self.is_exhausted() {
            debug!(
                "Produced all {} records, blocking until cancelled",
                self.record_count
            );
            cancel.cancelled().await;
            return Err(SourceError::Cancelled);
        }

        let record = self.generator.next_record();

        self.metrics.burst_wait += self.burst.wait(cancel).await?;
        self.metrics.rate_limit_wait += self.rate_limiter.wait(cancel).await?;

        self.metrics.records_produced += 1;
        Ok(record)
    }

    /// Acknowledge a record. Nothing is tracked.
    pub fn ack(&self, position: &Position) {
        debug!("Got ack for position {}", position);
    }

    /// Whether the record ceiling has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.record_count > 0 && self.metrics.records_produced >= self.record_count
    }

    pub fn metrics(&self) -> &SourceMetrics {
        &self.metrics
    }

    pub fn burst(&self) -> &BurstScheduler {
        &self.burst
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
