//! Record synthesis for the synth-source generation engine.
//!
//! This crate turns collection settings into an endless supply of records.
//! Each collection owns its own counter and randomness source; several
//! collections are fanned out through a [`CombinedGenerator`].
//!
//! # Architecture
//!
//! ```text
//! FieldSpec / cached file
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ PayloadGenerator │   raw | structured | file
//! └────────┬─────────┘
//!          ▼
//! ┌─────────────────────┐
//! │ CollectionGenerator │   counter, operations, rng, post-processor
//! └────────┬────────────┘
//!          ▼
//! ┌───────────────────┐
//! │ CombinedGenerator │   random pick, index-prefixed positions
//! └────────┬──────────┘
//!          ▼
//!        Record
//! ```
//!
//! # Example
//!
//! ```rust
//! use record_core::{FieldSpec, FieldType, Operation};
//! use record_generator::{CollectionGenerator, PayloadFormat, PayloadGenerator, RecordGenerator};
//!
//! let spec = FieldSpec::new().with_field("id", FieldType::Int);
//! let payload = PayloadGenerator::fields(spec, PayloadFormat::Raw);
//! let mut generator = CollectionGenerator::new("users", vec![Operation::Create], payload)
//!     .unwrap()
//!     .with_seed(42);
//!
//! let record = generator.next_record();
//! assert_eq!(record.position.as_str(), "1");
//! assert_eq!(record.collection(), Some("users"));
//! ```
//!
//! # Field types
//!
//! - `int` - Random non-negative 64-bit integer
//! - `string` - Random dictionary word
//! - `time` - Current UTC instant
//! - `bool` - Fair coin flip
//! - `duration` - Whole seconds in `[0, 1000)`

pub mod combined;
pub mod error;
pub mod generator;
pub mod generators;
pub mod payload;
pub mod schema;

// Re-exports for convenience
pub use combined::{combine, CombinedGenerator};
pub use error::GeneratorError;
pub use generator::{CollectionGenerator, PostProcessor, RecordGenerator};
pub use payload::{PayloadFormat, PayloadGenerator};
pub use schema::SchemaAttacher;
