//! Core types for the synth-source generation engine.
//!
//! This crate provides the data model shared by the generator and the
//! pull-based source:
//!
//! - [`Operation`] - The change type a record represents
//! - [`FieldType`] / [`FieldSpec`] - Field schemas for synthesized payloads
//! - [`FieldValue`] / [`PayloadValue`] - Synthesized values and payloads
//! - [`Record`] - The unit produced per pull
//!
//! # Architecture
//!
//! ```text
//! record-core (this crate)
//!    │
//!    ├─── record-generator  (synthesizes records from these types)
//!    │
//!    └─── synth-source      (schedules and rate-limits pulls)
//! ```
//!
//! # Example
//!
//! ```rust
//! use record_core::{FieldSpec, FieldType, Operation};
//!
//! let spec = FieldSpec::new()
//!     .with_field("id", FieldType::Int)
//!     .with_field("name", FieldType::String);
//!
//! assert_eq!(spec.len(), 2);
//! assert!(Operation::Update.has_before());
//! ```

pub mod record;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use record::{Metadata, Payload, Position, Record};
pub use types::{FieldSpec, FieldSpecError, FieldType, FieldTypeError, Operation, OperationParseError};
pub use values::{FieldValue, PayloadValue, StructuredData};
