//! Error types for record generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing generators.
///
/// Once a generator is built, producing records cannot fail.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The payload file could not be read.
    #[error("Failed to read payload file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field spec contains a type tag outside the known set.
    #[error("Field {field:?} contains invalid type {tag:?}")]
    UnknownFieldType { field: String, tag: String },

    /// A collection was configured without operations.
    #[error("Collection {collection:?} has no operations")]
    NoOperations { collection: String },

    /// A combinator was built from zero generators.
    #[error("At least one record generator is required")]
    NoGenerators,
}

impl From<record_core::FieldSpecError> for GeneratorError {
    fn from(err: record_core::FieldSpecError) -> Self {
        Self::UnknownFieldType {
            field: err.field,
            tag: err.source.0,
        }
    }
}
