//! Payload synthesis.
//!
//! The strategy is picked once per collection when the generator is built;
//! producing a payload afterwards is infallible.

use crate::error::GeneratorError;
use crate::generators::generate_structured;
use bytes::Bytes;
use rand::Rng;
use record_core::{FieldSpec, PayloadValue, StructuredData};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encoding of field-driven payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// JSON-encoded bytes
    Raw,
    /// Field map with types preserved
    Structured,
}

/// Produces the before/after payload values of a collection.
#[derive(Debug, Clone)]
pub enum PayloadGenerator {
    /// Synthesize a fresh field map on every call.
    Fields {
        spec: FieldSpec,
        format: PayloadFormat,
    },

    /// Return the same cached file contents on every call.
    File { path: PathBuf, contents: Bytes },
}

impl PayloadGenerator {
    /// Create a field-driven payload generator.
    pub fn fields(spec: FieldSpec, format: PayloadFormat) -> Self {
        Self::Fields { spec, format }
    }

    /// Create a file-backed payload generator.
    ///
    /// The file is read here, once. Later calls never touch the filesystem,
    /// so file I/O does not count against the generation rate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|source| GeneratorError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Cached payload file '{}' ({} bytes)",
            path.display(),
            contents.len()
        );
        Ok(Self::File {
            path: path.to_path_buf(),
            contents: Bytes::from(contents),
        })
    }

    /// Produce the next payload value.
    pub fn next_payload<R: Rng + ?Sized>(&self, rng: &mut R) -> PayloadValue {
        match self {
            Self::Fields { spec, format } => {
                let data = generate_structured(spec, rng);
                match format {
                    PayloadFormat::Raw => PayloadValue::Raw(encode_raw(&data)),
                    PayloadFormat::Structured => PayloadValue::Structured(data),
                }
            }
            // Bytes clones share the cached buffer.
            Self::File { contents, .. } => PayloadValue::Raw(contents.clone()),
        }
    }

    /// The field spec, for field-driven generators.
    pub fn field_spec(&self) -> Option<&FieldSpec> {
        match self {
            Self::Fields { spec, .. } => Some(spec),
            Self::File { .. } => None,
        }
    }
}

/// Encode a field map as canonical JSON bytes.
pub fn encode_raw(data: &StructuredData) -> Bytes {
    // String keys and finite values only, so encoding cannot fail.
    let bytes = serde_json::to_vec(data).expect("field values always encode as JSON");
    Bytes::from(bytes)
}
