//! Error types for the source.

use crate::config::ConfigError;
use record_generator::GeneratorError;
use thiserror::Error;

/// A wait was interrupted by the cancellation token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Errors returned by [`crate::Source`].
///
/// Once a source is built, `Cancelled` is the only error `pull` returns.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The host cancelled the pull.
    #[error("read cancelled")]
    Cancelled,

    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collection's generator could not be built.
    #[error("failed to create record generator for collection {collection:?}: {source}")]
    Generator {
        collection: String,
        #[source]
        source: GeneratorError,
    },

    /// A post-processor was registered for a collection that does not exist.
    #[error("post-processor registered for unknown collection {0:?}")]
    UnknownCollection(String),
}

impl From<Cancelled> for SourceError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl SourceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
