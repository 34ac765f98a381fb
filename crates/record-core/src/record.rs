//! The record produced per pull.

use crate::types::Operation;
use crate::values::PayloadValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque position token of a record.
///
/// A single generator encodes its call counter here; the combinator
/// prefixes it with the generator index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(String);

impl Position {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Position for the n-th record of a generator.
    pub fn from_counter(counter: u64) -> Self {
        Self(counter.to_string())
    }

    /// Return a new position with `prefix` prepended.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let mut value = String::with_capacity(prefix.len() + self.0.len());
        value.push_str(prefix);
        value.push_str(&self.0);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// When the record was synthesized
    pub created_at: DateTime<Utc>,

    /// Collection name; `None` for the default collection
    pub collection: Option<String>,

    /// Additional attributes attached by post-processors
    pub attributes: BTreeMap<String, String>,
}

impl Metadata {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        Self {
            created_at: Utc::now(),
            collection: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the collection name. Empty names are treated as the default collection.
    pub fn with_collection(mut self, collection: &str) -> Self {
        if !collection.is_empty() {
            self.collection = Some(collection.to_string());
        }
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Before/after payload of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub before: Option<PayloadValue>,
    pub after: Option<PayloadValue>,
}

/// A single synthesized record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub position: Position,
    pub operation: Operation,
    pub metadata: Metadata,
    /// Random token; not required to be unique
    pub key: String,
    pub payload: Payload,
}

impl Record {
    /// Collection this record belongs to, if any.
    pub fn collection(&self) -> Option<&str> {
        self.metadata.collection.as_deref()
    }

    /// Check that the payload slots match what the operation requires.
    pub fn payload_matches_operation(&self) -> bool {
        self.payload.before.is_some() == self.operation.has_before()
            && self.payload.after.is_some() == self.operation.has_after()
    }
}
