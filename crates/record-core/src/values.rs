//! Value representations for synthesized records.
//!
//! `FieldValue` is a single synthesized field; `PayloadValue` is what ends up
//! in a record's before/after slots, either raw bytes or a structured map.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Structured payload data, keyed by field name.
pub type StructuredData = BTreeMap<String, FieldValue>;

/// A single synthesized field value.
///
/// Serializes untagged, so a structured map encodes as a plain JSON object.
/// Durations encode as integer nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 64-bit signed integer
    Int(i64),

    /// Short human-readable token
    String(String),

    /// UTC instant
    Time(DateTime<Utc>),

    /// Boolean value
    Bool(bool),

    /// Non-negative duration
    #[serde(serialize_with = "serialize_duration_nanos")]
    Duration(Duration),
}

fn serialize_duration_nanos<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

/// Payload data carried in a record's before/after slots.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    /// Opaque bytes (serialized fields or cached file contents)
    Raw(Bytes),

    /// Field map with its types preserved
    Structured(StructuredData),
}

impl PayloadValue {
    /// Get the raw bytes, if this is a raw payload.
    pub fn as_raw(&self) -> Option<&Bytes> {
        match self {
            Self::Raw(b) => Some(b),
            Self::Structured(_) => None,
        }
    }

    /// Get the field map, if this is a structured payload.
    pub fn as_structured(&self) -> Option<&StructuredData> {
        match self {
            Self::Structured(m) => Some(m),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl From<Bytes> for PayloadValue {
    fn from(value: Bytes) -> Self {
        Self::Raw(value)
    }
}

impl From<StructuredData> for PayloadValue {
    fn from(value: StructuredData) -> Self {
        Self::Structured(value)
    }
}
