//! Operation and field type definitions.
//!
//! `FieldType` is the closed set of type tags a field spec may use. Tags are
//! parsed once, when a [`FieldSpec`] is built, so everything downstream works
//! with the typed enum instead of raw strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error returned when an operation name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation {0:?}, expected one of: create, update, delete, snapshot")]
pub struct OperationParseError(pub String);

/// Error returned when a field type tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type {0:?}, expected one of: int, string, time, bool, duration")]
pub struct FieldTypeError(pub String);

/// Error returned when a field spec cannot be built from raw tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field:?} has invalid type: {source}")]
pub struct FieldSpecError {
    /// Name of the offending field
    pub field: String,
    /// The underlying tag error
    #[source]
    pub source: FieldTypeError,
}

/// The semantic change type a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Snapshot,
}

impl Operation {
    /// All known operations, in declaration order.
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Snapshot,
    ];

    /// The lowercase name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Snapshot => "snapshot",
        }
    }

    /// Whether records with this operation carry a "before" payload.
    pub fn has_before(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    /// Whether records with this operation carry an "after" payload.
    pub fn has_after(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Snapshot)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = OperationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(OperationParseError(s.to_string())),
        }
    }
}

/// Type tag of a synthesized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    String,
    Time,
    Bool,
    Duration,
}

impl FieldType {
    /// Every tag accepted in a field spec.
    pub const KNOWN_TAGS: [&'static str; 5] = ["int", "string", "time", "bool", "duration"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Time => "time",
            Self::Bool => "bool",
            Self::Duration => "duration",
        }
    }

    /// Check whether a raw tag names a known type (case-insensitive).
    pub fn is_known_tag(tag: &str) -> bool {
        tag.parse::<FieldType>().is_ok()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(Self::Int),
            "string" => Ok(Self::String),
            "time" => Ok(Self::Time),
            "bool" => Ok(Self::Bool),
            "duration" => Ok(Self::Duration),
            _ => Err(FieldTypeError(s.to_string())),
        }
    }
}

/// Mapping from field name to type tag.
///
/// Fields are kept sorted by name, so structured payloads and their raw
/// encodings always list keys in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    fields: BTreeMap<String, FieldType>,
}

impl FieldSpec {
    /// Create an empty field spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any existing field with the same name.
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Build a field spec from raw `name -> tag` pairs.
    ///
    /// Fails on the first tag that does not name a known type.
    pub fn parse<'a, I>(raw: I) -> Result<Self, FieldSpecError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut fields = BTreeMap::new();
        for (name, tag) in raw {
            let field_type = tag.parse::<FieldType>().map_err(|source| FieldSpecError {
                field: name.clone(),
                source,
            })?;
            fields.insert(name.clone(), field_type);
        }
        Ok(Self { fields })
    }

    /// Get the type of a field by name.
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldType)> for FieldSpec {
    fn from_iter<T: IntoIterator<Item = (String, FieldType)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
