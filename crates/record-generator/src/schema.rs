//! Schema descriptor attachment.
//!
//! Registering schemas with a registry is the host's job. This post-processor
//! only stamps each record with the subject and a canonical field list so a
//! downstream encoder can find or register the schema.

use crate::generator::PostProcessor;
use record_core::{FieldSpec, Record};

/// Metadata key holding the schema subject.
pub const SCHEMA_SUBJECT_KEY: &str = "schema.subject";

/// Metadata key holding the canonical `name:type` field list.
pub const SCHEMA_FIELDS_KEY: &str = "schema.fields";

/// Attaches a payload schema descriptor to every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAttacher {
    subject: String,
    fields: String,
}

impl SchemaAttacher {
    /// Named collections qualify the subject as `<collection>.<subject>`.
    pub fn new(collection: &str, subject: &str, spec: &FieldSpec) -> Self {
        let subject = if collection.is_empty() {
            subject.to_string()
        } else {
            format!("{collection}.{subject}")
        };
        let fields = spec
            .iter()
            .map(|(name, field_type)| format!("{name}:{field_type}"))
            .collect::<Vec<_>>()
            .join(",");
        Self { subject, fields }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn fields(&self) -> &str {
        &self.fields
    }
}

impl PostProcessor for SchemaAttacher {
    fn process(&self, mut record: Record) -> Record {
        record
            .metadata
            .set_attribute(SCHEMA_SUBJECT_KEY, self.subject.clone());
        record
            .metadata
            .set_attribute(SCHEMA_FIELDS_KEY, self.fields.clone());
        record
    }
}
