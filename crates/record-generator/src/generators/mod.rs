//! Individual value generators for the supported field types.
//!
//! Every generator takes the caller's RNG, so each collection draws from its
//! own randomness source. Only `time` ignores the RNG.

pub mod duration;
pub mod numeric;
pub mod timestamp;
pub mod word;

use rand::Rng;
use record_core::{FieldSpec, FieldType, FieldValue, StructuredData};

/// Upper bound (exclusive) for generated durations, in seconds.
pub const MAX_DURATION_SECS: u64 = 1000;

/// Generate a single value for the given field type.
pub fn generate_value<R: Rng + ?Sized>(field_type: FieldType, rng: &mut R) -> FieldValue {
    match field_type {
        FieldType::Int => numeric::generate_int(rng),
        FieldType::String => word::generate_word(rng),
        FieldType::Time => timestamp::generate_timestamp_now(),
        FieldType::Bool => numeric::generate_bool(rng),
        FieldType::Duration => duration::generate_duration(rng, MAX_DURATION_SECS),
    }
}

/// Generate a value from a raw type tag.
///
/// # Panics
///
/// Panics if the tag is not a known field type. Tags are validated before
/// they reach the generator, so an unknown tag here is a caller bug.
pub fn generate_for_tag<R: Rng + ?Sized>(field: &str, tag: &str, rng: &mut R) -> FieldValue {
    match tag.parse::<FieldType>() {
        Ok(field_type) => generate_value(field_type, rng),
        Err(err) => panic!("field {field:?} contains invalid type: {err}"),
    }
}

/// Generate a full field map for a field spec.
pub fn generate_structured<R: Rng + ?Sized>(spec: &FieldSpec, rng: &mut R) -> StructuredData {
    spec.iter()
        .map(|(name, field_type)| (name.to_string(), generate_value(field_type, rng)))
        .collect()
}
