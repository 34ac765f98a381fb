//! Timestamp value generator.

use chrono::Utc;
use record_core::FieldValue;

/// Generate the current UTC timestamp.
///
/// This is NOT deterministic - each call returns the current time, even
/// when the surrounding generator is seeded.
pub fn generate_timestamp_now() -> FieldValue {
    FieldValue::Time(Utc::now())
}
