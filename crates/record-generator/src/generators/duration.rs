//! Duration value generator.

use rand::Rng;
use record_core::FieldValue;
use std::time::Duration;

/// Generate a whole number of seconds in `[0, max_secs)`.
pub fn generate_duration<R: Rng + ?Sized>(rng: &mut R, max_secs: u64) -> FieldValue {
    let secs = if max_secs == 0 {
        0
    } else {
        rng.random_range(0..max_secs)
    };
    FieldValue::Duration(Duration::from_secs(secs))
}
