//! Random word generator for `string` fields and record keys.

use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;
use record_core::FieldValue;

/// Generate a random dictionary word. Words repeat freely.
pub fn random_word<R: Rng + ?Sized>(rng: &mut R) -> String {
    Word().fake_with_rng(rng)
}

/// Generate a `string` field value.
pub fn generate_word<R: Rng + ?Sized>(rng: &mut R) -> FieldValue {
    FieldValue::String(random_word(rng))
}
