//! Numeric and boolean value generators.

use rand::Rng;
use record_core::FieldValue;

/// Generate a random non-negative integer.
pub fn generate_int<R: Rng + ?Sized>(rng: &mut R) -> FieldValue {
    FieldValue::Int(rng.random_range(0..=i64::MAX))
}

/// Generate a random boolean with even odds.
pub fn generate_bool<R: Rng + ?Sized>(rng: &mut R) -> FieldValue {
    FieldValue::Bool(rng.random_bool(0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_int_non_negative() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let value = generate_int(&mut rng);
            if let FieldValue::Int(v) = value {
                assert!(v >= 0);
            } else {
                panic!("Expected Int value");
            }
        }
    }

    #[test]
    fn test_generate_int_varies() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = generate_int(&mut rng);
        let distinct = (0..100).any(|_| generate_int(&mut rng) != first);
        assert!(distinct);
    }

    #[test]
    fn test_generate_bool_is_unbiased() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = 10_000;

        let trues = (0..samples)
            .filter(|_| generate_bool(&mut rng).as_bool() == Some(true))
            .count();

        // Five standard deviations around the mean for a fair coin.
        let ratio = trues as f64 / samples as f64;
        assert!((0.475..=0.525).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn test_deterministic_generation() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(generate_int(&mut rng1), generate_int(&mut rng2));
        assert_eq!(generate_bool(&mut rng1), generate_bool(&mut rng2));
    }
}
