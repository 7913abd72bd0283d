//! Deterministic selection over ordered pools.
//!
//! A single primitive backs every "pick one of N" decision in the pipeline
//! (message lines, speaker pools). SHA-256 keeps the mapping uniform over the
//! option set while staying fully reproducible for identical seeds.

use sha2::{Digest, Sha256};

use crate::error::MessageError;

/// Reduce a seed string to a stable index in `0..len`.
pub fn stable_index(seed: &str, len: usize) -> Result<usize, MessageError> {
    if len == 0 {
        return Err(MessageError::InvalidInput(
            "cannot select from an empty pool".to_string(),
        ));
    }
    let digest = Sha256::digest(seed.as_bytes());
    let n = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    Ok((n as usize) % len)
}

/// Pick one element of `items`, purely as a function of `seed` and the pool size.
pub fn select<'a, T>(seed: &str, items: &'a [T]) -> Result<&'a T, MessageError> {
    let idx = stable_index(seed, items.len())?;
    Ok(&items[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_select_is_deterministic() {
        let pool = ["a", "b", "c", "d", "e"];
        let first = select("fr|feminin|intime", &pool).unwrap();
        for _ in 0..50 {
            assert_eq!(select("fr|feminin|intime", &pool).unwrap(), first);
        }
    }

    #[test]
    fn test_select_empty_pool_rejected() {
        let pool: [&str; 0] = [];
        let result = select("any", &pool);
        assert!(matches!(result, Err(MessageError::InvalidInput(_))));
    }

    #[test]
    fn test_select_covers_every_item() {
        // Over many distinct seeds every slot of a small pool must be reachable.
        let pool = ["a", "b", "c", "d", "e", "f", "g"];
        let mut seen = HashSet::new();
        for i in 0..500 {
            let seed = format!("seed-{i}");
            seen.insert(*select(&seed, &pool).unwrap());
        }
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_different_seed_suffixes_are_independent() {
        let pool: Vec<String> = (0..64).map(|i| format!("line-{i}")).collect();
        let a = select("base::opening", &pool).unwrap();
        let b = select("base::closing", &pool).unwrap();
        // Not a hard guarantee, but with 64 slots a collision here would
        // almost certainly mean the suffix is being ignored.
        assert_ne!(a, b);
    }
}
