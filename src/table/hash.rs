//! Key hashing for bucket selection.

const SEED: u32 = 5381;
const MULTIPLIER: u32 = 33;

/// Map a key onto one of `bucket_count` buckets.
///
/// Multiplicative string hash over the key bytes (`hash * 33 + byte`,
/// starting from 5381) with 32-bit wrapping arithmetic. Deterministic and
/// order-sensitive; not collision resistant.
pub fn bucket_index(key: &str, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0);
    let hash = key.bytes().fold(SEED, |hash, byte| {
        hash.wrapping_mul(MULTIPLIER).wrapping_add(u32::from(byte))
    });
    hash as usize % bucket_count
}
