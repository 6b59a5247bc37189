//! Content hashes identifying parameter sets and candle series.
//!
//! Two runs with the same `params_fingerprint` and `dataset_hash` produce
//! bit-identical results.

use serde::Serialize;

use crate::domain::Candle;

/// BLAKE3 hex digest of a value's JSON serialisation.
///
/// Struct fields serialize in declaration order and maps used here are
/// `BTreeMap`s, so the encoding is canonical.
///
/// # Panics
///
/// Panics if `value` has no JSON form, such as a map with non-string keys.
pub fn hash_json<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_vec(value).expect("fingerprinted value must serialize to JSON");
    blake3::hash(&json).to_hex().to_string()
}

/// BLAKE3 hex digest over the raw bytes of every candle field.
pub fn dataset_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in candles {
        hasher.update(&c.time.to_le_bytes());
        for v in [c.open, c.high, c.low, c.close, c.volume] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
