use colord_core::errors::SweepError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SweepError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(content_hash(&bytes))
}

/// SHA-256 digest of raw bytes rendered as lowercase hex.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}

/// Hashes a numeric buffer by its little-endian byte representation.
pub fn hash_f64_slice(values: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for value in values {
        hasher.update(value.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_matches_known_digest() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn f64_hash_tracks_content_not_identity() {
        let a = vec![1.0, 2.5, -3.0];
        let b = a.clone();
        assert_eq!(hash_f64_slice(&a), hash_f64_slice(&b));
        assert_ne!(hash_f64_slice(&a), hash_f64_slice(&[1.0, 2.5, -3.000001]));
    }

    #[test]
    fn stable_hash_ignores_construction_order() {
        let left: std::collections::HashMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
        let right: std::collections::HashMap<&str, u32> =
            [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(
            stable_hash_string(&left).unwrap(),
            stable_hash_string(&right).unwrap()
        );
    }
}
