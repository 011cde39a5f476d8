//! Cache key derivation.

use sha2::{Digest, Sha256};
use vermeer_core::Payload;

/// Hex SHA-256 fingerprint of a payload's canonical JSON.
///
/// Two payloads that differ only in object key order map to the same key.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vermeer_cache::CacheKey;
/// use vermeer_core::Payload;
///
/// let a = Payload::from_value(json!({"prompt": "cat", "steps": 20})).unwrap();
/// let b = Payload::from_value(json!({"steps": 20, "prompt": "cat"})).unwrap();
/// assert_eq!(CacheKey::from_payload(&a), CacheKey::from_payload(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct CacheKey(String);

impl CacheKey {
    /// Fingerprint a payload.
    pub fn from_payload(payload: &Payload) -> Self {
        Self::from_canonical(&payload.canonical_json())
    }

    /// Fingerprint an already-canonical JSON string.
    pub fn from_canonical(json: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-character directory shard for on-disk layout.
    pub fn shard(&self) -> &str {
        &self.0[..2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_hex_sha256() {
        let key = CacheKey::from_canonical("{}");
        assert_eq!(key.as_str().len(), 64);
        assert_eq!(
            key.as_str(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert_eq!(key.shard(), "44");
    }

    #[test]
    fn test_value_types_change_key() {
        let int = Payload::from_value(json!({"steps": 20})).unwrap();
        let text = Payload::from_value(json!({"steps": "20"})).unwrap();
        assert_ne!(CacheKey::from_payload(&int), CacheKey::from_payload(&text));
    }

    #[test]
    fn test_nested_key_order_ignored() {
        let a = Payload::from_value(json!({"opts": {"a": 1, "b": [1, 2]}, "prompt": "x"})).unwrap();
        let b = Payload::from_value(json!({"prompt": "x", "opts": {"b": [1, 2], "a": 1}})).unwrap();
        assert_eq!(CacheKey::from_payload(&a), CacheKey::from_payload(&b));
    }
}
