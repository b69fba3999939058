//! Canonical content identifiers.

use galleria_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Length of a hex-encoded SHA-256 digest.
const HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of a normalized image.
///
/// This is the only handle callers ever receive for an image and the only key
/// used by the caches.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Compute the identifier of already-normalized bytes.
    pub fn digest(normalized: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalized);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-level shard prefix, e.g. `("ab", "cd")` for `abcd...`.
    pub fn shard(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == HEX_LEN
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(StorageError::new(StorageErrorKind::InvalidIdentifier(
                s.to_string(),
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ContentId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex() {
        let id = ContentId::digest(b"pixels");
        assert_eq!(id.as_str().len(), HEX_LEN);
        assert!(id.as_str().parse::<ContentId>().is_ok());
        assert_eq!(id, ContentId::digest(b"pixels"));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!("abc".parse::<ContentId>().is_err());
        assert!("Z".repeat(HEX_LEN).parse::<ContentId>().is_err());
        assert!("A".repeat(HEX_LEN).parse::<ContentId>().is_err());
    }

    #[test]
    fn shard_uses_leading_pairs() {
        let id: ContentId = format!("abcd{}", "0".repeat(HEX_LEN - 4)).parse().unwrap();
        assert_eq!(id.shard(), ("ab", "cd"));
    }
}
