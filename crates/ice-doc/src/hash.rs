//! Content hashing primitives
//!
//! Provides [`ContentHash`], the 32-byte SHA-256 digest that backs every
//! dependency address.

use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content hash (SHA-256)
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create hash from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Compute SHA-256 of `tag` followed by `data`
    ///
    /// The tag separates hash domains (and scheme versions) so the same
    /// payload hashed under two schemes never collides.
    #[must_use]
    pub fn compute_tagged(tag: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag);
        hasher.update(data);
        let digest = hasher.finalize();

        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Self(arr)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

/// Errors that can occur when working with content hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid hash length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Required byte count
        expected: usize,
        /// Byte count found
        actual: usize,
    },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_known_vector() {
        let hash = ContentHash::compute_tagged(b"", b"Hello, World!");
        assert_eq!(
            hash.to_string(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn content_hash_from_slice_invalid_length() {
        let bytes = vec![1u8; 31];
        let result = ContentHash::from_slice(&bytes);
        assert!(matches!(
            result,
            Err(HashError::InvalidLength {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn tag_changes_digest() {
        let plain = ContentHash::compute_tagged(b"", b"payload");
        let tagged = ContentHash::compute_tagged(b"scheme/v1\n", b"payload");
        assert_ne!(plain, tagged);
        assert_eq!(tagged, ContentHash::compute_tagged(b"scheme/", b"v1\npayload"));
    }

    #[test]
    fn content_hash_display_and_parse() {
        let hash = ContentHash::compute_tagged(b"", b"test");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn parse_rejects_non_hex() {
        let result = "zz".parse::<ContentHash>();
        assert!(matches!(result, Err(HashError::HexDecode(_))));
    }
}
