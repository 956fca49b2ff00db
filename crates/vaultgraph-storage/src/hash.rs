//! Content hashes for stored blobs.
//!
//! A [`ContentHash`] is the lowercase hex blake3 digest of the exact bytes a
//! backend stores. Callers treat it as opaque; backends use
//! [`ContentHash::of`] to name blobs and [`ContentHash::verify`] to check
//! them on read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Length of a hex-encoded blake3 digest.
const HEX_LEN: usize = 64;

/// Opaque identifier of a stored byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes `bytes`. Deterministic: the same bytes always yield the same
    /// hash.
    pub fn of(bytes: &[u8]) -> Self {
        ContentHash(blake3::hash(bytes).to_hex().to_string())
    }

    /// Returns `true` if `bytes` hash to this value.
    pub fn verify(&self, bytes: &[u8]) -> bool {
        ContentHash::of(bytes) == *self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw digest bytes, as submitted to a ledger.
    pub fn to_bytes(&self) -> Vec<u8> {
        // The constructor only admits valid hex.
        hex::decode(&self.0).unwrap_or_default()
    }

    /// Parses raw digest bytes read back from a ledger.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        hex::encode(bytes).parse()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(ContentHash(s.to_string()))
        } else {
            Err(StorageError::InvalidHash(s.to_string()))
        }
    }
}

impl TryFrom<String> for ContentHash {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}
