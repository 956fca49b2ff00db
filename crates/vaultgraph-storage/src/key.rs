//! Passphrase-to-key derivation.
//!
//! Scheme version 1: SHA-256 the passphrase, hex-encode the digest, normalize
//! the text to exactly [`KEY_LEN`] characters (truncate, or right-pad with
//! [`KEY_FILLER`]) and use those ASCII bytes as the AES-256 key.
//!
//! This is a placeholder scheme, not a key-stretching KDF. It stays in place
//! because snapshots already persisted under it must keep decrypting; a
//! salted, slow derivation would ship as scheme version 2.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::StorageError;

/// Length of a derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Character used to right-pad short key text.
pub const KEY_FILLER: char = '0';

/// Version of the derivation scheme implemented here.
pub const KEY_SCHEME_VERSION: u8 = 1;

/// A derived 32-byte symmetric key.
///
/// Never serialized; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Derives the key for `passphrase`.
    ///
    /// Returns [`StorageError::MissingPassphrase`] for an empty passphrase.
    pub fn derive(passphrase: &str) -> Result<Self, StorageError> {
        if passphrase.is_empty() {
            return Err(StorageError::MissingPassphrase);
        }
        let digest = hex::encode(Sha256::digest(passphrase.as_bytes()));
        let text = normalize_key_text(&digest);

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&text.as_bytes()[..KEY_LEN]);
        Ok(SymmetricKey(key))
    }

    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        SymmetricKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Normalizes key text to exactly [`KEY_LEN`] ASCII characters.
///
/// Longer text is truncated, shorter text is right-padded with
/// [`KEY_FILLER`]. Non-ASCII characters are replaced by the filler so the
/// result is always `KEY_LEN` bytes long.
pub fn normalize_key_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { KEY_FILLER })
        .chain(std::iter::repeat(KEY_FILLER))
        .take(KEY_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = SymmetricKey::derive("correct horse").unwrap();
        let b = SymmetricKey::derive("correct horse").unwrap();
        let c = SymmetricKey::derive("battery staple").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_is_truncated_hex_digest() {
        let key = SymmetricKey::derive("abc").unwrap();
        // SHA-256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a3...
        assert_eq!(key.as_bytes(), b"ba7816bf8f01cfea414140de5dae2223");
    }

    #[test]
    fn empty_passphrase_is_rejected() {
        assert!(matches!(
            SymmetricKey::derive(""),
            Err(StorageError::MissingPassphrase)
        ));
    }

    #[test]
    fn normalize_pads_and_truncates() {
        assert_eq!(normalize_key_text("abc"), format!("abc{}", "0".repeat(29)));
        assert_eq!(normalize_key_text(&"x".repeat(40)), "x".repeat(32));
        assert_eq!(normalize_key_text("é").len(), KEY_LEN);
    }

    #[test]
    fn debug_is_redacted() {
        let key = SymmetricKey::derive("secret").unwrap();
        assert_eq!(format!("{:?}", key), "SymmetricKey(<redacted>)");
    }
}
