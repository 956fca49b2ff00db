//! Storage error types for vaultgraph-storage.
//!
//! [`StorageError`] groups three kinds of failure:
//! - caller-contract violations (missing passphrase, core graph errors,
//!   sealing content twice), reported before anything is mutated;
//! - decode/authentication failures (wrong key, truncated or tampered bytes),
//!   fatal to the one load/retrieve call that hit them;
//! - external-system failures (backend or ledger), propagated as-is and never
//!   retried here. A cipher failure while encoding is grouped with these.

use thiserror::Error;

use vaultgraph_core::CoreError;

use crate::hash::ContentHash;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No passphrase was supplied, so no key can be derived.
    #[error("a passphrase is required to derive the graph key")]
    MissingPassphrase,

    /// A graph-level caller error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Node content was not in the state the operation expects.
    #[error("content state error on node '{node}': {reason}")]
    ContentState { node: String, reason: String },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A graph could not be encrypted into a snapshot.
    #[error("encode error: {reason}")]
    Encode { reason: String },

    /// The byte sequence is not a well-formed snapshot.
    #[error("decode error: {reason}")]
    Decode { reason: String },

    /// AEAD verification failed: wrong key or tampered bytes.
    #[error("authentication failed: wrong key or corrupted data")]
    Authentication,

    /// A string is not a valid content hash.
    #[error("invalid content hash: '{0}'")]
    InvalidHash(String),

    /// The backend holds no blob for this hash.
    #[error("blob not found: {0}")]
    BlobNotFound(ContentHash),

    /// Stored bytes no longer match their content hash.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },

    /// A SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Any other backend failure.
    #[error("backend error: {reason}")]
    Backend { reason: String },

    /// A ledger submission was reverted or never confirmed.
    #[error("ledger error: {reason}")]
    Ledger { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_failures_read_differently_from_decode_failures() {
        let encode = StorageError::Encode {
            reason: "snapshot encryption failed".into(),
        }
        .to_string();
        let decode = StorageError::Decode {
            reason: "snapshot encryption failed".into(),
        }
        .to_string();

        assert!(encode.starts_with("encode error"));
        assert_ne!(encode, decode);
        assert_ne!(encode, StorageError::Authentication.to_string());
    }
}
