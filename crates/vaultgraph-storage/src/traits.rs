//! Boundary traits for the external systems a session talks to.
//!
//! - [`ContentStore`]: a content-addressable blob backend (pinning service,
//!   object store, local database).
//! - [`Ledger`]: an append-only registry that records content hashes and
//!   confirms them durably.
//!
//! Both are async because every call may cross into a slow, independently
//! failing system. Neither applies timeouts or retries; callers wrap the
//! futures in their own policy.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::hash::ContentHash;

/// A content-addressed blob backend.
///
/// Storing byte-identical data twice must return the same hash.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores `bytes` under their content hash. `label` is free-form pin
    /// metadata (the session's logical database name).
    async fn put(&self, bytes: Vec<u8>, label: &str) -> Result<ContentHash, StorageError>;

    /// Fetches the bytes for `hash`.
    ///
    /// Returns [`StorageError::BlobNotFound`] if the backend holds nothing
    /// under that hash.
    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError>;

    /// Drops the backend's reference to `hash`. Unpinning an unknown hash is
    /// a no-op.
    async fn unpin(&self, hash: &ContentHash) -> Result<(), StorageError>;

    /// Returns `true` if the backend currently holds `hash`.
    async fn contains(&self, hash: &ContentHash) -> Result<bool, StorageError>;
}

/// Confirmation that a ledger durably recorded a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Monotonic position of this entry in the ledger.
    pub sequence: u64,
    /// The recorded hash.
    pub hash: ContentHash,
}

/// An external registry of content hashes.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Submits raw hash bytes and waits for the submission to be confirmed.
    ///
    /// A reverted or unconfirmed submission is a [`StorageError::Ledger`].
    async fn submit(&self, hash_bytes: &[u8]) -> Result<u64, StorageError>;

    /// Reads the most recently confirmed hash bytes, if any.
    async fn current(&self) -> Result<Option<Vec<u8>>, StorageError>;
}
