//! In-memory backends.
//!
//! [`InMemoryContentStore`] and [`InMemoryLedger`] are first-class backends
//! for tests, ephemeral sessions, and anywhere persistence isn't needed. They
//! follow the same semantics as the SQLite backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::hash::ContentHash;
use crate::traits::{ContentStore, Ledger};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    label: String,
}

/// Content store holding blobs in a HashMap.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: Mutex<HashMap<ContentHash, StoredBlob>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pinned blobs.
    pub fn len(&self) -> usize {
        self.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The label a blob was pinned with.
    pub fn label_of(&self, hash: &ContentHash) -> Option<String> {
        self.lock()
            .ok()?
            .get(hash)
            .map(|blob| blob.label.clone())
    }

    /// Overwrites a stored blob in place, bypassing content addressing.
    ///
    /// Only useful for simulating backend corruption in tests.
    pub fn corrupt(&self, hash: &ContentHash, bytes: Vec<u8>) -> Result<(), StorageError> {
        let mut blobs = self.lock()?;
        let blob = blobs
            .get_mut(hash)
            .ok_or_else(|| StorageError::BlobNotFound(hash.clone()))?;
        blob.bytes = bytes;
        Ok(())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ContentHash, StoredBlob>>, StorageError> {
        self.blobs.lock().map_err(|e| StorageError::Backend {
            reason: format!("blob map lock poisoned: {e}"),
        })
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, bytes: Vec<u8>, label: &str) -> Result<ContentHash, StorageError> {
        let hash = ContentHash::of(&bytes);
        let mut blobs = self.lock()?;
        blobs.entry(hash.clone()).or_insert_with(|| StoredBlob {
            bytes,
            label: label.to_string(),
        });
        tracing::debug!(%hash, label, "pinned blob in memory");
        Ok(hash)
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let blobs = self.lock()?;
        let blob = blobs
            .get(hash)
            .ok_or_else(|| StorageError::BlobNotFound(hash.clone()))?;
        if !hash.verify(&blob.bytes) {
            return Err(StorageError::IntegrityError {
                reason: format!("stored bytes no longer match {hash}"),
            });
        }
        Ok(blob.bytes.clone())
    }

    async fn unpin(&self, hash: &ContentHash) -> Result<(), StorageError> {
        if self.lock()?.remove(hash).is_some() {
            tracing::debug!(%hash, "unpinned blob from memory");
        }
        Ok(())
    }

    async fn contains(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        Ok(self.lock()?.contains_key(hash))
    }
}

/// Ledger keeping its entries in a Vec.
///
/// [`set_reverting`](InMemoryLedger::set_reverting) makes subsequent
/// submissions fail as if the transaction had been reverted.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<Vec<u8>>>,
    reverting: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reverting(&self, reverting: bool) {
        self.reverting.store(reverting, Ordering::SeqCst);
    }

    /// Number of confirmed entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Vec<u8>>>, StorageError> {
        self.entries.lock().map_err(|e| StorageError::Ledger {
            reason: format!("ledger lock poisoned: {e}"),
        })
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn submit(&self, hash_bytes: &[u8]) -> Result<u64, StorageError> {
        if self.reverting.load(Ordering::SeqCst) {
            return Err(StorageError::Ledger {
                reason: "transaction reverted".to_string(),
            });
        }
        let mut entries = self.lock()?;
        entries.push(hash_bytes.to_vec());
        Ok(entries.len() as u64)
    }

    async fn current(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.last().cloned())
    }
}
