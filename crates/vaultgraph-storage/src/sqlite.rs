//! SQLite backends for [`ContentStore`] and [`Ledger`].
//!
//! Blobs live in the `blobs` table keyed by content hash; the ledger is the
//! append-only `registry` table. `rusqlite::Connection` is `!Sync`, so each
//! backend keeps its connection behind a `std::sync::Mutex`. Every call is a
//! single short statement, so the lock is never held across an await.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::hash::ContentHash;
use crate::traits::{ContentStore, Ledger};

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StorageError> {
    conn.lock().map_err(|e| StorageError::Backend {
        reason: format!("connection lock poisoned: {e}"),
    })
}

/// SQLite-backed content store.
pub struct SqliteContentStore {
    conn: Mutex<Connection>,
}

impl SqliteContentStore {
    /// Opens (or creates) a database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteContentStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteContentStore {
            conn: Mutex::new(conn),
        })
    }

    /// Lists pinned hashes with their labels, oldest first.
    pub fn list(&self) -> Result<Vec<(ContentHash, String)>, StorageError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT hash, label FROM blobs ORDER BY pinned_at, hash")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (hash, label) = row?;
            out.push((hash.parse()?, label));
        }
        Ok(out)
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn put(&self, bytes: Vec<u8>, label: &str) -> Result<ContentHash, StorageError> {
        let hash = ContentHash::of(&bytes);
        let conn = lock(&self.conn)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO blobs (hash, bytes, size, label) VALUES (?1, ?2, ?3, ?4)",
            params![hash.as_str(), bytes, bytes.len() as i64, label],
        )?;
        if inserted == 0 {
            tracing::debug!(%hash, "blob already pinned");
        } else {
            tracing::debug!(%hash, size = bytes.len(), label, "pinned blob");
        }
        Ok(hash)
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let conn = lock(&self.conn)?;
        let bytes: Vec<u8> = conn
            .query_row(
                "SELECT bytes FROM blobs WHERE hash = ?1",
                params![hash.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::BlobNotFound(hash.clone()))?;

        if !hash.verify(&bytes) {
            return Err(StorageError::IntegrityError {
                reason: format!("stored bytes no longer match {hash}"),
            });
        }
        Ok(bytes)
    }

    async fn unpin(&self, hash: &ContentHash) -> Result<(), StorageError> {
        let conn = lock(&self.conn)?;
        let removed = conn.execute("DELETE FROM blobs WHERE hash = ?1", params![hash.as_str()])?;
        if removed > 0 {
            tracing::debug!(%hash, "unpinned blob");
        }
        Ok(())
    }

    async fn contains(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        let conn = lock(&self.conn)?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM blobs WHERE hash = ?1)",
            params![hash.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

/// SQLite-backed ledger. A committed insert counts as confirmation.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteLedger {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteLedger {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn submit(&self, hash_bytes: &[u8]) -> Result<u64, StorageError> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO registry (hash_bytes) VALUES (?1)",
            params![hash_bytes],
        )?;
        let sequence = tx.last_insert_rowid();
        tx.commit().map_err(|e| StorageError::Ledger {
            reason: format!("registry commit failed: {e}"),
        })?;
        tracing::debug!(sequence, "registry entry confirmed");
        Ok(sequence as u64)
    }

    async fn current(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let conn = lock(&self.conn)?;
        let bytes = conn
            .query_row(
                "SELECT hash_bytes FROM registry ORDER BY sequence DESC LIMIT 1",
                [],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(bytes)
    }
}
