//! The session: a graph, its key, and the backend it persists to.
//!
//! [`Session`] is the interface object clients hold. It owns the in-memory
//! [`NodeGraph`] exclusively, derives the symmetric key once at construction,
//! and runs the publish/fetch cycle against a [`ContentStore`]:
//!
//! - `store`: encrypt the current graph and publish it, returning its hash.
//! - `load`: fetch and decrypt a snapshot, then replace the graph wholesale.
//! - `retrieve`: fetch and decrypt without touching local state.
//!
//! # Atomic load
//!
//! `load` builds the new graph completely before assigning it, and the
//! assignment happens after the last await. A failed fetch, a failed decode,
//! or a dropped future all leave the current graph exactly as it was.

use std::fmt;
use std::sync::Arc;

use vaultgraph_core::NodeGraph;

use crate::codec;
use crate::error::StorageError;
use crate::hash::ContentHash;
use crate::key::SymmetricKey;
use crate::traits::ContentStore;

/// Construction parameters for a [`Session`].
///
/// Backend credentials are not part of this: a [`ContentStore`]
/// implementation takes whatever it needs at its own construction, and the
/// session only receives the ready handle.
#[derive(Clone, Default)]
pub struct SessionConfig {
    /// Passphrase the graph key is derived from. Required.
    pub passphrase: Option<String>,
    /// Logical database name, attached to pinned blobs as their label.
    pub database: String,
}

impl SessionConfig {
    pub fn new(passphrase: impl Into<String>, database: impl Into<String>) -> Self {
        SessionConfig {
            passphrase: Some(passphrase.into()),
            database: database.into(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// A single-owner graph session bound to a content store.
pub struct Session {
    graph: NodeGraph,
    key: SymmetricKey,
    database: String,
    backend: Arc<dyn ContentStore>,
    last_stored: Option<ContentHash>,
}

impl Session {
    /// Opens a session with an empty graph.
    ///
    /// Fails with [`StorageError::MissingPassphrase`] if the passphrase is
    /// absent or empty; nothing else is touched in that case.
    pub fn open(
        config: SessionConfig,
        backend: Arc<dyn ContentStore>,
    ) -> Result<Self, StorageError> {
        let passphrase = config
            .passphrase
            .as_deref()
            .ok_or(StorageError::MissingPassphrase)?;
        let key = SymmetricKey::derive(passphrase)?;

        tracing::debug!(database = %config.database, "session opened");
        Ok(Session {
            graph: NodeGraph::new(),
            key,
            database: config.database,
            backend,
            last_stored: None,
        })
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// The key derived for this session, for per-node content sealing.
    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }

    /// Hash of the snapshot most recently stored or loaded.
    pub fn last_stored(&self) -> Option<&ContentHash> {
        self.last_stored.as_ref()
    }

    /// Encrypts the current graph and publishes it.
    ///
    /// Storing an unchanged graph again yields the same hash.
    pub async fn store(&mut self) -> Result<ContentHash, StorageError> {
        let bytes = codec::serialize(&self.graph, &self.key)?;
        let size = bytes.len();
        let hash = self.backend.put(bytes, &self.database).await?;

        tracing::info!(%hash, size, nodes = self.graph.len(), "graph stored");
        self.last_stored = Some(hash.clone());
        Ok(hash)
    }

    /// Fetches and decodes a snapshot without touching local state.
    pub async fn retrieve(&self, hash: &ContentHash) -> Result<NodeGraph, StorageError> {
        let bytes = self.backend.get(hash).await?;
        codec::deserialize(&bytes, &self.key)
    }

    /// Replaces the in-memory graph with the snapshot stored under `hash`.
    ///
    /// All-or-nothing: on error the current graph is unchanged.
    pub async fn load(&mut self, hash: &ContentHash) -> Result<(), StorageError> {
        let graph = match self.retrieve(hash).await {
            Ok(graph) => graph,
            Err(err) => {
                tracing::warn!(%hash, error = %err, "load failed, keeping current graph");
                return Err(err);
            }
        };

        tracing::info!(%hash, nodes = graph.len(), "graph loaded");
        self.graph = graph;
        self.last_stored = Some(hash.clone());
        Ok(())
    }

    /// Asks the backend to drop its reference to `hash`.
    ///
    /// Local state, including a graph loaded from that hash, is unaffected.
    pub async fn unpin(&self, hash: &ContentHash) -> Result<(), StorageError> {
        self.backend.unpin(hash).await?;
        tracing::info!(%hash, "snapshot unpinned");
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("database", &self.database)
            .field("nodes", &self.graph.len())
            .field("last_stored", &self.last_stored)
            .finish_non_exhaustive()
    }
}
