//! Registry extension: record the latest snapshot hash on a [`Ledger`].
//!
//! [`Registry`] is a thin coordination layer over [`Session::store`] and a
//! ledger. It never mutates the graph, and whatever finality it reports is
//! only as strong as the ledger's own confirmation.

use std::sync::Arc;

use crate::error::StorageError;
use crate::hash::ContentHash;
use crate::session::Session;
use crate::traits::{Ledger, Receipt};

/// Publishes snapshot hashes to a ledger and reads them back.
pub struct Registry<L: Ledger + ?Sized> {
    ledger: Arc<L>,
}

impl<L: Ledger + ?Sized> Registry<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Registry { ledger }
    }

    /// Stores the session's current graph, then records the resulting hash.
    ///
    /// Returns once the ledger has confirmed the entry. If the ledger
    /// rejects it the snapshot remains stored, but nothing is registered.
    pub async fn register_current_hash(
        &self,
        session: &mut Session,
    ) -> Result<Receipt, StorageError> {
        let hash = session.store().await?;
        let sequence = self.ledger.submit(&hash.to_bytes()).await.map_err(|err| {
            tracing::warn!(%hash, error = %err, "registry submission failed");
            err
        })?;

        tracing::info!(%hash, sequence, "hash registered");
        Ok(Receipt { sequence, hash })
    }

    /// Reads the most recently confirmed hash.
    pub async fn read_registered_hash(&self) -> Result<Option<ContentHash>, StorageError> {
        match self.ledger.current().await? {
            Some(bytes) => Ok(Some(ContentHash::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryContentStore, InMemoryLedger};
    use crate::session::SessionConfig;
    use vaultgraph_core::{Node, NodeKind};

    fn session() -> Session {
        Session::open(
            SessionConfig::new("pw", "notes"),
            Arc::new(InMemoryContentStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn register_then_read_back() {
        let registry = Registry::new(Arc::new(InMemoryLedger::new()));
        assert_eq!(registry.read_registered_hash().await.unwrap(), None);

        let mut s = session();
        s.graph_mut().add_node(Node::new("a", NodeKind::Note, "A"));
        let first = registry.register_current_hash(&mut s).await.unwrap();

        s.graph_mut().add_node(Node::new("b", NodeKind::Note, "B"));
        let second = registry.register_current_hash(&mut s).await.unwrap();

        assert!(second.sequence > first.sequence);
        assert_ne!(first.hash, second.hash);
        assert_eq!(
            registry.read_registered_hash().await.unwrap(),
            Some(second.hash)
        );
    }

    #[tokio::test]
    async fn reverted_submission_is_reported_and_graph_untouched() {
        let ledger = Arc::new(InMemoryLedger::new());
        let registry = Registry::new(ledger.clone());
        let mut s = session();
        s.graph_mut().add_node(Node::new("a", NodeKind::Note, "A"));
        let before = s.graph().clone();

        ledger.set_reverting(true);
        assert!(matches!(
            registry.register_current_hash(&mut s).await,
            Err(StorageError::Ledger { .. })
        ));
        assert_eq!(s.graph(), &before);
        assert_eq!(registry.read_registered_hash().await.unwrap(), None);
    }

    #[tokio::test]
    async fn works_through_trait_objects() {
        let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new());
        let registry = Registry::new(ledger);
        let mut s = session();
        let receipt = registry.register_current_hash(&mut s).await.unwrap();
        assert_eq!(receipt.sequence, 1);
    }
}
