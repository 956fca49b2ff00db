//! Encryption and persistence for vaultgraph node graphs.
//!
//! Turns a [`NodeGraph`](vaultgraph_core::NodeGraph) into an authenticated,
//! encrypted, content-addressed blob and back, and coordinates publish/fetch
//! cycles against external backends.
//!
//! # Modules
//!
//! - [`key`]: passphrase → [`SymmetricKey`] derivation
//! - [`codec`]: encrypted snapshot encode/decode and per-node sealing
//! - [`hash`]: [`ContentHash`]
//! - [`traits`]: [`ContentStore`] and [`Ledger`] boundaries
//! - [`memory`]: in-memory backends
//! - [`schema`]: SQLite schema and migrations
//! - [`sqlite`]: SQLite backends
//! - [`session`]: [`Session`], the publish/fetch gateway
//! - [`registry`]: [`Registry`], ledger registration of snapshot hashes
//! - [`error`]: [`StorageError`]

pub mod codec;
pub mod error;
pub mod hash;
pub mod key;
pub mod memory;
pub mod registry;
pub mod schema;
pub mod session;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use hash::ContentHash;
pub use key::SymmetricKey;
pub use memory::{InMemoryContentStore, InMemoryLedger};
pub use registry::Registry;
pub use session::{Session, SessionConfig};
pub use sqlite::{SqliteContentStore, SqliteLedger};
pub use traits::{ContentStore, Ledger, Receipt};
