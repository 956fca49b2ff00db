//! Core data model for vaultgraph: a small hierarchical node graph.
//!
//! - [`id`]: the caller-assigned [`NodeId`]
//! - [`node`]: [`Node`] and the closed [`NodeKind`] set
//! - [`graph`]: [`NodeGraph`], the in-memory store with CRUD and navigation
//! - [`query`]: [`Predicate`] filters over a graph
//! - [`error`]: [`CoreError`]
//!
//! Nothing here touches cryptography or I/O; encoding and persistence live
//! in `vaultgraph-storage`.

pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod query;

pub use error::CoreError;
pub use graph::NodeGraph;
pub use id::NodeId;
pub use node::{Node, NodeKind};
pub use query::Predicate;
