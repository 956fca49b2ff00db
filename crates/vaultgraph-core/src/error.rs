//! Core error types for vaultgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! caller-contract violations the node graph can report. Dangling parent or
//! child references are deliberately not errors: read paths resolve them to
//! "absent".

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the vaultgraph-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A node id was not found in the graph.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// A node names a parent that is not in the graph.
    #[error("parent '{parent}' of node '{id}' not found")]
    ParentNotFound { id: NodeId, parent: NodeId },

    /// A node was asked to become its own parent.
    #[error("node '{id}' cannot be its own parent")]
    SelfReference { id: NodeId },

    /// Linking would make a node its own ancestor.
    #[error("linking '{child}' under '{parent}' would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    /// A checked insert carried a `children` list that differs from the
    /// stored one. Children are attached with `link`.
    #[error("children of '{id}' must be attached with link")]
    UnmanagedChildren { id: NodeId },

    /// A node kind name outside the closed set.
    #[error("unknown node kind: '{name}'")]
    UnknownKind { name: String },

    /// A structural invariant was violated.
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}
