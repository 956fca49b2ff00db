//! Caller-assigned node identifiers.
//!
//! [`NodeId`] is a newtype over `String` so node ids cannot be confused with
//! names, content, or content hashes. Ids are never generated by the store;
//! the caller picks them and they stay stable for the node's lifetime.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier. Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

// Lets `IndexMap<NodeId, _>` be queried with a plain `&str`.
impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId::new("root")), "root");
    }

    #[test]
    fn serde_is_transparent() {
        let id = NodeId::from("c1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"c1\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
