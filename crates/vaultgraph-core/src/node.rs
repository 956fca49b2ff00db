//! The node record and its closed set of kinds.
//!
//! A [`Node`] refers to its parent and children by [`NodeId`] only. These are
//! weak references resolved through the owning
//! [`NodeGraph`](crate::graph::NodeGraph) at lookup time, so the
//! representation itself never contains cycles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::id::NodeId;

/// The closed set of node kinds. The store only ever compares kinds for
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
    Note,
    Link,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Folder,
        NodeKind::File,
        NodeKind::Note,
        NodeKind::Link,
    ];

    /// The lowercase wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
            NodeKind::Note => "note",
            NodeKind::Link => "link",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind {
                name: s.to_string(),
            })
    }
}

/// A record in the hierarchical graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Caller-assigned identity.
    pub id: NodeId,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label. Not required to be unique.
    pub name: String,
    /// Weak reference to the parent. `None` for roots.
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Ordered weak references to children. Order is caller-significant.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Payload. `Value::Null` when empty.
    #[serde(default)]
    pub content: Value,
    /// Whether `content` is itself ciphertext.
    #[serde(default)]
    pub encrypted: bool,
}

impl Node {
    /// Creates a root node with no children and empty plaintext content.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, name: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            kind,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            content: Value::Null,
            encrypted: false,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    /// Returns `true` if this node has no parent reference.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the content's string representation.
    ///
    /// String content is returned verbatim; any other value is rendered as
    /// compact JSON. Content queries compare these strings, which is looser
    /// than structural equality (`1` and `"1"` compare equal).
    pub fn content_string(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
