//! NodeGraph: the in-memory node store.
//!
//! [`NodeGraph`] is a flat map from [`NodeId`] to [`Node`] that keeps
//! insertion order, so `all_nodes` and every query built on it iterate
//! deterministically. Parent/child edges are weak references by id and are
//! resolved through the map at lookup time.
//!
//! # Mutation paths
//!
//! - **Unchecked**: [`add_node`](NodeGraph::add_node) and
//!   [`remove_node`](NodeGraph::remove_node) treat the store as a plain map.
//!   Callers establishing edges this way own the structural invariants.
//! - **Checked**: [`insert_checked`](NodeGraph::insert_checked),
//!   [`link`](NodeGraph::link), [`unlink`](NodeGraph::unlink) and
//!   [`remove_subtree`](NodeGraph::remove_subtree) maintain both ends of every
//!   edge and refuse to introduce cycles.
//!
//! # Removal policy
//!
//! `remove_node` orphans: it removes exactly one entry and leaves any
//! references to it dangling. Read paths tolerate dangling references
//! (`parent` reports absent, `children` drops them) and
//! [`prune_dangling`](NodeGraph::prune_dangling) sweeps them on demand.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::id::NodeId;
use crate::node::Node;

/// The in-memory node store, exclusively owned by one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraph {
    nodes: IndexMap<NodeId, Node>,
}

impl NodeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        NodeGraph {
            nodes: IndexMap::new(),
        }
    }

    /// Builds a graph from a node sequence, keeping its order.
    ///
    /// Used when rehydrating a decoded snapshot. Duplicate ids are rejected
    /// rather than silently overwritten, since a well-formed snapshot never
    /// contains them.
    pub fn from_nodes<I>(nodes: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut graph = NodeGraph::new();
        for node in nodes {
            if graph.nodes.contains_key(&node.id) {
                return Err(CoreError::GraphInconsistency {
                    reason: format!("duplicate node id '{}'", node.id),
                });
            }
            graph.nodes.insert(node.id.clone(), node);
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the node with the given id, or `None`. Never fails.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access for in-place edits.
    ///
    /// The id field must not be changed through this reference; use
    /// `remove_node` + `add_node` to re-key a node.
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Iterates all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Consumes the graph, yielding its nodes in insertion order.
    pub fn into_nodes(self) -> impl Iterator<Item = Node> {
        self.nodes.into_values()
    }

    /// Resolves a node's parent.
    ///
    /// Returns `None` when the node is unknown, is a root, or names a parent
    /// that is no longer in the store.
    pub fn parent(&self, id: &str) -> Option<&Node> {
        let parent_id = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get(parent_id)
    }

    /// Resolves a node's children in their stored order, silently dropping
    /// ids that are not in the store.
    pub fn children(&self, id: &str) -> Vec<&Node> {
        match self.nodes.get(id) {
            Some(node) => node
                .children
                .iter()
                .filter_map(|child| self.nodes.get(child))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Walks the parent chain, nearest ancestor first.
    ///
    /// Stops at a root, at a dangling parent reference, or when a node is
    /// revisited (possible only if a cycle was introduced through
    /// `add_node`).
    pub fn ancestors(&self, id: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);

        let mut current = self.parent(id);
        while let Some(node) = current {
            if !seen.insert(node.id.as_str()) {
                break;
            }
            out.push(node);
            current = self.parent(node.id.as_str());
        }
        out
    }

    /// Returns `true` if `ancestor` appears on `id`'s parent chain.
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id)
            .iter()
            .any(|node| node.id.as_str() == ancestor)
    }

    // -----------------------------------------------------------------------
    // Unchecked CRUD
    // -----------------------------------------------------------------------

    /// Inserts or overwrites the node under its own id.
    ///
    /// An overwrite keeps the node's original position in iteration order.
    /// No parent or cycle checks are performed here.
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Removes a single entry and returns it. Absent ids are a no-op.
    ///
    /// Does not cascade and does not touch the former parent's `children`.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.shift_remove(id)
    }

    /// Replaces an existing node wholesale.
    ///
    /// Returns [`CoreError::NodeNotFound`] without mutating anything if the id
    /// is not present.
    pub fn update_node(&mut self, node: Node) -> Result<(), CoreError> {
        match self.nodes.get_mut(&node.id) {
            Some(slot) => {
                *slot = node;
                Ok(())
            }
            None => Err(CoreError::NodeNotFound { id: node.id }),
        }
    }

    // -----------------------------------------------------------------------
    // Checked mutations (maintain both ends of every edge)
    // -----------------------------------------------------------------------

    /// Inserts a node after checking its parent reference.
    ///
    /// The parent, if any, must exist and must not be the node itself or one
    /// of its descendants. On success the node is detached from a previous
    /// parent (when overwriting) and appended to the new parent's `children`.
    ///
    /// Children are attached through [`link`](NodeGraph::link), never through
    /// this call: `node.children` must be empty or equal to the stored list.
    /// An overwrite keeps the stored children, so their `parent` fields stay
    /// matched. On failure nothing is mutated.
    pub fn insert_checked(&mut self, mut node: Node) -> Result<&mut Self, CoreError> {
        if let Some(parent) = &node.parent {
            if *parent == node.id {
                return Err(CoreError::SelfReference { id: node.id });
            }
            if !self.nodes.contains_key(parent) {
                return Err(CoreError::ParentNotFound {
                    id: node.id.clone(),
                    parent: parent.clone(),
                });
            }
            if self.is_ancestor(node.id.as_str(), parent.as_str()) {
                return Err(CoreError::CycleDetected {
                    parent: parent.clone(),
                    child: node.id.clone(),
                });
            }
        }

        let stored_children = self
            .nodes
            .get(&node.id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        if !node.children.is_empty() && node.children != stored_children {
            return Err(CoreError::UnmanagedChildren { id: node.id });
        }
        node.children = stored_children;

        let id = node.id.clone();
        let new_parent = node.parent.clone();
        if let Some(previous) = self.nodes.get(&id).and_then(|n| n.parent.clone()) {
            if Some(&previous) != new_parent.as_ref() {
                self.drop_child_ref(&previous, &id);
            }
        }

        self.nodes.insert(id.clone(), node);
        if let Some(parent) = new_parent {
            self.push_child_ref(&parent, &id);
        }
        Ok(self)
    }

    /// Makes `child` a child of `parent`, updating both ends.
    ///
    /// The child is moved out of any previous parent's `children`. Fails if
    /// either node is missing or if the edge would create a cycle.
    pub fn link(&mut self, parent: &str, child: &str) -> Result<(), CoreError> {
        if parent == child {
            return Err(CoreError::SelfReference {
                id: NodeId::from(child),
            });
        }
        for id in [parent, child] {
            if !self.nodes.contains_key(id) {
                return Err(CoreError::NodeNotFound {
                    id: NodeId::from(id),
                });
            }
        }
        if self.is_ancestor(child, parent) {
            return Err(CoreError::CycleDetected {
                parent: NodeId::from(parent),
                child: NodeId::from(child),
            });
        }

        let parent_id = NodeId::from(parent);
        let child_id = NodeId::from(child);
        if let Some(previous) = self.nodes.get(child).and_then(|n| n.parent.clone()) {
            if previous != parent_id {
                self.drop_child_ref(&previous, &child_id);
            }
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent_id.clone());
        }
        self.push_child_ref(&parent_id, &child_id);
        Ok(())
    }

    /// Detaches `child` from its parent, clearing both ends.
    pub fn unlink(&mut self, child: &str) -> Result<(), CoreError> {
        let node = self
            .nodes
            .get_mut(child)
            .ok_or_else(|| CoreError::NodeNotFound {
                id: NodeId::from(child),
            })?;
        if let Some(parent) = node.parent.take() {
            let child_id = node.id.clone();
            self.drop_child_ref(&parent, &child_id);
        }
        Ok(())
    }

    /// Removes a node and everything below it.
    ///
    /// Descendants are found through both `children` lists and `parent`
    /// pointers. The subtree root is also removed from its parent's
    /// `children`. Returns the removed nodes, subtree root first.
    pub fn remove_subtree(&mut self, id: &str) -> Vec<Node> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        let mut order: Vec<NodeId> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(NodeId::from(id));

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                for child in &node.children {
                    if self.nodes.contains_key(child) {
                        queue.push_back(child.clone());
                    }
                }
            }
            for node in self.nodes.values() {
                if node.parent.as_ref() == Some(&current) {
                    queue.push_back(node.id.clone());
                }
            }
            order.push(current);
        }

        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent.clone()) {
            self.drop_child_ref(&parent, &NodeId::from(id));
        }

        order
            .iter()
            .filter_map(|node_id| self.nodes.shift_remove(node_id))
            .collect()
    }

    /// Drops every parent and child reference that no longer resolves.
    ///
    /// Returns the number of references removed.
    pub fn prune_dangling(&mut self) -> usize {
        let live: HashSet<NodeId> = self.nodes.keys().cloned().collect();
        let mut removed = 0;

        for node in self.nodes.values_mut() {
            if let Some(parent) = &node.parent {
                if !live.contains(parent) {
                    node.parent = None;
                    removed += 1;
                }
            }
            let before = node.children.len();
            node.children.retain(|child| live.contains(child));
            removed += before - node.children.len();
        }
        removed
    }

    /// Checks every structural invariant, reporting the first violation.
    ///
    /// - each key equals its node's `id`
    /// - every `parent` resolves, and lists the node among its `children`
    /// - every `children` entry resolves, and points back at this node
    /// - no node is its own ancestor
    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(inconsistency(format!(
                    "key '{}' holds node '{}'",
                    key, node.id
                )));
            }
            if let Some(parent_id) = &node.parent {
                let parent = self.nodes.get(parent_id).ok_or_else(|| {
                    inconsistency(format!(
                        "node '{}' names missing parent '{}'",
                        node.id, parent_id
                    ))
                })?;
                if !parent.children.contains(&node.id) {
                    return Err(inconsistency(format!(
                        "parent '{}' does not list child '{}'",
                        parent_id, node.id
                    )));
                }
            }
            for child_id in &node.children {
                let child = self.nodes.get(child_id).ok_or_else(|| {
                    inconsistency(format!(
                        "node '{}' lists missing child '{}'",
                        node.id, child_id
                    ))
                })?;
                if child.parent.as_ref() != Some(&node.id) {
                    return Err(inconsistency(format!(
                        "child '{}' does not point back at '{}'",
                        child_id, node.id
                    )));
                }
            }
        }

        for id in self.nodes.keys() {
            let mut seen: HashSet<&NodeId> = HashSet::new();
            let mut current = Some(id);
            while let Some(node_id) = current {
                if !seen.insert(node_id) {
                    return Err(inconsistency(format!(
                        "node '{}' is its own ancestor",
                        node_id
                    )));
                }
                current = self.nodes.get(node_id).and_then(|n| n.parent.as_ref());
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn push_child_ref(&mut self, parent: &NodeId, child: &NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.children.contains(child) {
                node.children.push(child.clone());
            }
        }
    }

    fn drop_child_ref(&mut self, parent: &NodeId, child: &NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| c != child);
        }
    }
}

fn inconsistency(reason: String) -> CoreError {
    CoreError::GraphInconsistency { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    /// Helper: root folder `r` with one file `c1`.
    fn root_and_leaf() -> NodeGraph {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("r", NodeKind::Folder, "root").with_children(["c1"]))
            .add_node(Node::new("c1", NodeKind::File, "leaf").with_parent("r"));
        graph
    }

    fn ids<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn root_and_leaf_navigation() {
        let graph = root_and_leaf();
        assert_eq!(ids(graph.children("r")), vec!["c1"]);
        assert_eq!(graph.parent("c1").map(|n| n.id.as_str()), Some("r"));
        assert!(graph.parent("r").is_none());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn add_node_twice_is_idempotent() {
        let mut once = NodeGraph::new();
        once.add_node(Node::new("a", NodeKind::Note, "A"));

        let mut twice = NodeGraph::new();
        twice
            .add_node(Node::new("a", NodeKind::Note, "A"))
            .add_node(Node::new("a", NodeKind::Note, "A"));

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn add_node_overwrite_keeps_position() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("a", NodeKind::Note, "A"))
            .add_node(Node::new("b", NodeKind::Note, "B"))
            .add_node(Node::new("a", NodeKind::Note, "A2"));

        assert_eq!(ids(graph.all_nodes()), vec!["a", "b"]);
        assert_eq!(graph.get_node("a").unwrap().name, "A2");
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut graph = root_and_leaf();
        let before = graph.clone();
        assert!(graph.remove_node("missing").is_none());
        assert_eq!(graph, before);
    }

    #[test]
    fn remove_node_orphans_without_cascade() {
        let mut graph = root_and_leaf();
        let removed = graph.remove_node("r").unwrap();
        assert_eq!(removed.id.as_str(), "r");

        let leaf = graph.get_node("c1").unwrap();
        assert_eq!(leaf.parent, Some(NodeId::from("r")));
        assert!(graph.parent("c1").is_none());
    }

    #[test]
    fn children_drop_dangling_ids() {
        let mut graph = root_and_leaf();
        graph.get_node_mut("r").unwrap().children.push(NodeId::from("ghost"));
        assert_eq!(ids(graph.children("r")), vec!["c1"]);
        assert!(graph.children("nobody").is_empty());
    }

    #[test]
    fn update_missing_node_fails_without_mutation() {
        let mut graph = root_and_leaf();
        let before = graph.clone();
        let err = graph
            .update_node(Node::new("zz", NodeKind::Note, "Z"))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NodeNotFound {
                id: NodeId::from("zz")
            }
        );
        assert_eq!(graph, before);
    }

    #[test]
    fn update_replaces_wholesale() {
        let mut graph = root_and_leaf();
        graph
            .update_node(
                Node::new("c1", NodeKind::Note, "renamed")
                    .with_parent("r")
                    .with_content("body"),
            )
            .unwrap();
        let node = graph.get_node("c1").unwrap();
        assert_eq!(node.kind, NodeKind::Note);
        assert_eq!(node.name, "renamed");
        assert_eq!(node.content_string(), "body");
    }

    #[test]
    fn insert_checked_maintains_both_ends() {
        let mut graph = NodeGraph::new();
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "root"))
            .unwrap();
        graph
            .insert_checked(Node::new("a", NodeKind::File, "a").with_parent("r"))
            .unwrap();
        graph
            .insert_checked(Node::new("b", NodeKind::File, "b").with_parent("r"))
            .unwrap();

        assert_eq!(ids(graph.children("r")), vec!["a", "b"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn insert_checked_rejects_missing_parent() {
        let mut graph = NodeGraph::new();
        let err = graph
            .insert_checked(Node::new("a", NodeKind::File, "a").with_parent("r"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ParentNotFound { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn insert_checked_rejects_self_parent_and_cycles() {
        let mut graph = NodeGraph::new();
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "root"))
            .unwrap();
        graph
            .insert_checked(Node::new("a", NodeKind::Folder, "a").with_parent("r"))
            .unwrap();

        let err = graph
            .insert_checked(Node::new("a", NodeKind::Folder, "a").with_parent("a"))
            .unwrap_err();
        assert!(matches!(err, CoreError::SelfReference { .. }));

        let before = graph.clone();
        let err = graph
            .insert_checked(Node::new("r", NodeKind::Folder, "root").with_parent("a"))
            .unwrap_err();
        assert!(matches!(err, CoreError::CycleDetected { .. }));
        assert_eq!(graph, before);
    }

    #[test]
    fn insert_checked_moves_between_parents() {
        let mut graph = NodeGraph::new();
        graph
            .insert_checked(Node::new("p1", NodeKind::Folder, "p1"))
            .unwrap();
        graph
            .insert_checked(Node::new("p2", NodeKind::Folder, "p2"))
            .unwrap();
        graph
            .insert_checked(Node::new("x", NodeKind::File, "x").with_parent("p1"))
            .unwrap();
        graph
            .insert_checked(Node::new("x", NodeKind::File, "x").with_parent("p2"))
            .unwrap();

        assert!(graph.children("p1").is_empty());
        assert_eq!(ids(graph.children("p2")), vec!["x"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn insert_checked_overwrite_keeps_existing_children() {
        let mut graph = NodeGraph::new();
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "root"))
            .unwrap();
        graph
            .insert_checked(Node::new("a", NodeKind::File, "a").with_parent("r"))
            .unwrap();
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "renamed"))
            .unwrap();

        assert_eq!(graph.get_node("r").unwrap().name, "renamed");
        assert_eq!(ids(graph.children("r")), vec!["a"]);
        assert!(graph.validate().is_ok());

        // Restating the stored list is accepted as well.
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "again").with_children(["a"]))
            .unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn insert_checked_rejects_caller_supplied_children() {
        let mut graph = NodeGraph::new();
        let err = graph
            .insert_checked(Node::new("p", NodeKind::Folder, "p").with_children(["ghost"]))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnmanagedChildren { .. }));
        assert!(graph.is_empty());

        graph
            .insert_checked(Node::new("p", NodeKind::Folder, "p"))
            .unwrap();
        graph
            .insert_checked(Node::new("q", NodeKind::File, "q"))
            .unwrap();
        let before = graph.clone();
        let err = graph
            .insert_checked(Node::new("p", NodeKind::Folder, "p").with_children(["q"]))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnmanagedChildren { .. }));
        assert_eq!(graph, before);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn link_and_unlink_keep_edges_symmetric() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("r", NodeKind::Folder, "root"))
            .add_node(Node::new("s", NodeKind::Folder, "sub"))
            .add_node(Node::new("f", NodeKind::File, "file"));

        graph.link("r", "s").unwrap();
        graph.link("s", "f").unwrap();
        assert!(graph.validate().is_ok());
        assert_eq!(ids(graph.ancestors("f")), vec!["s", "r"]);

        graph.link("r", "f").unwrap();
        assert!(graph.children("s").is_empty());
        assert_eq!(ids(graph.children("r")), vec!["s", "f"]);
        assert!(graph.validate().is_ok());

        graph.unlink("f").unwrap();
        assert!(graph.get_node("f").unwrap().is_root());
        assert_eq!(ids(graph.children("r")), vec!["s"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn link_rejects_cycles_and_missing_nodes() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("r", NodeKind::Folder, "root"))
            .add_node(Node::new("s", NodeKind::Folder, "sub"));
        graph.link("r", "s").unwrap();

        let before = graph.clone();
        assert!(matches!(
            graph.link("s", "r"),
            Err(CoreError::CycleDetected { .. })
        ));
        assert!(matches!(
            graph.link("r", "r"),
            Err(CoreError::SelfReference { .. })
        ));
        assert!(matches!(
            graph.link("r", "ghost"),
            Err(CoreError::NodeNotFound { .. })
        ));
        assert_eq!(graph, before);
    }

    #[test]
    fn ancestors_terminate_on_unchecked_cycle() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("a", NodeKind::Folder, "a").with_parent("b"))
            .add_node(Node::new("b", NodeKind::Folder, "b").with_parent("a"));

        assert_eq!(ids(graph.ancestors("a")), vec!["b"]);
        assert!(matches!(
            graph.validate(),
            Err(CoreError::GraphInconsistency { .. })
        ));
    }

    #[test]
    fn remove_subtree_cascades() {
        let mut graph = NodeGraph::new();
        graph
            .insert_checked(Node::new("r", NodeKind::Folder, "root"))
            .unwrap();
        graph
            .insert_checked(Node::new("s", NodeKind::Folder, "sub").with_parent("r"))
            .unwrap();
        graph
            .insert_checked(Node::new("f", NodeKind::File, "f").with_parent("s"))
            .unwrap();
        graph
            .insert_checked(Node::new("g", NodeKind::File, "g").with_parent("r"))
            .unwrap();

        let removed = graph.remove_subtree("s");
        assert_eq!(ids(&removed), vec!["s", "f"]);
        assert_eq!(ids(graph.all_nodes()), vec!["r", "g"]);
        assert_eq!(ids(graph.children("r")), vec!["g"]);
        assert!(graph.validate().is_ok());
        assert!(graph.remove_subtree("s").is_empty());
    }

    #[test]
    fn prune_dangling_counts_and_cleans() {
        let mut graph = root_and_leaf();
        graph.remove_node("c1");
        graph.add_node(Node::new("o", NodeKind::Note, "orphan").with_parent("gone"));

        assert_eq!(graph.prune_dangling(), 2);
        assert!(graph.get_node("r").unwrap().children.is_empty());
        assert!(graph.get_node("o").unwrap().is_root());
        assert!(graph.validate().is_ok());
        assert_eq!(graph.prune_dangling(), 0);
    }

    #[test]
    fn from_nodes_rejects_duplicates() {
        let err = NodeGraph::from_nodes(vec![
            Node::new("a", NodeKind::Note, "A"),
            Node::new("a", NodeKind::Note, "A again"),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::GraphInconsistency { .. }));
    }

    #[test]
    fn validate_reports_asymmetric_edges() {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("r", NodeKind::Folder, "root"))
            .add_node(Node::new("c", NodeKind::File, "c").with_parent("r"));
        assert!(graph.validate().is_err());
    }
}
