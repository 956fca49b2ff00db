//! Predicate-based filtering over a [`NodeGraph`].
//!
//! [`Predicate`] is a closed set of named filters plus a `Custom` escape
//! hatch. Queries walk `all_nodes` and keep its insertion order.

use std::fmt;
use std::sync::Arc;

use crate::graph::NodeGraph;
use crate::id::NodeId;
use crate::node::{Node, NodeKind};

/// Signature of a caller-supplied node filter.
pub type NodeFilter = dyn Fn(&Node) -> bool + Send + Sync;

/// A pure function from [`Node`] to `bool`.
#[derive(Clone)]
pub enum Predicate {
    /// Exact name equality.
    ByName(String),
    /// Kind equality.
    ByKind(NodeKind),
    /// Equality of [`Node::content_string`] with the given string.
    ByContent(String),
    /// Nodes whose `parent` field names the given id.
    ByParent(NodeId),
    /// Nodes whose `children` contain every listed id. Extra children are
    /// allowed; an empty list matches everything.
    ByChildrenSuperset(Vec<NodeId>),
    /// All inner predicates match.
    All(Vec<Predicate>),
    /// At least one inner predicate matches.
    Any(Vec<Predicate>),
    /// The inner predicate does not match.
    Not(Box<Predicate>),
    /// Arbitrary filter.
    Custom(Arc<NodeFilter>),
}

impl Predicate {
    /// Wraps a closure as a [`Predicate::Custom`].
    pub fn custom<F>(filter: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(filter))
    }

    /// Evaluates the predicate against one node.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Predicate::ByName(name) => node.name == *name,
            Predicate::ByKind(kind) => node.kind == *kind,
            Predicate::ByContent(content) => node.content_string() == *content,
            Predicate::ByParent(parent) => node.parent.as_ref() == Some(parent),
            Predicate::ByChildrenSuperset(wanted) => {
                wanted.iter().all(|id| node.children.contains(id))
            }
            Predicate::All(inner) => inner.iter().all(|p| p.matches(node)),
            Predicate::Any(inner) => inner.iter().any(|p| p.matches(node)),
            Predicate::Not(inner) => !inner.matches(node),
            Predicate::Custom(filter) => filter(node),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::ByName(name) => f.debug_tuple("ByName").field(name).finish(),
            Predicate::ByKind(kind) => f.debug_tuple("ByKind").field(kind).finish(),
            Predicate::ByContent(content) => f.debug_tuple("ByContent").field(content).finish(),
            Predicate::ByParent(parent) => f.debug_tuple("ByParent").field(parent).finish(),
            Predicate::ByChildrenSuperset(ids) => {
                f.debug_tuple("ByChildrenSuperset").field(ids).finish()
            }
            Predicate::All(inner) => f.debug_tuple("All").field(inner).finish(),
            Predicate::Any(inner) => f.debug_tuple("Any").field(inner).finish(),
            Predicate::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Predicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl NodeGraph {
    /// Returns every node matching `predicate`, in `all_nodes` order.
    pub fn query(&self, predicate: &Predicate) -> Vec<&Node> {
        self.all_nodes()
            .filter(|node| predicate.matches(node))
            .collect()
    }

    pub fn query_by_name(&self, name: &str) -> Vec<&Node> {
        self.query(&Predicate::ByName(name.to_string()))
    }

    pub fn query_by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.query(&Predicate::ByKind(kind))
    }

    pub fn query_by_content(&self, content: &str) -> Vec<&Node> {
        self.query(&Predicate::ByContent(content.to_string()))
    }

    pub fn query_by_parent(&self, parent: &str) -> Vec<&Node> {
        self.query(&Predicate::ByParent(NodeId::from(parent)))
    }

    /// Nodes whose children are a superset of `children`.
    pub fn query_by_children<I, T>(&self, children: I) -> Vec<&Node>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.query(&Predicate::ByChildrenSuperset(
            children.into_iter().map(Into::into).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> NodeGraph {
        let mut graph = NodeGraph::new();
        graph
            .add_node(Node::new("r", NodeKind::Folder, "root").with_children(["c1"]))
            .add_node(
                Node::new("c1", NodeKind::File, "readme")
                    .with_parent("r")
                    .with_content("hello"),
            )
            .add_node(Node::new("n1", NodeKind::Note, "readme").with_content(7))
            .add_node(Node::new("x", NodeKind::Folder, "abc").with_children(["a", "b", "c"]))
            .add_node(Node::new("y", NodeKind::Folder, "a-only").with_children(["a"]));
        graph
    }

    fn ids<'a>(nodes: Vec<&'a Node>) -> Vec<&'a str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn by_kind_matches_exactly_the_leaf() {
        let graph = sample();
        assert_eq!(ids(graph.query_by_kind(NodeKind::File)), vec!["c1"]);
    }

    #[test]
    fn by_name_preserves_order() {
        let graph = sample();
        assert_eq!(ids(graph.query_by_name("readme")), vec!["c1", "n1"]);
        assert!(graph.query_by_name("README").is_empty());
    }

    #[test]
    fn by_content_compares_string_form() {
        let graph = sample();
        assert_eq!(ids(graph.query_by_content("hello")), vec!["c1"]);
        assert_eq!(ids(graph.query_by_content("7")), vec!["n1"]);
    }

    #[test]
    fn by_content_on_objects_uses_compact_json() {
        let mut graph = NodeGraph::new();
        graph.add_node(Node::new("o", NodeKind::Note, "o").with_content(json!({ "a": 1 })));
        assert_eq!(ids(graph.query_by_content(r#"{"a":1}"#)), vec!["o"]);
    }

    #[test]
    fn by_parent() {
        let graph = sample();
        assert_eq!(ids(graph.query_by_parent("r")), vec!["c1"]);
        assert!(graph.query_by_parent("c1").is_empty());
    }

    #[test]
    fn by_children_is_superset_test() {
        let graph = sample();
        assert_eq!(ids(graph.query_by_children(["a", "b"])), vec!["x"]);
        assert_eq!(ids(graph.query_by_children(["a"])), vec!["x", "y"]);
        assert_eq!(graph.query_by_children(Vec::<NodeId>::new()).len(), graph.len());
    }

    #[test]
    fn combinators_and_custom() {
        let graph = sample();
        let folders_not_root = Predicate::All(vec![
            Predicate::ByKind(NodeKind::Folder),
            Predicate::Not(Box::new(Predicate::ByName("root".into()))),
        ]);
        assert_eq!(ids(graph.query(&folders_not_root)), vec!["x", "y"]);

        let either = Predicate::Any(vec![
            Predicate::ByName("abc".into()),
            Predicate::ByKind(NodeKind::Note),
        ]);
        assert_eq!(ids(graph.query(&either)), vec!["n1", "x"]);

        let many_children = Predicate::custom(|n| n.children.len() > 1);
        assert_eq!(ids(graph.query(&many_children)), vec!["x"]);
        assert_eq!(format!("{:?}", many_children), "Custom(..)");
    }

    proptest! {
        #[test]
        fn query_is_ordered_subsequence(names in prop::collection::vec("[ab]", 0..12)) {
            let mut graph = NodeGraph::new();
            for (i, name) in names.iter().enumerate() {
                graph.add_node(Node::new(format!("n{i}"), NodeKind::Note, name.clone()));
            }

            let hits = graph.query_by_name("a");
            let expected: Vec<&Node> = graph.all_nodes().filter(|n| n.name == "a").collect();
            prop_assert_eq!(hits, expected);
        }
    }
}
