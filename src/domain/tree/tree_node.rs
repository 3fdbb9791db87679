use std::fmt;

use crate::domain::tree::node_kind::NodeKind;
use crate::domain::utils::id::NodeId;

/// Read-only view of a hierarchy element. The picker only reads tags and
/// identity, it never mutates nodes.
pub trait TreeNode: Clone + fmt::Debug + Send + Sync + 'static {
    fn get_id(&self) -> &NodeId;

    fn get_label(&self) -> &str;

    fn get_description(&self) -> Option<&str> {
        None
    }

    /// Classification tags ("context values") used for predicate matching.
    fn get_context_values(&self) -> &[String];

    /// A leaf never has children; non-leaf nodes may still return an empty page.
    fn is_leaf(&self) -> bool;

    fn get_kind(&self) -> NodeKind {
        NodeKind::Other
    }

    fn has_context_value(&self, value: &str) -> bool {
        self.get_context_values().iter().any(|v| v == value)
    }
}

/// Opaque position inside a paged child listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(pub String);

/// One page of children. `continuation` is set when more children exist.
#[derive(Debug, Clone)]
pub struct ChildPage<N> {
    pub nodes: Vec<N>,
    pub continuation: Option<ContinuationToken>,
}

impl<N> ChildPage<N> {
    pub fn complete(nodes: Vec<N>) -> Self {
        ChildPage { nodes, continuation: None }
    }

    pub fn partial(nodes: Vec<N>, continuation: ContinuationToken) -> Self {
        ChildPage { nodes, continuation: Some(continuation) }
    }

    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// Plain node used by the in-memory hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    pub id: NodeId,
    pub label: String,
    pub description: Option<String>,
    pub kind: NodeKind,
    pub context_values: Vec<String>,
    pub is_leaf: bool,
}

impl ResourceNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        ResourceNode {
            id: NodeId::new(id),
            label: label.into(),
            description: None,
            kind,
            context_values: Vec::new(),
            is_leaf: kind.is_leaf_by_default(),
        }
    }

    pub fn with_context_values(mut self, values: &[&str]) -> Self {
        self.context_values = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

impl TreeNode for ResourceNode {
    fn get_id(&self) -> &NodeId {
        &self.id
    }

    fn get_label(&self) -> &str {
        &self.label
    }

    fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn get_context_values(&self) -> &[String] {
        &self.context_values
    }

    fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    fn get_kind(&self) -> NodeKind {
        self.kind
    }
}
