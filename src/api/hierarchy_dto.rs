use serde::{Deserialize, Serialize};

/// Root of a hierarchy description file.
///
/// ```json
/// { "nodes": [ { "id": "sub-1", "label": "Production", "kind": "subscription",
///                "context_values": ["subscription"], "children": [ ... ] } ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyDto {
    pub nodes: Vec<NodeDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub label: String,

    /// Name of the node kind, see `NodeKind::from_str`. Unknown names map to `Other`.
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub context_values: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Forces leaf behaviour even when `children` is empty.
    #[serde(default)]
    pub is_leaf: Option<bool>,

    /// Simulates a broken remote listing for this node.
    #[serde(default)]
    pub fail_children: bool,

    #[serde(default)]
    pub children: Vec<NodeDto>,
}

impl NodeDto {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        NodeDto {
            id: id.into(),
            label: label.into(),
            kind: None,
            context_values: Vec::new(),
            description: None,
            is_leaf: None,
            fail_children: false,
            children: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn with_context_values(mut self, values: &[&str]) -> Self {
        self.context_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<NodeDto>) -> Self {
        self.children = children;
        self
    }

    pub fn leaf(mut self) -> Self {
        self.is_leaf = Some(true);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_children = true;
        self
    }
}
