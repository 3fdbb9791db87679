use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::tree::tree_node::TreeNode;

pub const SUBSCRIPTION_CONTEXT_VALUE: &str = "subscription";
pub const RESOURCE_GROUP_CONTEXT_VALUE: &str = "resourceGroup";
pub const APPLICATION_CONTEXT_VALUE: &str = "application";

/// Closed set of node kinds known to the tree. Sorting is driven by
/// `sort_priority`, never by inspecting concrete node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Subscription,
    ResourceGroup,
    Application,
    ServiceConnectorGroup,
    ServiceConnector,
    Folder,
    File,
    Other,
}

impl NodeKind {
    /// Lower values are listed first among siblings.
    pub fn sort_priority(&self) -> u8 {
        match self {
            NodeKind::Subscription => 0,
            NodeKind::ResourceGroup => 1,
            NodeKind::Application => 2,
            NodeKind::ServiceConnectorGroup => 3,
            NodeKind::ServiceConnector => 4,
            NodeKind::Folder => 5,
            NodeKind::File => 6,
            NodeKind::Other => 7,
        }
    }

    pub fn is_leaf_by_default(&self) -> bool {
        matches!(self, NodeKind::File | NodeKind::ServiceConnector)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Subscription => "subscription",
            NodeKind::ResourceGroup => "resource_group",
            NodeKind::Application => "application",
            NodeKind::ServiceConnectorGroup => "service_connector_group",
            NodeKind::ServiceConnector => "service_connector",
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
            NodeKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "subscription" => Ok(NodeKind::Subscription),
            "resource_group" | "resourcegroup" | "group" => Ok(NodeKind::ResourceGroup),
            "application" | "app" => Ok(NodeKind::Application),
            "service_connector_group" | "serviceconnectorgroup" => Ok(NodeKind::ServiceConnectorGroup),
            "service_connector" | "serviceconnector" => Ok(NodeKind::ServiceConnector),
            "folder" | "directory" => Ok(NodeKind::Folder),
            "file" => Ok(NodeKind::File),
            "other" => Ok(NodeKind::Other),
            _ => Err(()),
        }
    }
}

/// Stable comparator for sibling tree items: kind priority first, then the
/// case-insensitive label. Use with `sort_by`, which keeps equal items in order.
pub fn compare_tree_items<N: TreeNode>(a: &N, b: &N) -> Ordering {
    a.get_kind()
        .sort_priority()
        .cmp(&b.get_kind().sort_priority())
        .then_with(|| a.get_label().to_lowercase().cmp(&b.get_label().to_lowercase()))
}
