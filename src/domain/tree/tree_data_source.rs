use async_trait::async_trait;

use crate::domain::tree::tree_node::{ChildPage, ContinuationToken, TreeNode};
use crate::error::Result;

/// Provides the children of a node, one page at a time.
///
/// `parent == None` addresses the hierarchy root. An empty page without a
/// continuation means "no (more) children" and is not an error; a listing that
/// fails should return `Error::ChildEnumeration`.
#[async_trait]
pub trait TreeDataSource: Send + Sync {
    type Node: TreeNode;

    async fn get_children(&self, parent: Option<&Self::Node>, continuation: Option<ContinuationToken>) -> Result<ChildPage<Self::Node>>;
}

