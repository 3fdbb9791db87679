use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::hierarchy_dto::{HierarchyDto, NodeDto};
use crate::domain::tree::node_kind::{NodeKind, compare_tree_items};
use crate::domain::tree::tree_data_source::TreeDataSource;
use crate::domain::tree::tree_node::{ChildPage, ContinuationToken, ResourceNode, TreeNode};
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

#[derive(Debug)]
struct StoredNode {
    node: ResourceNode,
    children: Vec<NodeId>,
    fail_children: bool,
}

/// Hierarchy held entirely in memory, served in pages of `page_size`.
///
/// Children are ordered once at construction with `compare_tree_items`.
#[derive(Debug)]
pub struct InMemoryTreeDataSource {
    roots: Vec<NodeId>,
    nodes: HashMap<NodeId, StoredNode>,
    page_size: usize,
    fetch_count: AtomicUsize,
}

impl InMemoryTreeDataSource {
    pub fn from_dto(dto: HierarchyDto, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::ModelConstructionError("page_size must be greater than zero".to_string()));
        }

        let mut nodes = HashMap::new();
        let roots = Self::insert_level(dto.nodes, &mut nodes)?;

        log::info!("In-memory hierarchy constructed with {} nodes ({} roots).", nodes.len(), roots.len());

        Ok(InMemoryTreeDataSource { roots, nodes, page_size, fetch_count: AtomicUsize::new(0) })
    }

    fn insert_level(level: Vec<NodeDto>, nodes: &mut HashMap<NodeId, StoredNode>) -> Result<Vec<NodeId>> {
        let mut stored: Vec<(ResourceNode, Vec<NodeDto>, bool)> = Vec::with_capacity(level.len());

        for dto in level {
            let kind = match dto.kind.as_deref() {
                Some(name) => name.parse::<NodeKind>().unwrap_or_else(|_| {
                    log::warn!("Unknown node kind '{}' for node '{}', using 'other'.", name, dto.id);
                    NodeKind::Other
                }),
                None => NodeKind::Other,
            };

            let is_leaf = dto.is_leaf.unwrap_or(kind.is_leaf_by_default() || (dto.children.is_empty() && kind == NodeKind::Other));
            if is_leaf && !dto.children.is_empty() {
                return Err(Error::ModelConstructionError(format!("Leaf node '{}' must not have children", dto.id)));
            }

            let node = ResourceNode {
                id: NodeId::new(dto.id),
                label: dto.label,
                description: dto.description,
                kind,
                context_values: dto.context_values,
                is_leaf,
            };
            stored.push((node, dto.children, dto.fail_children));
        }

        stored.sort_by(|a, b| compare_tree_items(&a.0, &b.0));

        let mut ids = Vec::with_capacity(stored.len());
        for (node, children, fail_children) in stored {
            let id = node.id.clone();
            if nodes.contains_key(&id) {
                return Err(Error::ModelConstructionError(format!("Duplicate node id '{}'", id)));
            }

            // Reserve the id before descending so a child can not reuse it.
            nodes.insert(id.clone(), StoredNode { node, children: Vec::new(), fail_children });
            let child_ids = Self::insert_level(children, nodes)?;
            if let Some(entry) = nodes.get_mut(&id) {
                entry.children = child_ids;
            }
            ids.push(id);
        }

        Ok(ids)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id).map(|stored| &stored.node)
    }

    pub fn get_node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of `get_children` calls served so far.
    pub fn get_fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn parse_offset(parent: Option<&NodeId>, continuation: Option<ContinuationToken>) -> Result<usize> {
        match continuation {
            Some(token) => token.0.parse::<usize>().map_err(|_| Error::child_enumeration(parent, format!("invalid continuation token '{}'", token.0))),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl TreeDataSource for InMemoryTreeDataSource {
    type Node = ResourceNode;

    async fn get_children(&self, parent: Option<&ResourceNode>, continuation: Option<ContinuationToken>) -> Result<ChildPage<ResourceNode>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let parent_id = parent.map(|p| p.get_id());

        let child_ids = match parent_id {
            None => &self.roots,
            Some(id) => {
                let stored = self.nodes.get(id).ok_or_else(|| Error::child_enumeration(Some(id), "node is not part of this hierarchy"))?;
                if stored.fail_children {
                    return Err(Error::child_enumeration(Some(id), "the remote listing failed"));
                }
                &stored.children
            }
        };

        let start = Self::parse_offset(parent_id, continuation)?.min(child_ids.len());
        let end = (start + self.page_size).min(child_ids.len());

        let nodes: Vec<ResourceNode> = child_ids[start..end].iter().filter_map(|id| self.nodes.get(id)).map(|stored| stored.node.clone()).collect();

        log::debug!("Served {} children of {:?} (offset {}).", nodes.len(), parent_id, start);

        if end < child_ids.len() {
            Ok(ChildPage::partial(nodes, ContinuationToken(end.to_string())))
        } else {
            Ok(ChildPage::complete(nodes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HierarchyDto {
        HierarchyDto {
            nodes: vec![
                NodeDto::new("sub-1", "Production").with_kind("subscription").with_children(vec![
                    NodeDto::new("rg-2", "beta").with_kind("resource_group"),
                    NodeDto::new("rg-1", "alpha").with_kind("resource_group"),
                    NodeDto::new("rg-3", "gamma").with_kind("resource_group"),
                ]),
            ],
        }
    }

    #[tokio::test]
    async fn test_children_are_paged_and_sorted() {
        let source = InMemoryTreeDataSource::from_dto(sample(), 2).unwrap();
        let root = source.get_children(None, None).await.unwrap();
        let sub = root.nodes[0].clone();

        let first = source.get_children(Some(&sub), None).await.unwrap();
        let labels: Vec<&str> = first.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "beta"]);
        assert!(first.has_more());

        let second = source.get_children(Some(&sub), first.continuation).await.unwrap();
        assert_eq!(second.nodes.len(), 1);
        assert_eq!(second.nodes[0].label, "gamma");
        assert!(!second.has_more());
        assert_eq!(source.get_fetch_count(), 3);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let dto = HierarchyDto { nodes: vec![NodeDto::new("a", "A").with_children(vec![NodeDto::new("a", "again")])] };
        let result = InMemoryTreeDataSource::from_dto(dto, 10);
        assert!(matches!(result, Err(Error::ModelConstructionError(_))));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(InMemoryTreeDataSource::from_dto(sample(), 0).is_err());
    }

    #[tokio::test]
    async fn test_failing_node_reports_child_enumeration_error() {
        let dto = HierarchyDto { nodes: vec![NodeDto::new("broken", "Broken").with_kind("folder").failing()] };
        let source = InMemoryTreeDataSource::from_dto(dto, 10).unwrap();
        let broken = source.get_node(&NodeId::new("broken")).cloned().unwrap();

        let result = source.get_children(Some(&broken), None).await;
        assert!(matches!(result, Err(Error::ChildEnumeration { .. })));
    }
}
