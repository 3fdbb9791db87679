use std::fmt;
use std::sync::Arc;

use crate::domain::tree::tree_node::TreeNode;

/// Classification of a node against a `NodePredicate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The node itself satisfies the filter.
    Match,
    /// The node and its whole subtree are pruned.
    NoMatch,
    /// The node does not match, but its children might.
    Indeterminate,
}

enum PredicateRule<N> {
    Tag(String),
    AnyOf(Vec<Vec<String>>),
    Custom(Arc<dyn Fn(&N) -> bool + Send + Sync>),
}

/// Immutable filter over tree nodes.
///
/// A non-matching node is `Indeterminate` as long as it can have children,
/// unless it carries one of the `exclude` tags, which prunes it.
pub struct NodePredicate<N> {
    rule: PredicateRule<N>,
    exclude: Vec<String>,
}

impl<N: TreeNode> NodePredicate<N> {
    pub fn tag(tag: impl Into<String>) -> Self {
        NodePredicate { rule: PredicateRule::Tag(tag.into()), exclude: Vec::new() }
    }

    /// Matches when the node's tags are a superset of at least one of `tag_sets`.
    pub fn any_of(tag_sets: Vec<Vec<String>>) -> Self {
        NodePredicate { rule: PredicateRule::AnyOf(tag_sets), exclude: Vec::new() }
    }

    pub fn custom(filter: impl Fn(&N) -> bool + Send + Sync + 'static) -> Self {
        NodePredicate { rule: PredicateRule::Custom(Arc::new(filter)), exclude: Vec::new() }
    }

    pub fn with_exclude(mut self, tags: &[&str]) -> Self {
        self.exclude.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    pub fn is_match(&self, node: &N) -> bool {
        match &self.rule {
            PredicateRule::Tag(tag) => node.has_context_value(tag),
            PredicateRule::AnyOf(tag_sets) => tag_sets.iter().any(|set| set.iter().all(|tag| node.has_context_value(tag))),
            PredicateRule::Custom(filter) => filter(node),
        }
    }

    pub fn matches(&self, node: &N) -> MatchOutcome {
        if self.exclude.iter().any(|tag| node.has_context_value(tag)) {
            return MatchOutcome::NoMatch;
        }

        if self.is_match(node) {
            MatchOutcome::Match
        } else if node.is_leaf() {
            MatchOutcome::NoMatch
        } else {
            MatchOutcome::Indeterminate
        }
    }
}

impl<N> Clone for NodePredicate<N> {
    fn clone(&self) -> Self {
        let rule = match &self.rule {
            PredicateRule::Tag(tag) => PredicateRule::Tag(tag.clone()),
            PredicateRule::AnyOf(sets) => PredicateRule::AnyOf(sets.clone()),
            PredicateRule::Custom(filter) => PredicateRule::Custom(Arc::clone(filter)),
        };
        NodePredicate { rule, exclude: self.exclude.clone() }
    }
}

impl<N> fmt::Debug for NodePredicate<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            PredicateRule::Tag(tag) => f.debug_tuple("Tag").field(tag).finish()?,
            PredicateRule::AnyOf(sets) => f.debug_tuple("AnyOf").field(sets).finish()?,
            PredicateRule::Custom(_) => write!(f, "Custom(..)")?,
        }
        if !self.exclude.is_empty() {
            write!(f, " exclude {:?}", self.exclude)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::node_kind::NodeKind;
    use crate::domain::tree::tree_node::ResourceNode;

    fn group() -> ResourceNode {
        ResourceNode::new("g", "group", NodeKind::ResourceGroup).with_context_values(&["group"])
    }

    #[test]
    fn test_single_tag() {
        let predicate = NodePredicate::tag("group");
        assert_eq!(predicate.matches(&group()), MatchOutcome::Match);
    }

    #[test]
    fn test_tag_sets_require_superset() {
        let app = ResourceNode::new("a", "app", NodeKind::Application).with_context_values(&["app", "linux"]);
        let needs_both = NodePredicate::any_of(vec![vec!["app".into(), "windows".into()], vec!["app".into(), "linux".into()]]);
        let needs_windows = NodePredicate::any_of(vec![vec!["app".into(), "windows".into()]]);

        assert_eq!(needs_both.matches(&app), MatchOutcome::Match);
        assert_eq!(needs_windows.matches(&app), MatchOutcome::Indeterminate);
    }

    #[test]
    fn test_untagged_nodes_descend_unless_leaf() {
        let predicate = NodePredicate::tag("app");
        let folder = ResourceNode::new("d", "dir", NodeKind::Folder);
        let file = ResourceNode::new("f", "file", NodeKind::File);

        assert_eq!(predicate.matches(&folder), MatchOutcome::Indeterminate);
        assert_eq!(predicate.matches(&file), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_exclude_prunes_subtree() {
        let predicate = NodePredicate::tag("app").with_exclude(&["group"]);
        assert_eq!(predicate.matches(&group()), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_custom_filter() {
        let predicate = NodePredicate::custom(|node: &ResourceNode| node.label.starts_with("gr"));
        assert_eq!(predicate.matches(&group()), MatchOutcome::Match);
        assert_eq!(format!("{:?}", predicate), "Custom(..)");
    }
}
