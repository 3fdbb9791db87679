use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::picker::quick_pick::{PromptSession, Prompter};
use crate::domain::tree::tree_node::TreeNode;
use crate::error::Result;

/// State restored when the user navigates back over a step.
#[derive(Debug, Clone)]
pub(crate) struct ContextSnapshot<N> {
    picked_nodes: Vec<N>,
    values: HashMap<String, Value>,
}

/// Mutable accumulator owned by exactly one wizard run.
pub struct WizardContext<N: TreeNode> {
    picked_nodes: Vec<N>,
    values: HashMap<String, Value>,
    cancellation: CancellationToken,
    pub ui: PromptSession,
}

impl<N: TreeNode> WizardContext<N> {
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        WizardContext { picked_nodes: Vec::new(), values: HashMap::new(), cancellation: CancellationToken::new(), ui: PromptSession::new(prompter) }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn get_picked_nodes(&self) -> &[N] {
        &self.picked_nodes
    }

    pub fn get_last_picked(&self) -> Option<&N> {
        self.picked_nodes.last()
    }

    pub fn push_picked_node(&mut self, node: N) {
        log::debug!("Picked node {:?} ('{}').", node.get_id(), node.get_label());
        self.picked_nodes.push(node);
    }

    /// Consumes the context and returns the final pick.
    pub fn into_last_picked(mut self) -> Option<N> {
        self.picked_nodes.pop()
    }

    pub fn set_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub(crate) fn snapshot(&self) -> ContextSnapshot<N> {
        ContextSnapshot { picked_nodes: self.picked_nodes.clone(), values: self.values.clone() }
    }

    pub(crate) fn restore(&mut self, snapshot: ContextSnapshot<N>) {
        self.picked_nodes = snapshot.picked_nodes;
        self.values = snapshot.values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::picker::scripted_prompter::ScriptedPrompter;
    use crate::domain::tree::node_kind::NodeKind;
    use crate::domain::tree::tree_node::ResourceNode;
    use crate::domain::utils::id::NodeId;

    fn context() -> WizardContext<ResourceNode> {
        WizardContext::new(Arc::new(ScriptedPrompter::default()))
    }

    #[test]
    fn test_values_round_trip_through_json() {
        let mut ctx = context();
        ctx.set_value("subscription", &NodeId::new("sub-1")).unwrap();

        let id: Option<NodeId> = ctx.get_value("subscription").unwrap();
        assert_eq!(id, Some(NodeId::new("sub-1")));
        assert!(ctx.get_value::<String>("missing").unwrap().is_none());
    }

    #[test]
    fn test_restore_discards_later_changes() {
        let mut ctx = context();
        ctx.push_picked_node(ResourceNode::new("a", "A", NodeKind::Subscription));
        let snapshot = ctx.snapshot();

        ctx.push_picked_node(ResourceNode::new("b", "B", NodeKind::ResourceGroup));
        ctx.set_value("group", &"b").unwrap();
        ctx.restore(snapshot);

        assert_eq!(ctx.get_picked_nodes().len(), 1);
        assert!(!ctx.has_value("group"));
    }
}
