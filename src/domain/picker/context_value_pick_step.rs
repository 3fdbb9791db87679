use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::picker::predicate::{MatchOutcome, NodePredicate};
use crate::domain::picker::quick_pick::{LOAD_MORE_LABEL, PickOutcome, QuickPickEntry};
use crate::domain::tree::node_kind::{RESOURCE_GROUP_CONTEXT_VALUE, SUBSCRIPTION_CONTEXT_VALUE};
use crate::domain::tree::tree_data_source::TreeDataSource;
use crate::domain::tree::tree_node::{ContinuationToken, TreeNode};
use crate::domain::wizard::prompt_step::PromptStep;
use crate::domain::wizard::wizard_context::WizardContext;
use crate::error::{Error, Result};

pub const SUBSCRIPTION_VALUE_KEY: &str = "subscription";
pub const RESOURCE_GROUP_VALUE_KEY: &str = "resourceGroup";

/// Where a step starts enumerating children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSelection {
    Root,
    /// The node picked by the previous step, or the root when nothing was picked yet.
    LastPicked,
}

impl ParentSelection {
    pub(crate) fn resolve<N: TreeNode>(&self, context: &WizardContext<N>) -> Option<N> {
        match self {
            ParentSelection::Root => None,
            ParentSelection::LastPicked => context.get_last_picked().cloned(),
        }
    }
}

/// Single-level pick among the children of one parent that match a tag.
pub struct ContextValuePickStep<S: TreeDataSource> {
    name: String,
    data_source: Arc<S>,
    predicate: NodePredicate<S::Node>,
    skip_if_one: bool,
    placeholder: String,
    parent: ParentSelection,
    value_key: Option<String>,
}

impl<S: TreeDataSource> ContextValuePickStep<S> {
    pub fn new(name: impl Into<String>, data_source: Arc<S>, predicate: NodePredicate<S::Node>, parent: ParentSelection) -> Self {
        ContextValuePickStep {
            name: name.into(),
            data_source,
            predicate,
            skip_if_one: true,
            placeholder: "Select a resource".to_string(),
            parent,
            value_key: None,
        }
    }

    pub fn subscription(data_source: Arc<S>) -> Self {
        ContextValuePickStep::new("subscription", data_source, NodePredicate::tag(SUBSCRIPTION_CONTEXT_VALUE), ParentSelection::Root)
            .with_placeholder("Select a subscription")
            .with_value_key(SUBSCRIPTION_VALUE_KEY)
    }

    pub fn resource_group(data_source: Arc<S>) -> Self {
        ContextValuePickStep::new("resource-group", data_source, NodePredicate::tag(RESOURCE_GROUP_CONTEXT_VALUE), ParentSelection::LastPicked)
            .with_placeholder("Select a resource group")
            .with_value_key(RESOURCE_GROUP_VALUE_KEY)
    }

    pub fn resource(data_source: Arc<S>, predicate: NodePredicate<S::Node>) -> Self {
        ContextValuePickStep::new("resource", data_source, predicate, ParentSelection::LastPicked)
    }

    pub fn with_skip_if_one(mut self, skip_if_one: bool) -> Self {
        self.skip_if_one = skip_if_one;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Records the picked node's id in the context under `key`.
    pub fn with_value_key(mut self, key: impl Into<String>) -> Self {
        self.value_key = Some(key.into());
        self
    }

    async fn load_page(
        &self,
        context: &WizardContext<S::Node>,
        parent: Option<&S::Node>,
        continuation: Option<ContinuationToken>,
        matches: &mut Vec<S::Node>,
    ) -> Result<Option<ContinuationToken>> {
        if context.is_cancelled() {
            return Err(Error::UserCancelled);
        }

        let page = self.data_source.get_children(parent, continuation).await?;
        matches.extend(page.nodes.into_iter().filter(|node| self.predicate.matches(node) == MatchOutcome::Match));
        Ok(page.continuation)
    }

    fn select(&self, context: &mut WizardContext<S::Node>, node: S::Node) -> Result<()> {
        if let Some(key) = &self.value_key {
            context.set_value(key, node.get_id())?;
        }
        context.push_picked_node(node);
        Ok(())
    }
}

#[async_trait]
impl<S: TreeDataSource + 'static> PromptStep<S::Node> for ContextValuePickStep<S> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn should_prompt(&self, context: &WizardContext<S::Node>) -> bool {
        match context.get_last_picked() {
            Some(node) => self.predicate.matches(node) != MatchOutcome::Match,
            None => true,
        }
    }

    async fn prompt(&self, context: &mut WizardContext<S::Node>) -> Result<()> {
        let parent = self.parent.resolve(&*context);
        let mut matches = Vec::new();
        let mut continuation = self.load_page(context, parent.as_ref(), None, &mut matches).await?;

        while matches.is_empty() && continuation.is_some() {
            continuation = self.load_page(context, parent.as_ref(), continuation, &mut matches).await?;
        }

        loop {
            if matches.is_empty() {
                let scope = parent.as_ref().map(|p| format!(" under '{}'", p.get_label())).unwrap_or_default();
                return Err(Error::NoResourceFound(format!("no {} available{}", self.name, scope)));
            }

            if self.skip_if_one && matches.len() == 1 {
                if continuation.is_none() {
                    log::debug!("Step '{}' auto-selected the only candidate '{}'.", self.name, matches[0].get_label());
                    let node = matches.remove(0);
                    return self.select(context, node);
                }
                continuation = self.load_page(context, parent.as_ref(), continuation, &mut matches).await?;
                continue;
            }

            let mut entries: Vec<QuickPickEntry> = matches
                .iter()
                .map(|node| {
                    let entry = QuickPickEntry::new(node.get_label());
                    match node.get_description() {
                        Some(description) => entry.with_description(description),
                        None => entry,
                    }
                })
                .collect();
            if continuation.is_some() {
                entries.push(QuickPickEntry::new(LOAD_MORE_LABEL));
            }

            match context.ui.pick(&self.placeholder, entries, false).await? {
                PickOutcome::Picked(index) if index < matches.len() => {
                    let node = matches.swap_remove(index);
                    return self.select(context, node);
                }
                PickOutcome::Picked(_) => {
                    continuation = self.load_page(context, parent.as_ref(), continuation, &mut matches).await?;
                }
                PickOutcome::Back => return Err(Error::GoBack),
            }
        }
    }
}
