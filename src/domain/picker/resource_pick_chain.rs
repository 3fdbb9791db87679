use std::sync::Arc;

use crate::domain::picker::context_value_pick_step::ContextValuePickStep;
use crate::domain::picker::predicate::NodePredicate;
use crate::domain::picker::quick_pick::Prompter;
use crate::domain::picker::recursive_search_step::RecursiveSearchStep;
use crate::domain::tree::tree_data_source::TreeDataSource;
use crate::domain::tree::tree_node::TreeNode;
use crate::domain::wizard::prompt_step::PromptStep;
use crate::domain::wizard::wizard::{Wizard, WizardPromptOptions};
use crate::domain::wizard::wizard_context::WizardContext;
use crate::error::{Error, Result};

/// What to pick: a resource matching `resource_predicate` below a chosen
/// subscription and resource group, optionally followed by a search for a
/// descendant matching `child_predicate`.
#[derive(Debug, Clone)]
pub struct AppResourcePickOptions<N: TreeNode> {
    pub resource_predicate: NodePredicate<N>,
    pub child_predicate: Option<NodePredicate<N>>,
    pub skip_if_one: bool,
    pub hide_step_count: bool,
}

impl<N: TreeNode> AppResourcePickOptions<N> {
    pub fn new(resource_predicate: NodePredicate<N>) -> Self {
        AppResourcePickOptions { resource_predicate, child_predicate: None, skip_if_one: true, hide_step_count: false }
    }

    pub fn with_child_predicate(mut self, child_predicate: NodePredicate<N>) -> Self {
        self.child_predicate = Some(child_predicate);
        self
    }

    pub fn with_skip_if_one(mut self, skip_if_one: bool) -> Self {
        self.skip_if_one = skip_if_one;
        self
    }

    pub fn with_hide_step_count(mut self, hide_step_count: bool) -> Self {
        self.hide_step_count = hide_step_count;
        self
    }
}

pub fn build_app_resource_steps<S>(source: Arc<S>, options: &AppResourcePickOptions<S::Node>) -> Vec<Box<dyn PromptStep<S::Node>>>
where
    S: TreeDataSource + 'static,
{
    let mut steps: Vec<Box<dyn PromptStep<S::Node>>> = vec![
        Box::new(ContextValuePickStep::subscription(source.clone()).with_skip_if_one(options.skip_if_one)),
        Box::new(ContextValuePickStep::resource_group(source.clone()).with_skip_if_one(options.skip_if_one)),
        Box::new(ContextValuePickStep::resource(source.clone(), options.resource_predicate.clone()).with_skip_if_one(options.skip_if_one)),
    ];

    if let Some(child_predicate) = &options.child_predicate {
        steps.push(Box::new(
            RecursiveSearchStep::new(source, child_predicate.clone())
                .with_name("child-resource")
                .with_skip_if_one(options.skip_if_one)
                .with_placeholder("Select a child resource"),
        ));
    }

    steps
}

/// Runs the subscription, group and resource chain and returns the last picked node.
pub async fn pick_app_resource<S>(source: Arc<S>, prompter: Arc<dyn Prompter>, options: &AppResourcePickOptions<S::Node>) -> Result<S::Node>
where
    S: TreeDataSource + 'static,
{
    let mut context = WizardContext::new(prompter);
    prompt_app_resource(source, &mut context, options).await
}

/// Same as [`pick_app_resource`] on a caller-owned context, so the caller
/// keeps the ambient values and the cancellation token.
pub async fn prompt_app_resource<S>(source: Arc<S>, context: &mut WizardContext<S::Node>, options: &AppResourcePickOptions<S::Node>) -> Result<S::Node>
where
    S: TreeDataSource + 'static,
{
    let wizard = Wizard::new(build_app_resource_steps(source, options));
    wizard.prompt(context, &WizardPromptOptions { hide_step_count: options.hide_step_count }).await?;

    context.get_last_picked().cloned().ok_or_else(|| Error::NoResourceFound("no resource was picked".to_string()))
}

/// Searches the whole hierarchy for a node matching `predicate`.
pub async fn pick_tree_item<S>(source: Arc<S>, prompter: Arc<dyn Prompter>, predicate: NodePredicate<S::Node>, skip_if_one: bool) -> Result<S::Node>
where
    S: TreeDataSource + 'static,
{
    let step = RecursiveSearchStep::new(source, predicate).from_root().with_skip_if_one(skip_if_one);
    let steps: Vec<Box<dyn PromptStep<S::Node>>> = vec![Box::new(step)];
    let wizard = Wizard::new(steps);
    let mut context = WizardContext::new(prompter);

    wizard.prompt(&mut context, &WizardPromptOptions { hide_step_count: true }).await?;
    context.into_last_picked().ok_or_else(|| Error::NoResourceFound("no tree item was picked".to_string()))
}
