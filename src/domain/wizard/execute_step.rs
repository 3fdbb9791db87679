use async_trait::async_trait;

use crate::domain::activity::progress::ProgressReporter;
use crate::domain::tree::tree_node::TreeNode;
use crate::domain::wizard::wizard_context::WizardContext;

/// One stage of the execute phase. Steps run ascending by `get_priority`.
#[async_trait]
pub trait ExecuteStep<N: TreeNode>: Send + Sync {
    fn get_name(&self) -> &str;

    fn get_priority(&self) -> u32;

    /// Reported to the progress sink right before the step runs.
    fn get_progress_message(&self) -> Option<String> {
        None
    }

    fn should_execute(&self, _context: &WizardContext<N>) -> bool {
        true
    }

    async fn execute(&self, context: &mut WizardContext<N>, progress: &ProgressReporter) -> anyhow::Result<()>;
}
