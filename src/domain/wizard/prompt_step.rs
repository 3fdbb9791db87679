use async_trait::async_trait;

use crate::domain::tree::tree_node::TreeNode;
use crate::domain::wizard::wizard_context::WizardContext;
use crate::error::Result;

/// One stage of the prompt phase.
///
/// `prompt` returns `Error::GoBack` when the user asks for the previous step
/// and `Error::UserCancelled` when the prompt was dismissed.
#[async_trait]
pub trait PromptStep<N: TreeNode>: Send + Sync {
    fn get_name(&self) -> &str;

    fn should_prompt(&self, _context: &WizardContext<N>) -> bool {
        true
    }

    async fn prompt(&self, context: &mut WizardContext<N>) -> Result<()>;
}
