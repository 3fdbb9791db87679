use crate::domain::activity::progress::{ProgressReporter, ProgressUpdate};
use crate::domain::tree::tree_node::TreeNode;
use crate::domain::wizard::execute_step::ExecuteStep;
use crate::domain::wizard::prompt_step::PromptStep;
use crate::domain::wizard::wizard_context::{ContextSnapshot, WizardContext};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct WizardPromptOptions {
    pub hide_step_count: bool,
}

/// A step that completed during the prompt phase, kept for back-navigation.
struct StepRecord<N> {
    index: usize,
    /// Context as it was right before the step ran.
    snapshot: ContextSnapshot<N>,
    /// False when the step finished without showing anything (e.g. skip-if-one).
    prompted: bool,
}

/// Runs prompt steps in order with back-navigation, then execute steps by priority.
pub struct Wizard<N: TreeNode> {
    prompt_steps: Vec<Box<dyn PromptStep<N>>>,
    execute_steps: Vec<Box<dyn ExecuteStep<N>>>,
}

impl<N: TreeNode> Wizard<N> {
    pub fn new(prompt_steps: Vec<Box<dyn PromptStep<N>>>) -> Self {
        Wizard { prompt_steps, execute_steps: Vec::new() }
    }

    pub fn with_execute_steps(mut self, execute_steps: Vec<Box<dyn ExecuteStep<N>>>) -> Self {
        self.execute_steps = execute_steps;
        self
    }

    pub fn get_prompt_step_count(&self) -> usize {
        self.prompt_steps.len()
    }

    /// Runs the prompt phase, mutating `context` in place.
    ///
    /// "Back" returns to the closest earlier step that actually showed a
    /// prompt and restores the context to what it was before that step. Going
    /// back from the first prompted step ends the wizard with
    /// `Error::UserCancelled`.
    pub async fn prompt(&self, context: &mut WizardContext<N>, options: &WizardPromptOptions) -> Result<()> {
        let total = self.prompt_steps.len();
        let mut history: Vec<StepRecord<N>> = Vec::new();
        let mut index = 0;

        while index < total {
            if context.is_cancelled() {
                return Err(Error::UserCancelled);
            }

            let step = &self.prompt_steps[index];
            if !step.should_prompt(context) {
                log::debug!("Skipping prompt step '{}' ({}/{}).", step.get_name(), index + 1, total);
                index += 1;
                continue;
            }

            let snapshot = context.snapshot();
            let shown_before = context.ui.get_prompts_shown();
            context.ui.set_can_go_back(history.iter().any(|record| record.prompted));
            context.ui.set_step_label(if options.hide_step_count { None } else { Some(format!("Step {}/{}", index + 1, total)) });

            log::debug!("Running prompt step '{}' ({}/{}).", step.get_name(), index + 1, total);

            match step.prompt(context).await {
                Ok(()) => {
                    let prompted = context.ui.get_prompts_shown() > shown_before;
                    history.push(StepRecord { index, snapshot, prompted });
                    index += 1;
                }
                Err(Error::GoBack) => {
                    context.restore(snapshot);
                    index = Self::go_back(context, &mut history)?;
                    log::debug!("Going back to prompt step '{}'.", self.prompt_steps[index].get_name());
                }
                Err(e) => {
                    if e.is_user_cancelled() {
                        log::info!("Wizard cancelled by the user at step '{}'.", step.get_name());
                    }
                    return Err(e);
                }
            }
        }

        context.ui.set_step_label(None);
        log::info!("Prompt phase finished with {} picked nodes.", context.get_picked_nodes().len());
        Ok(())
    }

    /// Pops history up to and including the last prompted step and returns its index.
    fn go_back(context: &mut WizardContext<N>, history: &mut Vec<StepRecord<N>>) -> Result<usize> {
        while let Some(record) = history.pop() {
            context.restore(record.snapshot);
            if record.prompted {
                return Ok(record.index);
            }
        }

        log::info!("Back requested on the first step, cancelling the wizard.");
        Err(Error::UserCancelled)
    }

    /// Runs the execute phase. Steps are ordered ascending by priority; ties
    /// keep their registration order.
    pub async fn execute(&self, context: &mut WizardContext<N>, progress: &ProgressReporter) -> Result<()> {
        let mut steps: Vec<&Box<dyn ExecuteStep<N>>> = self.execute_steps.iter().collect();
        steps.sort_by_key(|step| step.get_priority());

        for step in steps {
            if context.is_cancelled() {
                return Err(Error::UserCancelled);
            }

            if !step.should_execute(context) {
                log::debug!("Skipping execute step '{}'.", step.get_name());
                continue;
            }

            if let Some(message) = step.get_progress_message() {
                progress.report(ProgressUpdate::message(message));
            }

            log::info!("Executing step '{}' (priority {}).", step.get_name(), step.get_priority());
            step.execute(context, progress).await.map_err(|e| Error::Task(step.get_name().to_string(), e))?;
        }

        Ok(())
    }
}
