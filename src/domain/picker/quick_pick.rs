use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};

pub const LOAD_MORE_LABEL: &str = "Load more...";
pub const EXPAND_DESCRIPTION: &str = "expand";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickEntry {
    pub label: String,
    pub description: Option<String>,
}

impl QuickPickEntry {
    pub fn new(label: impl Into<String>) -> Self {
        QuickPickEntry { label: label.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickRequest {
    pub placeholder: String,
    pub entries: Vec<QuickPickEntry>,
    pub can_go_back: bool,
    /// "Step i/n", absent when the step count is hidden.
    pub step_label: Option<String>,
}

impl QuickPickRequest {
    pub fn get_labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Picked(usize),
    Back,
    Cancelled,
}

/// The selection surface. Suspends until the user picks an entry, asks to go
/// back, or dismisses the prompt.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn show_quick_pick(&self, request: QuickPickRequest) -> Result<PromptResponse>;
}

/// Outcome of one prompt once cancellation has been turned into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(usize),
    Back,
}

/// Per-wizard view on the prompter. Tracks how many prompts were actually
/// shown, whether going back is possible, and the current step label.
pub struct PromptSession {
    prompter: Arc<dyn Prompter>,
    prompts_shown: usize,
    can_go_back: bool,
    step_label: Option<String>,
}

impl PromptSession {
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        PromptSession { prompter, prompts_shown: 0, can_go_back: false, step_label: None }
    }

    pub fn get_prompts_shown(&self) -> usize {
        self.prompts_shown
    }

    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }

    pub(crate) fn set_can_go_back(&mut self, can_go_back: bool) {
        self.can_go_back = can_go_back;
    }

    pub(crate) fn set_step_label(&mut self, step_label: Option<String>) {
        self.step_label = step_label;
    }

    /// Shows `entries` and returns the user's choice.
    ///
    /// `nested_back` offers "back" even on the first wizard step, used when a
    /// step has its own inner levels to return to. A dismissed prompt becomes
    /// `Error::UserCancelled`.
    pub async fn pick(&mut self, placeholder: &str, entries: Vec<QuickPickEntry>, nested_back: bool) -> Result<PickOutcome> {
        let entry_count = entries.len();
        let request = QuickPickRequest {
            placeholder: placeholder.to_string(),
            entries,
            can_go_back: self.can_go_back || nested_back,
            step_label: self.step_label.clone(),
        };

        self.prompts_shown += 1;
        match self.prompter.show_quick_pick(request).await? {
            PromptResponse::Picked(index) if index < entry_count => Ok(PickOutcome::Picked(index)),
            PromptResponse::Picked(index) => Err(Error::InvalidSelection(index)),
            PromptResponse::Back => Ok(PickOutcome::Back),
            PromptResponse::Cancelled => Err(Error::UserCancelled),
        }
    }
}
