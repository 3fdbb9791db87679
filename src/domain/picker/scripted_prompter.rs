use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::picker::quick_pick::{PromptResponse, Prompter, QuickPickRequest};
use crate::error::Result;

/// One pre-recorded user reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Pick the first entry whose label equals the given text.
    Label(String),
    Index(usize),
    Back,
    Cancel,
}

impl ScriptedAnswer {
    pub fn label(label: impl Into<String>) -> Self {
        ScriptedAnswer::Label(label.into())
    }
}

/// Prompter replaying a fixed script and recording every request it receives.
/// An exhausted script behaves like a dismissed prompt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
    requests: Mutex<Vec<QuickPickRequest>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<ScriptedAnswer>) -> Self {
        ScriptedPrompter { answers: Mutex::new(answers.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn get_requests(&self) -> Vec<QuickPickRequest> {
        self.requests.lock().expect("Mutex poisoned").clone()
    }

    pub fn get_prompt_count(&self) -> usize {
        self.requests.lock().expect("Mutex poisoned").len()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn show_quick_pick(&self, request: QuickPickRequest) -> Result<PromptResponse> {
        let answer = self.answers.lock().expect("Mutex poisoned").pop_front();

        let response = match answer {
            Some(ScriptedAnswer::Label(label)) => match request.entries.iter().position(|e| e.label == label) {
                Some(index) => PromptResponse::Picked(index),
                None => {
                    log::warn!("Scripted label '{}' not offered in {:?}, cancelling.", label, request.get_labels());
                    PromptResponse::Cancelled
                }
            },
            Some(ScriptedAnswer::Index(index)) => PromptResponse::Picked(index),
            Some(ScriptedAnswer::Back) => PromptResponse::Back,
            Some(ScriptedAnswer::Cancel) | None => PromptResponse::Cancelled,
        };

        self.requests.lock().expect("Mutex poisoned").push(request);
        Ok(response)
    }
}
