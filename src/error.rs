use thiserror::Error;

use crate::domain::utils::id::{ActivityId, NodeId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build resource hierarchy: {0}")]
    ModelConstructionError(String),

    #[error("No resource found: {0}")]
    NoResourceFound(String),

    #[error("Operation cancelled by the user.")]
    UserCancelled,

    /// Raised by a prompt step when the user asks for the previous step.
    /// `Wizard::prompt` consumes it, it never reaches the wizard caller.
    #[error("User requested to go back to the previous step.")]
    GoBack,

    #[error("The prompter returned selection {0}, which is not one of the offered entries.")]
    InvalidSelection(usize),

    #[error("Failed to load children of '{parent}': {message}")]
    ChildEnumeration { parent: String, message: String },

    #[error("Activity {0} was already started and can not be run again.")]
    ActivityAlreadyStarted(ActivityId),

    #[error("Activity {0} is not registered.")]
    ActivityNotFound(ActivityId),

    #[error("Activity {0} is still running and can not be disposed.")]
    ActivityStillRunning(ActivityId),

    #[error("Task '{0}' failed:\n{1}")]
    Task(String, anyhow::Error),
}

impl Error {
    pub fn child_enumeration(parent: Option<&NodeId>, message: impl Into<String>) -> Self {
        let parent = parent.map(|id| id.to_string()).unwrap_or_else(|| "<root>".to_string());
        Error::ChildEnumeration { parent, message: message.into() }
    }

    /// True for the conditions a caller should end quietly on instead of reporting.
    pub fn is_user_cancelled(&self) -> bool {
        match self {
            Error::UserCancelled => true,
            Error::Task(_, inner) => inner.downcast_ref::<Error>().is_some_and(Error::is_user_cancelled),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
