use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an activity: `NotStarted -> Running -> Succeeded | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl ActivityStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivityStatus::Succeeded | ActivityStatus::Failed)
    }

    pub fn can_transition_to(&self, next: ActivityStatus) -> bool {
        matches!(
            (self, next),
            (ActivityStatus::NotStarted, ActivityStatus::Running) | (ActivityStatus::Running, ActivityStatus::Succeeded) | (ActivityStatus::Running, ActivityStatus::Failed)
        )
    }

    pub fn get_context_value(&self) -> &'static str {
        match self {
            ActivityStatus::NotStarted => "activity:notStarted",
            ActivityStatus::Running => "activity:running",
            ActivityStatus::Succeeded => "activity:succeeded",
            ActivityStatus::Failed => "activity:failed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityStatus::NotStarted => "NotStarted",
            ActivityStatus::Running => "Running",
            ActivityStatus::Succeeded => "Succeeded",
            ActivityStatus::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityStatus::*;

    #[test]
    fn test_only_forward_transitions_are_allowed() {
        assert!(NotStarted.can_transition_to(Running));
        assert!(Running.can_transition_to(Succeeded));
        assert!(Running.can_transition_to(Failed));

        assert!(!NotStarted.can_transition_to(Succeeded));
        assert!(!Running.can_transition_to(Running));
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Running));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Succeeded.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Running.is_terminal());
        assert!(!NotStarted.is_terminal());
    }
}
