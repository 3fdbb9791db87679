use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Display form of an error captured by a failed activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedError {
    pub message: String,
    /// Best-effort classification, e.g. `NoResourceFound` or `NotFound` for io errors.
    pub error_type: String,
    pub is_user_cancelled: bool,
}

impl ParsedError {
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        ParsedError { message: message.into(), error_type: error_type.into(), is_user_cancelled: false }
    }

    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        if let Some(crate_error) = error.downcast_ref::<Error>() {
            return ParsedError {
                message: error.to_string(),
                error_type: Self::classify(crate_error).to_string(),
                is_user_cancelled: crate_error.is_user_cancelled(),
            };
        }

        let error_type = if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
            format!("{:?}", io_error.kind())
        } else if error.downcast_ref::<serde_json::Error>().is_some() {
            "DeserializationError".to_string()
        } else {
            "Error".to_string()
        };

        ParsedError::new(error.to_string(), error_type)
    }

    fn classify(error: &Error) -> &'static str {
        match error {
            Error::IoError(_) => "IoError",
            Error::DeserializationError(_) => "DeserializationError",
            Error::ModelConstructionError(_) => "ModelConstructionError",
            Error::NoResourceFound(_) => "NoResourceFound",
            Error::UserCancelled | Error::GoBack => "UserCancelled",
            Error::InvalidSelection(_) => "InvalidSelection",
            Error::ChildEnumeration { .. } => "ChildEnumeration",
            Error::ActivityAlreadyStarted(_) | Error::ActivityNotFound(_) | Error::ActivityStillRunning(_) => "ActivityError",
            Error::Task(_, _) => "TaskError",
        }
    }
}

impl Default for ParsedError {
    fn default() -> Self {
        ParsedError::new("Unknown error", "Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message() {
        let parsed = ParsedError::from_anyhow(&anyhow::anyhow!("disk full"));
        assert_eq!(parsed.message, "disk full");
        assert_eq!(parsed.error_type, "Error");
        assert!(!parsed.is_user_cancelled);
    }

    #[test]
    fn test_crate_errors_are_classified() {
        let parsed = ParsedError::from_anyhow(&anyhow::Error::new(Error::UserCancelled));
        assert_eq!(parsed.error_type, "UserCancelled");
        assert!(parsed.is_user_cancelled);

        let parsed = ParsedError::from_anyhow(&anyhow::Error::new(Error::NoResourceFound("app".into())));
        assert_eq!(parsed.error_type, "NoResourceFound");
    }

    #[test]
    fn test_io_errors_use_their_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let parsed = ParsedError::from_anyhow(&anyhow::Error::new(io));
        assert_eq!(parsed.error_type, "NotFound");
        assert_eq!(parsed.message, "missing");
    }
}
