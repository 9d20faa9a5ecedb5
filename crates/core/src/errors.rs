use thiserror::Error;

use crate::config::ConfigError;
use crate::workflow::engine::WorkflowTransitionError;

pub const NO_POLICY_NUMBERS_MESSAGE: &str = "No policy numbers were found in the CSV file.";
pub const READ_FAILURE_MESSAGE: &str = "Unable to read the CSV file. Please try again.";
pub const SUBMISSION_FAILURE_MESSAGE: &str = "Submission failed. Please try again.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    WorkflowTransition(#[from] WorkflowTransitionError),
}

/// Failures that escape to the caller. Read, screening and gateway failures
/// never appear here; the workflow recovers them into state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("config validation failed: {0}")]
    Configuration(String),
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl ApplicationError {
    /// Text safe to show an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(_) => {
                "The request could not be processed. Check inputs and try again.".to_owned()
            }
            Self::Configuration(_) => "An unexpected internal error occurred.".to_owned(),
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "workflow",
            Self::Configuration(_) => "config_validation",
        }
    }
}
