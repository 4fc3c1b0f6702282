//! Error types for the scenario framework.

use thiserror::Error;

/// Result type for scenario runs.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A step that is not a compile failed.
    #[error("step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    /// A step compares against a snapshot no earlier step recorded.
    #[error("snapshot '{name}' was never recorded")]
    UnknownSnapshot { name: String },

    /// Session error outside a compile step.
    #[error("session error: {0}")]
    Session(#[from] weft_session::SessionError),
}

impl ScenarioError {
    pub fn step_execution(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecution {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn unknown_snapshot(name: impl Into<String>) -> Self {
        Self::UnknownSnapshot { name: name.into() }
    }
}
