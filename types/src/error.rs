//! Type-matching error types.

use thiserror::Error;

/// Raised only when a policy asks for it; "no match" is never an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Value {what} may not be null")]
    NullValue { what: &'static str },

    #[error("Target {what} must be concrete, got: {found}")]
    NonConcreteTarget { what: &'static str, found: String },

    #[error("Value {what} must be concrete, got: {found}")]
    NonConcreteValue { what: &'static str, found: String },
}

/// Result type for matching operations.
pub type MatchResult<T> = Result<T, MatchError>;
