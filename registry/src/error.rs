//! Registry error types.

use crate::Role;
use thiserror::Error;

/// Errors raised while configuring the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A {role} is already registered for '{path}'")]
    DuplicateHandler { path: String, role: Role },

    #[error("Cannot register a handler for an empty classifier path")]
    EmptyPath,
}

impl RegistryError {
    pub fn duplicate_handler(path: impl Into<String>, role: Role) -> Self {
        Self::DuplicateHandler {
            path: path.into(),
            role,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
