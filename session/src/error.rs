//! Session error types.

use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Compilation error.
    #[error("{0}")]
    Compile(#[from] weft_compiler::CompileError),

    /// Graph error outside a compile batch.
    #[error("graph error: {0}")]
    Graph(#[from] weft_core::GraphError),

    /// Metadata encoding error.
    #[error("metadata error: {0}")]
    Metadata(#[from] weft_metadata::MetadataError),

    /// Delete of a unit the session does not know.
    #[error("unknown source: {source_id}")]
    UnknownSource { source_id: String },

    /// The configuration enables an extension that was not supplied.
    #[error("missing extension: {name}")]
    MissingExtension { name: String },
}

impl SessionError {
    pub fn unknown_source(source_id: impl Into<String>) -> Self {
        Self::UnknownSource {
            source_id: source_id.into(),
        }
    }

    pub fn missing_extension(name: impl Into<String>) -> Self {
        Self::MissingExtension { name: name.into() }
    }

    /// The compile error behind this error, if any.
    pub fn as_compile_error(&self) -> Option<&weft_compiler::CompileError> {
        match self {
            SessionError::Compile(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
