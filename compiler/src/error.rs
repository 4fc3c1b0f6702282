//! Compiler error types.

use thiserror::Error;
use weft_core::{GraphError, SourceInfo, Span};
use weft_parser::ParseError;
use weft_registry::RegistryError;
use weft_types::MatchError;

/// Errors that abort a compile batch.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A name that resolves to nothing.
    #[error("{}", located(.message, .source_info.as_ref()))]
    UnresolvedReference {
        message: String,
        source_info: Option<SourceInfo>,
    },

    /// No candidate, or several equally good candidates, for an application.
    #[error("{}", located(.message, .source_info.as_ref()))]
    OverloadResolution {
        message: String,
        source_info: Option<SourceInfo>,
    },

    /// A validator rejected the shape of an element.
    #[error("{}", located(.message, .source_info.as_ref()))]
    Shape {
        message: String,
        source_info: Option<SourceInfo>,
    },

    /// A top-level path bound twice.
    #[error("{}", located(.message, .source_info.as_ref()))]
    NamingConflict {
        message: String,
        source_info: Option<SourceInfo>,
    },

    /// Source text the grammar rejected.
    #[error("{source_id}: {error}")]
    Parse { source_id: String, error: ParseError },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// Graph state that processing or unbinding cannot have produced.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

fn located(message: &str, source_info: Option<&SourceInfo>) -> String {
    match source_info {
        Some(info) => format!("Compilation error at ({}): {}", info, message),
        None => message.to_string(),
    }
}

impl CompileError {
    /// `"<name> has not been defined!"`
    pub fn unresolved(name: &str, source_info: Option<SourceInfo>) -> Self {
        Self::UnresolvedReference {
            message: format!("{} has not been defined!", name),
            source_info,
        }
    }

    /// An unresolved member, such as a property or enum value.
    pub fn missing(message: impl Into<String>, source_info: Option<SourceInfo>) -> Self {
        Self::UnresolvedReference {
            message: message.into(),
            source_info,
        }
    }

    pub fn unknown_variable(name: &str, source_info: Option<SourceInfo>) -> Self {
        Self::UnresolvedReference {
            message: format!("The variable '{}' is unknown!", name),
            source_info,
        }
    }

    pub fn overload(message: impl Into<String>, source_info: Option<SourceInfo>) -> Self {
        Self::OverloadResolution {
            message: message.into(),
            source_info,
        }
    }

    pub fn shape(message: impl Into<String>, source_info: Option<SourceInfo>) -> Self {
        Self::Shape {
            message: message.into(),
            source_info,
        }
    }

    pub fn naming_conflict(message: impl Into<String>, source_info: Option<SourceInfo>) -> Self {
        Self::NamingConflict {
            message: message.into(),
            source_info,
        }
    }

    pub fn parse(source_id: impl Into<String>, error: ParseError) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            error,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency(message.into())
    }

    /// The message without location.
    pub fn message(&self) -> String {
        match self {
            CompileError::UnresolvedReference { message, .. }
            | CompileError::OverloadResolution { message, .. }
            | CompileError::Shape { message, .. }
            | CompileError::NamingConflict { message, .. } => message.clone(),
            CompileError::Parse { error, .. } => error.message.clone(),
            other => other.to_string(),
        }
    }

    /// Where the error was detected, when it has a location.
    pub fn source_info(&self) -> Option<SourceInfo> {
        match self {
            CompileError::UnresolvedReference { source_info, .. }
            | CompileError::OverloadResolution { source_info, .. }
            | CompileError::Shape { source_info, .. }
            | CompileError::NamingConflict { source_info, .. } => source_info.clone(),
            CompileError::Parse { source_id, error } => {
                Some(SourceInfo::new(source_id.clone(), error.span))
            }
            _ => None,
        }
    }

    /// Span of the error within its source, if any.
    pub fn span(&self) -> Option<Span> {
        self.source_info().map(|info| info.span)
    }
}

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;
