//! Common error types for weft.

use crate::NodeId;
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Node not found.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A top-level path is already bound to a node of another kind.
    #[error("The element '{path}' is already defined as a {existing}, cannot redefine it as a {requested}")]
    NamingConflict {
        path: String,
        existing: String,
        requested: String,
    },

    /// A top-level path is already defined by a source unit.
    #[error("The element '{path}' already exists in the source '{source_id}'")]
    DuplicateDefinition { path: String, source_id: String },

    /// A path that does not follow `segment::segment::Name`.
    #[error("Invalid element path: '{0}'")]
    InvalidPath(String),

    /// An anonymous node can only be owned by one parent property.
    #[error("Node {node} is already owned by {owner}.{property}")]
    AlreadyOwned {
        node: NodeId,
        owner: NodeId,
        property: String,
    },

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl GraphError {
    pub fn naming_conflict(
        path: impl Into<String>,
        existing: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::NamingConflict {
            path: path.into(),
            existing: existing.into(),
            requested: requested.into(),
        }
    }

    pub fn duplicate_definition(path: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            path: path.into(),
            source_id: source_id.into(),
        }
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
