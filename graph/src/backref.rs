//! Back-references: recorded inbound pointers.
//!
//! Whenever processing makes one node point at another, the target records a
//! back-reference naming the pointing node. Unload uses these to find the
//! derived state of other units that depends on a node without scanning the
//! graph.

use serde::{Deserialize, Serialize};
use weft_core::NodeId;

/// A record that some node points at the node owning this record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackReference {
    /// A resolved reference held in `owner.property[offset]`.
    ReferenceUsage {
        owner: NodeId,
        property: String,
        offset: usize,
    },
    /// An expression bound to the target function or property.
    Application { expression: NodeId },
    /// A generalization naming the target as its general type.
    Specialization { generalization: NodeId },
    /// An association property contributed to the target class.
    PropertyFromAssociation { property: NodeId },
    /// An element of an extension kind that mentions the target.
    ModelElement { element: NodeId },
}

impl BackReference {
    pub fn usage(owner: NodeId, property: impl Into<String>, offset: usize) -> Self {
        Self::ReferenceUsage {
            owner,
            property: property.into(),
            offset,
        }
    }

    /// The node holding the forward pointer.
    pub fn source(&self) -> NodeId {
        match self {
            BackReference::ReferenceUsage { owner, .. } => *owner,
            BackReference::Application { expression } => *expression,
            BackReference::Specialization { generalization } => *generalization,
            BackReference::PropertyFromAssociation { property } => *property,
            BackReference::ModelElement { element } => *element,
        }
    }

    /// Short kind name used in diagnostics and serialized tables.
    pub fn kind(&self) -> &'static str {
        match self {
            BackReference::ReferenceUsage { .. } => "referenceUsage",
            BackReference::Application { .. } => "application",
            BackReference::Specialization { .. } => "specialization",
            BackReference::PropertyFromAssociation { .. } => "propertyFromAssociation",
            BackReference::ModelElement { .. } => "modelElement",
        }
    }
}
