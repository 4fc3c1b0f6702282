//! Graph nodes.

use bitflags::bitflags;
use indexmap::IndexMap;
use weft_core::{Literal, NodeId, SourceInfo};

bitflags! {
    /// Compile state of a node within the current graph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompileState: u8 {
        const PROCESSED = 0b0000_0001;
        const VALIDATED = 0b0000_0010;
    }
}

/// Where a node's existence comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Created while bootstrapping the metamodel or an extension.
    Bootstrap,
    /// Built by the parser from the named source unit.
    Source(String),
    /// Created by a processor (derived state) or implicitly (packages).
    Generated,
    /// An interned literal.
    Literal,
    /// A top-level path referenced before it was defined.
    Placeholder,
}

impl Origin {
    /// The source unit this node was built from, if any.
    pub fn source_unit(&self) -> Option<&str> {
        match self {
            Origin::Source(unit) => Some(unit),
            _ => None,
        }
    }
}

/// The parent property owning an anonymous node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    pub node: NodeId,
    pub property: String,
}

/// A node in the instance graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Element name for top-level nodes, generated name for anonymous ones.
    pub name: String,
    /// Full path if this node is bound in the top-level table.
    pub path: Option<String>,
    /// The node representing this node's type.
    pub classifier: Option<NodeId>,
    /// Where the node was written, if it was written at all.
    pub source: Option<SourceInfo>,
    pub origin: Origin,
    /// Owning parent property for anonymous nodes.
    pub owner: Option<Owner>,
    pub state: CompileState,
    /// Literal payload for interned literal nodes.
    pub literal: Option<Literal>,
    /// Ordered multimap of property name to values.
    properties: IndexMap<String, Vec<NodeId>>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, classifier: Option<NodeId>, origin: Origin) -> Self {
        Self {
            id,
            name,
            path: None,
            classifier,
            source: None,
            origin,
            owner: None,
            state: CompileState::empty(),
            literal: None,
            properties: IndexMap::new(),
        }
    }

    /// Returns true if the node is bound in the top-level table.
    pub fn is_top_level(&self) -> bool {
        self.path.is_some()
    }

    /// Returns true if the node is an interned literal.
    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    pub fn is_processed(&self) -> bool {
        self.state.contains(CompileState::PROCESSED)
    }

    pub fn is_validated(&self) -> bool {
        self.state.contains(CompileState::VALIDATED)
    }

    /// All values of a property, in insertion order.
    pub fn values(&self, property: &str) -> &[NodeId] {
        self.properties
            .get(property)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }

    /// The first value of a property.
    pub fn value(&self, property: &str) -> Option<NodeId> {
        self.values(property).first().copied()
    }

    /// Returns true if the property has at least one value.
    pub fn has(&self, property: &str) -> bool {
        !self.values(property).is_empty()
    }

    /// Property names in insertion order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(|k| k.as_str())
    }

    /// All (property, values) pairs in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn push(&mut self, property: &str, value: NodeId) {
        self.properties
            .entry(property.to_string())
            .or_default()
            .push(value);
    }

    pub(crate) fn replace(&mut self, property: &str, values: Vec<NodeId>) -> Vec<NodeId> {
        if values.is_empty() {
            return self.take(property);
        }
        self.properties
            .insert(property.to_string(), values)
            .unwrap_or_default()
    }

    pub(crate) fn remove_one(&mut self, property: &str, value: NodeId) -> bool {
        let Some(values) = self.properties.get_mut(property) else {
            return false;
        };
        let Some(pos) = values.iter().position(|v| *v == value) else {
            return false;
        };
        values.remove(pos);
        if values.is_empty() {
            self.properties.shift_remove(property);
        }
        true
    }

    pub(crate) fn take(&mut self, property: &str) -> Vec<NodeId> {
        self.properties.shift_remove(property).unwrap_or_default()
    }
}
