//! The frozen dispatch registry.

use crate::Role;
use indexmap::IndexMap;
use std::sync::Arc;
use weft_core::NodeId;
use weft_graph::{hierarchy, Graph};

/// Immutable map from `(classifier path, role)` to handler.
pub struct Matcher<H: ?Sized> {
    handlers: IndexMap<(String, Role), Arc<H>>,
}

impl<H: ?Sized> Clone for Matcher<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<H: ?Sized> Matcher<H> {
    pub(crate) fn from_handlers(handlers: IndexMap<(String, Role), Arc<H>>) -> Self {
        Self { handlers }
    }

    /// Handler registered for exactly `(path, role)`.
    pub fn handler(&self, path: &str, role: Role) -> Option<&Arc<H>> {
        self.handlers.get(&(path.to_string(), role))
    }

    /// Handler for the node's exact kind only.
    pub fn full_match(&self, graph: &Graph, node: NodeId, role: Role) -> Option<&Arc<H>> {
        let classifier = graph.classifier_of(node)?;
        let path = graph.node(classifier)?.path.as_deref()?;
        self.handler(path, role)
    }

    /// Handler for the node's kind, falling back to the nearest ancestor kind
    /// along the classifier's generalization order.
    pub fn dispatch(&self, graph: &Graph, node: NodeId, role: Role) -> Option<&Arc<H>> {
        let classifier = graph.classifier_of(node)?;
        hierarchy::generalization_order(graph, classifier)
            .into_iter()
            .filter_map(|kind| graph.node(kind).and_then(|n| n.path.as_deref()))
            .find_map(|path| self.handler(path, role))
    }

    /// Kinds with at least one handler, in registration order.
    pub fn registered_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for (path, _) in self.handlers.keys() {
            if !kinds.contains(&path.as_str()) {
                kinds.push(path.as_str());
            }
        }
        kinds
    }

    /// Number of `(kind, role)` registrations.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
