//! Session-scoped indexes maintained alongside the graph.

use indexmap::{IndexMap, IndexSet};
use weft_core::{m3, NodeId};
use weft_graph::Graph;

/// Indexes over the top-level elements built from source units.
///
/// Entries are added when an element is built and removed when it is
/// detached; resetting an element leaves them in place.
#[derive(Debug, Default, Clone)]
pub struct Context {
    /// Function name -> function definitions, in build order.
    functions: IndexMap<String, IndexSet<NodeId>>,
    /// Classifier -> top-level instances, in build order.
    instances: IndexMap<NodeId, IndexSet<NodeId>>,
    /// Path -> top-level element.
    paths: IndexMap<String, NodeId>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a freshly built top-level element.
    pub fn register(&mut self, graph: &Graph, element: NodeId) {
        let Some(node) = graph.node(element) else {
            return;
        };
        if let Some(path) = &node.path {
            self.paths.insert(path.clone(), element);
        }
        if let Some(classifier) = node.classifier {
            self.instances.entry(classifier).or_default().insert(element);
        }
        if let Some(name) = graph.string_value(element, m3::prop::FUNCTION_NAME) {
            self.functions
                .entry(name.to_string())
                .or_default()
                .insert(element);
        }
    }

    /// Drop every entry for `element`.
    pub fn remove(&mut self, element: NodeId) {
        self.paths.retain(|_, id| *id != element);
        for set in self.instances.values_mut() {
            set.shift_remove(&element);
        }
        self.instances.retain(|_, set| !set.is_empty());
        for set in self.functions.values_mut() {
            set.shift_remove(&element);
        }
        self.functions.retain(|_, set| !set.is_empty());
    }

    /// Function definitions named `name`.
    pub fn functions(&self, name: &str) -> Vec<NodeId> {
        self.functions
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Top-level elements classified by `classifier`.
    pub fn instances_of(&self, classifier: NodeId) -> Vec<NodeId> {
        self.instances
            .get(&classifier)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn element(&self, path: &str) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    pub fn contains(&self, element: NodeId) -> bool {
        self.paths.values().any(|id| *id == element)
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of distinct function names.
    pub fn function_name_count(&self) -> usize {
        self.functions.len()
    }
}
