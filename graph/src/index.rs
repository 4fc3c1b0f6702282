//! Indexes for efficient graph lookups.

use crate::BackReference;
use indexmap::IndexSet;
use std::collections::HashMap;
use weft_core::{Literal, NodeId};

/// Classifier index: classifier -> instances, in creation order.
#[derive(Debug, Default)]
pub struct ClassifierIndex {
    index: HashMap<NodeId, IndexSet<NodeId>>,
}

impl ClassifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, classifier: NodeId, node_id: NodeId) {
        self.index.entry(classifier).or_default().insert(node_id);
    }

    pub fn remove(&mut self, classifier: NodeId, node_id: NodeId) {
        if let Some(set) = self.index.get_mut(&classifier) {
            set.shift_remove(&node_id);
            if set.is_empty() {
                self.index.remove(&classifier);
            }
        }
    }

    pub fn get(&self, classifier: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.index
            .get(&classifier)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// Back-reference index: target -> records of who points at it.
#[derive(Debug, Default)]
pub struct BackReferenceIndex {
    index: HashMap<NodeId, IndexSet<BackReference>>,
}

impl BackReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the record was already present.
    pub fn insert(&mut self, target: NodeId, reference: BackReference) -> bool {
        self.index.entry(target).or_default().insert(reference)
    }

    pub fn remove(&mut self, target: NodeId, reference: &BackReference) -> bool {
        let Some(set) = self.index.get_mut(&target) else {
            return false;
        };
        let removed = set.shift_remove(reference);
        if set.is_empty() {
            self.index.remove(&target);
        }
        removed
    }

    /// Remove every record on `target` whose forward pointer lives on `source`.
    pub fn remove_from(&mut self, target: NodeId, source: NodeId) -> usize {
        let Some(set) = self.index.get_mut(&target) else {
            return 0;
        };
        let before = set.len();
        set.retain(|r| r.source() != source);
        let removed = before - set.len();
        if set.is_empty() {
            self.index.remove(&target);
        }
        removed
    }

    /// Drop all records held by `target`.
    pub fn clear_target(&mut self, target: NodeId) -> usize {
        self.index.remove(&target).map(|set| set.len()).unwrap_or(0)
    }

    pub fn get(&self, target: NodeId) -> impl Iterator<Item = &BackReference> + '_ {
        self.index.get(&target).into_iter().flat_map(|set| set.iter())
    }

    pub fn len(&self) -> usize {
        self.index.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Literal table: literal value -> interned node.
#[derive(Debug, Default)]
pub struct LiteralTable {
    table: HashMap<Literal, NodeId>,
}

impl LiteralTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, literal: &Literal) -> Option<NodeId> {
        self.table.get(literal).copied()
    }

    pub fn insert(&mut self, literal: Literal, node_id: NodeId) {
        self.table.insert(literal, node_id);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}
