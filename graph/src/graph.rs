//! Core graph storage implementation.

use crate::index::{BackReferenceIndex, ClassifierIndex, LiteralTable};
use crate::{BackReference, Node, Origin, Owner};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::trace;
use weft_core::{m3, GraphError, GraphResult, Literal, NodeId, SourceInfo};

/// ID allocator for nodes and anonymous names.
#[derive(Debug, Default)]
struct IdAllocator {
    next_node_id: u64,
    next_anonymous: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_node_id: 1,
            next_anonymous: 1,
        }
    }

    fn alloc_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// `@` never appears in a valid path, so generated names cannot collide
    /// with top-level names.
    fn alloc_anonymous_name(&mut self) -> String {
        let name = format!("@{}", self.next_anonymous);
        self.next_anonymous += 1;
        name
    }
}

/// The in-memory instance graph.
#[derive(Debug)]
pub struct Graph {
    /// Node storage
    nodes: HashMap<NodeId, Node>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Path -> top-level node
    top_levels: IndexMap<String, NodeId>,
    /// Classifier index
    classifier_index: ClassifierIndex,
    /// Back-reference index
    back_refs: BackReferenceIndex,
    /// Interned literals
    literals: LiteralTable,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            id_alloc: IdAllocator::new(),
            top_levels: IndexMap::new(),
            classifier_index: ClassifierIndex::new(),
            back_refs: BackReferenceIndex::new(),
            literals: LiteralTable::new(),
        }
    }

    // ==================== Node Creation ====================

    /// Bind a new top-level node at `path`.
    ///
    /// A placeholder left by [`Graph::get_or_create_top_level`] is adopted.
    /// Any other existing binding is an error: a naming conflict when the
    /// classifier differs, a duplicate definition otherwise.
    pub fn create_top_level(
        &mut self,
        path: &str,
        classifier: NodeId,
        origin: Origin,
        source: Option<SourceInfo>,
    ) -> GraphResult<NodeId> {
        validate_path(path)?;

        if let Some(&existing) = self.top_levels.get(path) {
            let node = self.require(existing)?;
            if node.origin == Origin::Placeholder {
                self.set_classifier(existing, classifier)?;
                let node = self.require_mut(existing)?;
                node.origin = origin;
                node.source = source;
                return Ok(existing);
            }
            if node.classifier != Some(classifier) {
                return Err(GraphError::naming_conflict(
                    path,
                    self.classifier_path(existing),
                    self.path_of(classifier),
                ));
            }
            let defined_in = match (&node.origin, &node.source) {
                (Origin::Source(unit), _) => unit.clone(),
                (_, Some(info)) => info.source.clone(),
                _ => "<bootstrap>".to_string(),
            };
            return Err(GraphError::duplicate_definition(path, defined_in));
        }

        let id = self.id_alloc.alloc_node_id();
        let (_, name) = m3::split_path(path);
        let mut node = Node::new(id, name.to_string(), Some(classifier), origin);
        node.path = Some(path.to_string());
        node.source = source;

        self.classifier_index.insert(classifier, id);
        self.top_levels.insert(path.to_string(), id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Look up a top-level node, creating an unclassified placeholder for
    /// paths referenced before they are defined.
    pub fn get_or_create_top_level(&mut self, path: &str) -> GraphResult<NodeId> {
        if let Some(&existing) = self.top_levels.get(path) {
            return Ok(existing);
        }
        validate_path(path)?;

        let id = self.id_alloc.alloc_node_id();
        let (_, name) = m3::split_path(path);
        let mut node = Node::new(id, name.to_string(), None, Origin::Placeholder);
        node.path = Some(path.to_string());

        self.top_levels.insert(path.to_string(), id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Create an anonymous node with a session-unique generated name.
    pub fn create_anonymous(
        &mut self,
        classifier: NodeId,
        origin: Origin,
        source: Option<SourceInfo>,
    ) -> NodeId {
        let id = self.id_alloc.alloc_node_id();
        let name = self.id_alloc.alloc_anonymous_name();
        let mut node = Node::new(id, name, Some(classifier), origin);
        node.source = source;

        self.classifier_index.insert(classifier, id);
        self.nodes.insert(id, node);
        id
    }

    /// Intern a literal, returning the shared node for equal values.
    pub fn intern(&mut self, literal: Literal) -> NodeId {
        if let Some(existing) = self.literals.get(&literal) {
            return existing;
        }

        let classifier = self.top_level(literal.primitive_path());
        let id = self.id_alloc.alloc_node_id();
        let mut node = Node::new(id, literal.to_string(), classifier, Origin::Literal);
        node.literal = Some(literal.clone());

        if let Some(classifier) = classifier {
            self.classifier_index.insert(classifier, id);
        }
        self.literals.insert(literal, id);
        self.nodes.insert(id, node);
        id
    }

    /// Change a node's classifier, keeping the classifier index in sync.
    pub fn set_classifier(&mut self, id: NodeId, classifier: NodeId) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        if let Some(old) = node.classifier.replace(classifier) {
            self.classifier_index.remove(old, id);
        }
        self.classifier_index.insert(classifier, id);
        Ok(())
    }

    // ==================== Node Access ====================

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn require(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn require_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the top-level node bound at `path`.
    pub fn top_level(&self, path: &str) -> Option<NodeId> {
        self.top_levels.get(path).copied()
    }

    /// All top-level bindings in binding order.
    pub fn top_levels(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.top_levels.iter().map(|(path, id)| (path.as_str(), *id))
    }

    pub fn classifier_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.classifier)
    }

    /// Path of a node's classifier, or `<unknown>`.
    pub fn classifier_path(&self, id: NodeId) -> String {
        match self.classifier_of(id) {
            Some(classifier) => self.path_of(classifier),
            None => "<unknown>".to_string(),
        }
    }

    /// Returns true if the node's classifier is the top-level at `path`.
    pub fn is_instance_of(&self, id: NodeId, path: &str) -> bool {
        match (self.classifier_of(id), self.top_level(path)) {
            (Some(classifier), Some(expected)) => classifier == expected,
            _ => false,
        }
    }

    /// Path of a top-level node, or its name for anonymous nodes.
    pub fn path_of(&self, id: NodeId) -> String {
        match self.nodes.get(&id) {
            Some(node) => node.path.clone().unwrap_or_else(|| node.name.clone()),
            None => format!("<missing {}>", id),
        }
    }

    /// Find all instances of a classifier.
    pub fn instances_of(&self, classifier: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.classifier_index.get(classifier)
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    // ==================== Property Reads ====================

    /// Values of a property; empty for missing nodes or properties.
    pub fn values(&self, id: NodeId, property: &str) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.values(property))
            .unwrap_or(&[])
    }

    pub fn value(&self, id: NodeId, property: &str) -> Option<NodeId> {
        self.values(id, property).first().copied()
    }

    pub fn literal(&self, id: NodeId) -> Option<&Literal> {
        self.nodes.get(&id).and_then(|n| n.literal.as_ref())
    }

    /// The literal held by a single-valued property.
    pub fn literal_value(&self, id: NodeId, property: &str) -> Option<&Literal> {
        self.value(id, property).and_then(|v| self.literal(v))
    }

    pub fn string_value(&self, id: NodeId, property: &str) -> Option<&str> {
        self.literal_value(id, property).and_then(|l| l.as_str())
    }

    pub fn integer_value(&self, id: NodeId, property: &str) -> Option<i64> {
        self.literal_value(id, property).and_then(|l| l.as_integer())
    }

    pub fn bool_value(&self, id: NodeId, property: &str) -> Option<bool> {
        self.literal_value(id, property).and_then(|l| l.as_bool())
    }

    // ==================== Property Writes ====================

    /// Append a referenced value.
    pub fn add_value(&mut self, id: NodeId, property: &str, value: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&value) {
            return Err(GraphError::NodeNotFound(value));
        }
        self.require_mut(id)?.push(property, value);
        Ok(())
    }

    /// Append several referenced values.
    pub fn add_values(&mut self, id: NodeId, property: &str, values: &[NodeId]) -> GraphResult<()> {
        for value in values {
            self.add_value(id, property, *value)?;
        }
        Ok(())
    }

    /// Append an anonymous value owned by `id.property`.
    pub fn add_child(&mut self, id: NodeId, property: &str, child: NodeId) -> GraphResult<()> {
        self.claim(id, property, child)?;
        self.require_mut(id)?.push(property, child);
        Ok(())
    }

    /// Replace a property with a single referenced value; returns the old values.
    pub fn set_value(&mut self, id: NodeId, property: &str, value: NodeId) -> GraphResult<Vec<NodeId>> {
        if !self.nodes.contains_key(&value) {
            return Err(GraphError::NodeNotFound(value));
        }
        let old = self.require_mut(id)?.replace(property, vec![value]);
        self.release(id, &old);
        Ok(old)
    }

    /// Replace a property with a single owned value; returns the old values.
    pub fn set_child(&mut self, id: NodeId, property: &str, child: NodeId) -> GraphResult<Vec<NodeId>> {
        self.claim(id, property, child)?;
        let old = self.require_mut(id)?.replace(property, vec![child]);
        self.release(id, &old);
        Ok(old)
    }

    /// Intern a literal and make it the single value of a property.
    pub fn set_literal(&mut self, id: NodeId, property: &str, literal: impl Into<Literal>) -> GraphResult<NodeId> {
        let value = self.intern(literal.into());
        self.set_value(id, property, value)?;
        Ok(value)
    }

    /// Intern a literal and append it to a property.
    pub fn add_literal(&mut self, id: NodeId, property: &str, literal: impl Into<Literal>) -> GraphResult<NodeId> {
        let value = self.intern(literal.into());
        self.add_value(id, property, value)?;
        Ok(value)
    }

    /// Remove one occurrence of a value. Returns false if it was not present.
    pub fn remove_value(&mut self, id: NodeId, property: &str, value: NodeId) -> GraphResult<bool> {
        let removed = self.require_mut(id)?.remove_one(property, value);
        if removed {
            self.release(id, &[value]);
        }
        Ok(removed)
    }

    /// Remove a whole property; returns its values.
    pub fn remove_property(&mut self, id: NodeId, property: &str) -> GraphResult<Vec<NodeId>> {
        let old = self.require_mut(id)?.take(property);
        self.release(id, &old);
        Ok(old)
    }

    fn claim(&mut self, id: NodeId, property: &str, child: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        let node = self.require_mut(child)?;
        if node.is_top_level() || node.is_literal() {
            return Err(GraphError::InvalidOperation(format!(
                "{} is not anonymous and cannot be owned",
                child
            )));
        }
        if let Some(owner) = &node.owner {
            return Err(GraphError::AlreadyOwned {
                node: child,
                owner: owner.node,
                property: owner.property.clone(),
            });
        }
        node.owner = Some(Owner {
            node: id,
            property: property.to_string(),
        });
        Ok(())
    }

    fn release(&mut self, id: NodeId, values: &[NodeId]) {
        for value in values {
            if let Some(node) = self.nodes.get_mut(value) {
                if node.owner.as_ref().is_some_and(|o| o.node == id) {
                    node.owner = None;
                }
            }
        }
    }

    // ==================== Ownership ====================

    /// Values of `id` that it owns, in property order.
    pub fn owned_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for (property, values) in node.properties() {
            for value in values {
                let owned = self.nodes.get(value).is_some_and(|child| {
                    child
                        .owner
                        .as_ref()
                        .is_some_and(|o| o.node == id && o.property == property)
                });
                if owned && !children.contains(value) {
                    children.push(*value);
                }
            }
        }
        children
    }

    /// `id` followed by every node it transitively owns, parents first.
    pub fn owned_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.nodes.contains_key(&next) || out.contains(&next) {
                continue;
            }
            out.push(next);
            let mut children = self.owned_children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// The top-level node at the root of `id`'s ownership chain.
    pub fn top_level_owner(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.nodes.get(&current)?;
            if node.is_top_level() {
                return Some(current);
            }
            current = node.owner.as_ref()?.node;
        }
    }

    // ==================== Back-References ====================

    /// Record that `reference.source()` points at `target`.
    pub fn add_back_reference(&mut self, target: NodeId, reference: BackReference) -> GraphResult<bool> {
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::NodeNotFound(target));
        }
        Ok(self.back_refs.insert(target, reference))
    }

    pub fn remove_back_reference(&mut self, target: NodeId, reference: &BackReference) -> bool {
        self.back_refs.remove(target, reference)
    }

    /// Remove every record on `target` contributed by `source`.
    pub fn remove_back_references_from(&mut self, target: NodeId, source: NodeId) -> usize {
        self.back_refs.remove_from(target, source)
    }

    pub fn back_references(&self, target: NodeId) -> impl Iterator<Item = &BackReference> + '_ {
        self.back_refs.get(target)
    }

    pub fn back_reference_count(&self) -> usize {
        self.back_refs.len()
    }

    // ==================== Deletion ====================

    /// Remove a node from the arena and every index.
    ///
    /// The node is unlinked from its owner and, for top-level nodes, from its
    /// package. Pointers held by other nodes are the caller's to clear.
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<Node> {
        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;

        if let Some(classifier) = node.classifier {
            self.classifier_index.remove(classifier, id);
        }
        if let Some(path) = &node.path {
            self.top_levels.shift_remove(path);
            if let Some(package) = node.value(m3::prop::PACKAGE) {
                if let Some(pkg) = self.nodes.get_mut(&package) {
                    pkg.remove_one(m3::prop::CHILDREN, id);
                }
            }
        }
        if let Some(owner) = &node.owner {
            if let Some(parent) = self.nodes.get_mut(&owner.node) {
                parent.remove_one(&owner.property, id);
            }
        }
        self.back_refs.clear_target(id);
        trace!(node = %id, name = %node.name, "deleted node");
        Ok(node)
    }

    /// Delete a node and everything it owns. Returns the deleted ids.
    pub fn detach_subtree(&mut self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let subtree = self.owned_subtree(id);
        if subtree.is_empty() {
            return Err(GraphError::NodeNotFound(id));
        }
        for node in subtree.iter().rev() {
            if self.nodes.contains_key(node) {
                self.delete_node(*node)?;
            }
        }
        Ok(subtree)
    }

    // ==================== Packages ====================

    /// Get the package at `path`, creating missing packages along the way.
    pub fn get_or_create_package(&mut self, path: &str) -> GraphResult<NodeId> {
        let package_class = self.get_or_create_top_level(m3::PACKAGE)?;
        let root = match self.top_level(m3::ROOT) {
            Some(root) => root,
            None => self.create_top_level(m3::ROOT, package_class, Origin::Bootstrap, None)?,
        };
        if path.is_empty() || path == m3::ROOT {
            return Ok(root);
        }
        validate_path(path)?;

        let mut parent = root;
        let mut prefix = String::new();
        for segment in path.split(m3::PATH_SEPARATOR) {
            if !prefix.is_empty() {
                prefix.push_str(m3::PATH_SEPARATOR);
            }
            prefix.push_str(segment);

            parent = match self.top_level(&prefix) {
                Some(existing) if self.classifier_of(existing) == Some(package_class) => existing,
                Some(existing) => {
                    return Err(GraphError::naming_conflict(
                        prefix.as_str(),
                        self.classifier_path(existing),
                        m3::PACKAGE,
                    ))
                }
                None => {
                    let package =
                        self.create_top_level(&prefix, package_class, Origin::Generated, None)?;
                    self.add_to_package(package, parent)?;
                    package
                }
            };
        }
        Ok(parent)
    }

    /// Link a top-level element into a package.
    pub fn add_to_package(&mut self, element: NodeId, package: NodeId) -> GraphResult<()> {
        self.set_value(element, m3::prop::PACKAGE, package)?;
        self.add_value(package, m3::prop::CHILDREN, element)
    }

    /// Remove a generated package once it has no children, then its
    /// parent if that becomes empty too. Returns true if `package` went away.
    pub fn try_remove_package(&mut self, package: NodeId) -> GraphResult<bool> {
        let node = match self.nodes.get(&package) {
            Some(node) => node,
            None => return Ok(false),
        };
        if node.origin != Origin::Generated || node.has(m3::prop::CHILDREN) {
            return Ok(false);
        }
        let parent = node.value(m3::prop::PACKAGE);
        self.delete_node(package)?;
        if let Some(parent) = parent {
            self.try_remove_package(parent)?;
        }
        Ok(true)
    }
}

/// Check `segment(::segment)*` where segments are identifiers.
fn validate_path(path: &str) -> GraphResult<()> {
    let valid = !path.is_empty()
        && path.split(m3::PATH_SEPARATOR).all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                }
                _ => false,
            }
        });
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidPath(path.to_string()))
    }
}
