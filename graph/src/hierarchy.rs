//! Generalization order over the type hierarchy stored in the graph.
//!
//! Types point at their supertypes through
//! `generalizations -> general -> rawType`, where the raw type may still be an
//! import stub. Unresolved stubs are skipped.

use crate::Graph;
use std::collections::VecDeque;
use weft_core::{m3, NodeId};

/// Follow an import stub to the node it resolved to.
///
/// Non-stub nodes are returned unchanged; unresolved stubs yield `None`.
pub fn resolve(graph: &Graph, node: NodeId) -> Option<NodeId> {
    if graph.is_instance_of(node, m3::IMPORT_STUB) {
        graph.value(node, m3::prop::RESOLVED_NODE)
    } else {
        Some(node)
    }
}

/// Raw type of a generic type node.
pub fn raw_type(graph: &Graph, generic_type: NodeId) -> Option<NodeId> {
    graph
        .value(generic_type, m3::prop::RAW_TYPE)
        .and_then(|raw| resolve(graph, raw))
}

/// Direct supertypes of `ty`, in declaration order.
pub fn direct_supertypes(graph: &Graph, ty: NodeId) -> Vec<NodeId> {
    graph
        .values(ty, m3::prop::GENERALIZATIONS)
        .iter()
        .filter_map(|g| graph.value(*g, m3::prop::GENERAL))
        .filter_map(|general| raw_type(graph, general))
        .collect()
}

/// `ty` followed by its supertypes breadth-first, each listed once.
///
/// Every type implicitly generalizes `Any`, which closes the order when the
/// graph defines it.
pub fn generalization_order(graph: &Graph, ty: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut queue = VecDeque::from([ty]);
    while let Some(next) = queue.pop_front() {
        if order.contains(&next) {
            continue;
        }
        order.push(next);
        queue.extend(direct_supertypes(graph, next));
    }

    if let Some(any) = graph.top_level(m3::ANY) {
        if let Some(pos) = order.iter().position(|t| *t == any) {
            order.remove(pos);
        }
        order.push(any);
    }
    order
}

/// Returns true if `sub` is `sup` or one of its subtypes.
pub fn is_subtype(graph: &Graph, sub: NodeId, sup: NodeId) -> bool {
    if graph.top_level(m3::NIL) == Some(sub) {
        return true;
    }
    generalization_order(graph, sub).contains(&sup)
}
