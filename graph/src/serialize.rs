//! Canonical graph serialization.
//!
//! Produces a deterministic text form of the whole graph that never mentions
//! node ids or generated names, so two graphs built from the same text compare
//! byte-for-byte equal. Top-level nodes are listed by path; anonymous nodes are
//! written inline under the property that owns them and referenced elsewhere by
//! their ownership path (`Owner.property[index]`).

use crate::{Graph, Node};
use std::fmt::Write;
use weft_core::NodeId;

/// Serialize the graph in canonical form.
pub fn serialize(graph: &Graph) -> String {
    let mut paths: Vec<(&str, NodeId)> = graph.top_levels().collect();
    paths.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (path, id) in paths {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let _ = writeln!(out, "{} : {}", path, graph.classifier_path(id));
        write_body(graph, node, 1, &mut out);
    }
    out
}

/// Size of the canonical serialization in bytes.
pub fn serialized_size(graph: &Graph) -> usize {
    serialize(graph).len()
}

fn write_body(graph: &Graph, node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);

    let mut names: Vec<&str> = node.property_names().collect();
    names.sort_unstable();
    for name in names {
        let values = node.values(name);
        let owned: Vec<bool> = values
            .iter()
            .map(|v| is_owned_by(graph, *v, node.id, name))
            .collect();

        if owned.iter().any(|o| *o) {
            let _ = writeln!(out, "{}{} =", indent, name);
            for (value, owned) in values.iter().zip(owned) {
                if owned {
                    let Some(child) = graph.node(*value) else {
                        continue;
                    };
                    let _ = writeln!(out, "{}  - {}", indent, graph.classifier_path(*value));
                    write_body(graph, child, depth + 2, out);
                } else {
                    let _ = writeln!(out, "{}  - {}", indent, reference(graph, *value));
                }
            }
        } else {
            let mut rendered: Vec<String> = values.iter().map(|v| reference(graph, *v)).collect();
            // Order of pure references depends on processing order across units.
            if rendered.len() > 1 && values.iter().all(|v| graph.literal(*v).is_none()) {
                rendered.sort();
            }
            let _ = writeln!(out, "{}{} = [{}]", indent, name, rendered.join(", "));
        }
    }

    let mut back_refs: Vec<String> = graph
        .back_references(node.id)
        .map(|r| format!("{}({})", r.kind(), reference(graph, r.source())))
        .collect();
    if !back_refs.is_empty() {
        back_refs.sort();
        let _ = writeln!(out, "{}<- [{}]", indent, back_refs.join(", "));
    }
}

fn is_owned_by(graph: &Graph, value: NodeId, owner: NodeId, property: &str) -> bool {
    graph
        .node(value)
        .and_then(|n| n.owner.as_ref())
        .is_some_and(|o| o.node == owner && o.property == property)
}

/// Id-free rendering of a pointer to `id`.
fn reference(graph: &Graph, id: NodeId) -> String {
    let Some(node) = graph.node(id) else {
        return "<dangling>".to_string();
    };
    if let Some(literal) = &node.literal {
        return literal.to_string();
    }
    if let Some(path) = &node.path {
        return path.clone();
    }
    match &node.owner {
        Some(owner) => {
            let index = graph
                .values(owner.node, &owner.property)
                .iter()
                .position(|v| *v == id)
                .unwrap_or(0);
            format!("{}.{}[{}]", reference(graph, owner.node), owner.property, index)
        }
        None => format!("<unowned {}>", graph.classifier_path(id)),
    }
}
