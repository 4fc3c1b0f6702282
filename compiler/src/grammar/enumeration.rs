use crate::handler::KindHandler;
use crate::process::source_info;
use crate::{CompileError, CompileResult};
use std::collections::HashSet;
use weft_core::{m3, NodeId};
use weft_graph::Graph;

pub(crate) struct EnumerationHandler;

impl KindHandler for EnumerationHandler {
    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        let mut seen = HashSet::new();
        for value in graph.values(node, m3::prop::VALUES) {
            let Some(name) = graph.string_value(*value, m3::prop::NAME) else {
                continue;
            };
            if !seen.insert(name) {
                return Err(CompileError::shape(
                    format!(
                        "Duplicate value '{}' in enumeration '{}'",
                        name,
                        graph.path_of(node)
                    ),
                    source_info(graph, *value),
                ));
            }
        }
        Ok(())
    }
}

/// The value of `enumeration` named `name`.
pub(crate) fn enum_value(graph: &Graph, enumeration: NodeId, name: &str) -> Option<NodeId> {
    graph
        .values(enumeration, m3::prop::VALUES)
        .iter()
        .copied()
        .find(|v| graph.string_value(*v, m3::prop::NAME) == Some(name))
}
