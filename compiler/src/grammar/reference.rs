//! Import stubs, generic types, generalizations and multiplicities.

use crate::handler::{KindHandler, UnbindContext};
use crate::process::{source_info, ProcessContext};
use crate::{CompileError, CompileResult};
use weft_core::{m3, NodeId};
use weft_graph::{hierarchy, BackReference, Graph, Origin};

// ==================== Import stubs ====================

pub(crate) struct ImportStubHandler;

/// Paths an unqualified name may refer to, most specific first.
pub(crate) fn candidate_paths(name: &str, package: Option<&str>, imports: &[&str]) -> Vec<String> {
    if name.contains(m3::PATH_SEPARATOR) {
        return vec![name.to_string()];
    }
    let mut paths = Vec::new();
    if let Some(package) = package {
        paths.push(m3::join_path(package, name));
    }
    for import in imports.iter().chain(m3::DEFAULT_IMPORTS) {
        let path = m3::join_path(import, name);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths.push(name.to_string());
    paths
}

/// The package path of the element enclosing `node`, `None` at the root.
fn enclosing_package(graph: &Graph, node: NodeId) -> Option<String> {
    let top = graph.top_level_owner(node)?;
    let package = graph.value(top, m3::prop::PACKAGE)?;
    let path = graph.path_of(package);
    (path != m3::ROOT).then_some(path)
}

/// Resolve the name held by `stub`.
pub(crate) fn resolve_stub(graph: &Graph, stub: NodeId) -> CompileResult<NodeId> {
    let name = graph
        .string_value(stub, m3::prop::ID_OR_PATH)
        .ok_or_else(|| CompileError::internal(format!("import stub {} has no name", stub)))?;
    let imports: Vec<&str> = graph
        .values(stub, m3::prop::SCOPE)
        .iter()
        .filter_map(|s| graph.literal(*s).and_then(|l| l.as_str()))
        .collect();
    let package = enclosing_package(graph, stub);
    candidate_paths(name, package.as_deref(), &imports)
        .iter()
        .filter_map(|path| graph.top_level(path))
        .find(|id| {
            graph
                .node(*id)
                .is_some_and(|n| n.origin != Origin::Placeholder)
        })
        .ok_or_else(|| CompileError::unresolved(name, source_info(graph, stub)))
}

impl KindHandler for ImportStubHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        if cx.graph.value(node, m3::prop::RESOLVED_NODE).is_some() {
            return Ok(());
        }
        let target = resolve_stub(cx.graph, node)?;
        cx.graph.set_value(node, m3::prop::RESOLVED_NODE, target)?;
        cx.graph
            .add_back_reference(target, BackReference::usage(node, m3::prop::RESOLVED_NODE, 0))?;
        Ok(())
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        if let Some(target) = cx.graph.value(node, m3::prop::RESOLVED_NODE) {
            cx.forget(target, &BackReference::usage(node, m3::prop::RESOLVED_NODE, 0))?;
        }
        Ok(())
    }

    fn derived_properties(&self) -> &'static [&'static str] {
        &[m3::prop::RESOLVED_NODE]
    }
}

// ==================== Generic types ====================

/// Generic types built from source hold their raw type through an owned
/// stub; materialized ones point at it directly and record a usage.
pub(crate) struct GenericTypeHandler;

impl KindHandler for GenericTypeHandler {
    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        let Some(raw) = cx.graph.value(node, m3::prop::RAW_TYPE) else {
            return Ok(());
        };
        let owned = cx
            .graph
            .node(raw)
            .and_then(|n| n.owner.as_ref())
            .is_some_and(|o| o.node == node);
        if !owned {
            cx.forget(raw, &BackReference::usage(node, m3::prop::RAW_TYPE, 0))?;
        }
        Ok(())
    }
}

// ==================== Generalizations ====================

pub(crate) struct GeneralizationHandler;

impl GeneralizationHandler {
    fn general_type(graph: &Graph, generalization: NodeId) -> Option<NodeId> {
        let general = graph.value(generalization, m3::prop::GENERAL)?;
        hierarchy::raw_type(graph, general)
    }
}

impl KindHandler for GeneralizationHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_children(node)?;
        let Some(general) = Self::general_type(cx.graph, node) else {
            return Err(CompileError::internal(format!(
                "generalization {} has no resolved general type",
                node
            )));
        };
        cx.graph.add_value(general, m3::prop::SPECIALIZATIONS, node)?;
        cx.graph.add_back_reference(
            general,
            BackReference::Specialization {
                generalization: node,
            },
        )?;
        Ok(())
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        if let Some(general) = Self::general_type(cx.graph, node) {
            cx.unlink(
                general,
                m3::prop::SPECIALIZATIONS,
                node,
                &BackReference::Specialization {
                    generalization: node,
                },
            )?;
        }
        Ok(())
    }
}

// ==================== Multiplicities ====================

pub(crate) struct MultiplicityHandler;

impl KindHandler for MultiplicityHandler {
    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        let lower = graph.integer_value(node, m3::prop::LOWER_BOUND);
        let upper = graph.integer_value(node, m3::prop::UPPER_BOUND);
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower > upper {
                return Err(CompileError::shape(
                    format!(
                        "Invalid multiplicity [{}..{}]: the lower bound is greater than the upper bound",
                        lower, upper
                    ),
                    source_info(graph, node),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_order() {
        let paths = candidate_paths("Person", Some("model"), &["other"]);
        assert_eq!(
            paths,
            vec![
                "model::Person".to_string(),
                "other::Person".to_string(),
                "meta::pure::metamodel::type::Person".to_string(),
                "Person".to_string(),
            ]
        );
    }

    #[test]
    fn test_qualified_name_is_taken_as_is() {
        assert_eq!(
            candidate_paths("model::Person", Some("x"), &["y"]),
            vec!["model::Person".to_string()]
        );
    }
}
