//! Classes, properties and qualified properties.

use super::function::{check_return, class_type, parameter_bindings, process_body, process_signature};
use crate::handler::KindHandler;
use crate::process::{source_info, ProcessContext};
use crate::typing::{
    lower_generic_type, lower_multiplicity, materialize_generic_type, materialize_multiplicity, metaclass,
};
use crate::{CompileError, CompileResult};
use std::collections::HashSet;
use weft_core::{m3, NodeId};
use weft_graph::{hierarchy, Graph, Origin};
use weft_types::{Argument, GenericType, Multiplicity};

// ==================== Classes ====================

pub(crate) struct ClassHandler;

impl KindHandler for ClassHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_property(node, m3::prop::TYPE_PARAMETERS)?;
        cx.process_property(node, m3::prop::GENERALIZATIONS)?;
        cx.process_property(node, m3::prop::PROPERTIES)?;
        generate_all_versions(cx, node)?;
        cx.process_property(node, m3::prop::QUALIFIED_PROPERTIES)
    }

    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        let mut pending = hierarchy::direct_supertypes(graph, node);
        let mut seen = HashSet::new();
        while let Some(next) = pending.pop() {
            if next == node {
                return Err(CompileError::shape(
                    format!(
                        "Class '{}' is involved in a circular generalization",
                        graph.path_of(node)
                    ),
                    source_info(graph, node),
                ));
            }
            if seen.insert(next) {
                pending.extend(hierarchy::direct_supertypes(graph, next));
            }
        }

        let mut names = HashSet::new();
        for property in graph.values(node, m3::prop::PROPERTIES) {
            let Some(name) = graph.string_value(*property, m3::prop::NAME) else {
                continue;
            };
            if !names.insert(name) {
                return Err(CompileError::shape(
                    format!(
                        "Property conflict on class {}: property '{}' defined more than once",
                        graph.path_of(node),
                        name
                    ),
                    source_info(graph, *property),
                ));
            }
        }
        Ok(())
    }
}

fn is_temporal(graph: &Graph, ty: NodeId) -> bool {
    graph
        .values(ty, m3::prop::STEREOTYPES)
        .iter()
        .any(|s| graph.literal(*s).and_then(|l| l.as_str()) == Some(m3::TEMPORAL_STEREOTYPE))
}

/// For every property typed with a temporal class, add a generated
/// `<name>AllVersions: Type[*]` property to the class.
fn generate_all_versions(cx: &mut ProcessContext<'_>, class: NodeId) -> CompileResult<()> {
    let existing: HashSet<String> = cx
        .graph
        .values(class, m3::prop::GENERATED_PROPERTIES)
        .iter()
        .filter_map(|p| cx.graph.string_value(*p, m3::prop::NAME))
        .map(str::to_string)
        .collect();

    let mut wanted = Vec::new();
    for property in cx.graph.values(class, m3::prop::PROPERTIES) {
        let Some(generic_type) = cx.graph.value(*property, m3::prop::GENERIC_TYPE) else {
            continue;
        };
        let Some(ty) = hierarchy::raw_type(cx.graph, generic_type) else {
            continue;
        };
        if !is_temporal(cx.graph, ty) {
            continue;
        }
        let Some(name) = cx.graph.string_value(*property, m3::prop::NAME) else {
            continue;
        };
        let name = format!("{}{}", name, m3::ALL_VERSIONS_SUFFIX);
        if existing.contains(&name) {
            continue;
        }
        let Some(lowered) = lower_generic_type(cx.graph, generic_type) else {
            continue;
        };
        let source = cx.graph.node(*property).and_then(|n| n.source.clone());
        wanted.push((name, lowered, source));
    }

    let property_class = metaclass(cx.graph, m3::PROPERTY)?;
    for (name, generic, source) in wanted {
        let generated = cx.graph.create_anonymous(property_class, Origin::Generated, source);
        cx.graph.set_literal(generated, m3::prop::NAME, name.as_str())?;
        let generic_type = materialize_generic_type(cx.graph, &generic)?;
        cx.graph
            .add_child(generated, m3::prop::GENERIC_TYPE, generic_type)?;
        let multiplicity = materialize_multiplicity(cx.graph, &Multiplicity::ZERO_MANY)?;
        cx.graph
            .add_child(generated, m3::prop::MULTIPLICITY, multiplicity)?;
        cx.graph.set_value(generated, m3::prop::OWNER, class)?;
        cx.graph
            .add_child(class, m3::prop::GENERATED_PROPERTIES, generated)?;
        tracing::trace!(class = %class, property = %name, "generated property");
        cx.enqueue(generated);
    }
    Ok(())
}

// ==================== Properties ====================

pub(crate) struct PropertyHandler;

impl PropertyHandler {
    /// The type a property is read from: the owning class, or for an
    /// association end the type of the opposite end.
    fn owner_type(cx: &mut ProcessContext<'_>, property: NodeId) -> CompileResult<Option<GenericType>> {
        let owner = cx
            .graph
            .value(property, m3::prop::OWNER)
            .ok_or_else(|| CompileError::internal(format!("property {} has no owner", property)))?;
        if !cx.graph.is_instance_of(owner, m3::ASSOCIATION) {
            return Ok(Some(class_type(cx.graph, owner)));
        }
        let ends = cx.graph.values(owner, m3::prop::PROPERTIES).to_vec();
        if ends.len() != 2 {
            return Ok(None);
        }
        let Some(opposite) = ends.into_iter().find(|p| *p != property) else {
            return Ok(None);
        };
        let Some(generic_type) = cx.graph.value(opposite, m3::prop::GENERIC_TYPE) else {
            return Ok(None);
        };
        cx.process(generic_type)?;
        Ok(lower_generic_type(cx.graph, generic_type))
    }
}

impl KindHandler for PropertyHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_children(node)?;
        if cx.graph.require(node)?.has(m3::prop::CLASSIFIER_GENERIC_TYPE) {
            return Ok(());
        }
        let Some(owner_type) = Self::owner_type(cx, node)? else {
            return Ok(());
        };
        let value_type = cx
            .graph
            .value(node, m3::prop::GENERIC_TYPE)
            .and_then(|g| lower_generic_type(cx.graph, g));
        let multiplicity = cx
            .graph
            .value(node, m3::prop::MULTIPLICITY)
            .and_then(|m| lower_multiplicity(cx.graph, m));
        let (Some(value_type), Some(multiplicity)) = (value_type, multiplicity) else {
            return Err(CompileError::internal(format!(
                "type of property {} is unresolved",
                cx.graph.path_of(node)
            )));
        };
        let property_class = metaclass(cx.graph, m3::PROPERTY)?;
        let classifier_type = GenericType::nominal(property_class)
            .with_type_arguments(vec![owner_type, value_type])
            .with_multiplicity_arguments(vec![multiplicity]);
        let generic_type = materialize_generic_type(cx.graph, &classifier_type)?;
        cx.graph
            .add_child(node, m3::prop::CLASSIFIER_GENERIC_TYPE, generic_type)?;
        Ok(())
    }
}

// ==================== Qualified properties ====================

pub(crate) struct QualifiedPropertyHandler;

impl KindHandler for QualifiedPropertyHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        process_signature(cx, node)?;
        let mut variables = Vec::new();
        if let Some(owner) = cx.graph.value(node, m3::prop::OWNER) {
            variables.push((
                "this".to_string(),
                Argument::new(class_type(cx.graph, owner), Multiplicity::PURE_ONE),
            ));
        }
        variables.extend(parameter_bindings(cx.graph, node));
        process_body(cx, node, variables)
    }

    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        let name = graph.string_value(node, m3::prop::NAME).unwrap_or_default();
        if graph.values(node, m3::prop::EXPRESSION_SEQUENCE).is_empty() {
            return Err(CompileError::shape(
                format!("Qualified property '{}' has an empty body", name),
                source_info(graph, node),
            ));
        }
        check_return(graph, node, &format!("qualified property '{}'", name))
    }
}
