//! Function definitions and the pieces shared with qualified properties.

use crate::handler::KindHandler;
use crate::process::{source_info, ProcessContext};
use crate::typing::{
    lower_function_type, lower_generic_type, lower_multiplicity, materialize_generic_type,
    typed_value, GraphHierarchy,
};
use crate::{CompileError, CompileResult};
use weft_core::{m3, NodeId};
use weft_graph::Graph;
use weft_types::{
    generic_type_match, multiplicity_match, Argument, GenericType, MatchPolicy, Multiplicity,
    NullMatchBehavior, ParameterMatchBehavior,
};

pub(crate) struct FunctionHandler;

impl KindHandler for FunctionHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        process_signature(cx, node)?;
        if !cx.graph.require(node)?.has(m3::prop::CLASSIFIER_GENERIC_TYPE) {
            let signature = lower_function_type(cx.graph, node).ok_or_else(|| {
                CompileError::internal(format!("signature of {} is unresolved", cx.graph.path_of(node)))
            })?;
            let generic_type = materialize_generic_type(cx.graph, &GenericType::function(signature))?;
            cx.graph
                .add_child(node, m3::prop::CLASSIFIER_GENERIC_TYPE, generic_type)?;
        }
        let parameters = parameter_bindings(cx.graph, node);
        process_body(cx, node, parameters)
    }

    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        if graph.is_instance_of(node, m3::NATIVE_FUNCTION) {
            return Ok(());
        }
        let name = graph
            .string_value(node, m3::prop::FUNCTION_NAME)
            .unwrap_or_default();
        if graph.values(node, m3::prop::EXPRESSION_SEQUENCE).is_empty() {
            return Err(CompileError::shape(
                format!("Function '{}' has an empty body", name),
                source_info(graph, node),
            ));
        }
        check_return(graph, node, &format!("function '{}'", name))
    }
}

/// Process parameter declarations and the declared return type.
pub(crate) fn process_signature(cx: &mut ProcessContext<'_>, node: NodeId) -> CompileResult<()> {
    cx.process_property(node, m3::prop::PARAMETERS)?;
    cx.process_property(node, m3::prop::RETURN_TYPE)?;
    cx.process_property(node, m3::prop::RETURN_MULTIPLICITY)
}

/// Declared parameters as scope entries.
pub(crate) fn parameter_bindings(graph: &Graph, node: NodeId) -> Vec<(String, Argument)> {
    graph
        .values(node, m3::prop::PARAMETERS)
        .iter()
        .filter_map(|p| {
            let name = graph.string_value(*p, m3::prop::NAME)?;
            Some((name.to_string(), typed_value(graph, *p)))
        })
        .collect()
}

/// Process the expression sequence of `node` in a fresh scope holding
/// `variables`.
pub(crate) fn process_body(
    cx: &mut ProcessContext<'_>,
    node: NodeId,
    variables: Vec<(String, Argument)>,
) -> CompileResult<()> {
    cx.state.push_scope();
    for (name, value) in variables {
        cx.state.declare(name, value);
    }
    let result = cx.process_property(node, m3::prop::EXPRESSION_SEQUENCE);
    cx.state.pop_scope();
    result
}

/// `Owner<T, ...|m, ...>` written with the owner's own parameters.
pub(crate) fn class_type(graph: &Graph, class: NodeId) -> GenericType {
    let type_arguments = graph
        .values(class, m3::prop::TYPE_PARAMETERS)
        .iter()
        .filter_map(|p| graph.string_value(*p, m3::prop::NAME))
        .map(GenericType::parameter)
        .collect();
    let multiplicity_arguments = graph
        .values(class, m3::prop::MULTIPLICITY_PARAMETERS)
        .iter()
        .filter_map(|p| graph.literal(*p).and_then(|l| l.as_str()))
        .map(|name| Multiplicity::Parameter(name.to_string()))
        .collect();
    GenericType::nominal(class)
        .with_type_arguments(type_arguments)
        .with_multiplicity_arguments(multiplicity_arguments)
}

/// The last expression of the body must fit the declared return type.
pub(crate) fn check_return(graph: &Graph, node: NodeId, what: &str) -> CompileResult<()> {
    let Some(last) = graph.values(node, m3::prop::EXPRESSION_SEQUENCE).last().copied() else {
        return Ok(());
    };
    let expected_type = graph
        .value(node, m3::prop::RETURN_TYPE)
        .and_then(|g| lower_generic_type(graph, g));
    let expected_multiplicity = graph
        .value(node, m3::prop::RETURN_MULTIPLICITY)
        .and_then(|m| lower_multiplicity(graph, m));
    let (Some(expected_type), Some(expected_multiplicity)) = (expected_type, expected_multiplicity) else {
        return Ok(());
    };
    let found = typed_value(graph, last);

    let hierarchy = GraphHierarchy::new(graph)?;
    let policy = MatchPolicy::new(
        NullMatchBehavior::MatchAnything,
        ParameterMatchBehavior::MatchAnything,
        ParameterMatchBehavior::MatchAnything,
    );
    let type_matches =
        generic_type_match(&hierarchy, &expected_type, found.generic_type.as_ref(), true, &policy)?.is_some();
    let multiplicity_matches =
        multiplicity_match(&expected_multiplicity, found.multiplicity.as_ref(), true, &policy)?.is_some();
    if type_matches && multiplicity_matches {
        return Ok(());
    }
    Err(CompileError::shape(
        format!(
            "Return type error in {}; found: {}; expected: {}",
            what,
            hierarchy.print_argument(&found),
            hierarchy.print_argument(&Argument::new(expected_type, expected_multiplicity))
        ),
        source_info(graph, last),
    ))
}
