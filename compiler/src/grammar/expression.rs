//! Expression typing: applications, property access, variables and
//! instance values.

use super::enumeration::enum_value;
use crate::handler::{KindHandler, UnbindContext};
use crate::process::ProcessContext;
use crate::typing::{
    lower_function_type, lower_generic_type, lower_multiplicity, metaclass, set_computed_type,
    typed_value,
};
use crate::{CompileError, CompileResult};
use weft_core::{m3, NodeId};
use weft_graph::{hierarchy, BackReference, Graph};
use weft_types::{
    match_arguments, resolve_at, select_best, Argument, Bindings, FunctionType, GenericType,
    Multiplicity, Selection, TypeHierarchy,
};

/// Remove the application back-reference left on the node `FUNC` points at.
fn forget_application(node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
    if let Some(function) = cx.graph.value(node, m3::prop::FUNC) {
        cx.forget(function, &BackReference::Application { expression: node })?;
    }
    Ok(())
}

/// Point `FUNC` at `target` and record the application on it.
fn bind_application(graph: &mut Graph, node: NodeId, target: NodeId) -> CompileResult<()> {
    graph.set_value(node, m3::prop::FUNC, target)?;
    graph.add_back_reference(target, BackReference::Application { expression: node })?;
    Ok(())
}

// ==================== Function expressions ====================

pub(crate) struct FunctionExpressionHandler;

impl FunctionExpressionHandler {
    /// `let name = value` declares `name` in the current scope.
    fn process_let(node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        let values = cx.graph.values(node, m3::prop::PARAMETERS_VALUES).to_vec();
        let [name_holder, value] = values.as_slice() else {
            return Err(CompileError::internal(format!(
                "let expression {} has {} arguments",
                node,
                values.len()
            )));
        };
        let name = cx
            .graph
            .values(*name_holder, m3::prop::VALUES)
            .first()
            .and_then(|l| cx.graph.literal(*l))
            .and_then(|l| l.as_str())
            .map(str::to_string)
            .ok_or_else(|| CompileError::internal(format!("let expression {} has no name", node)))?;
        let typed = typed_value(cx.graph, *value);
        let multiplicity = typed.multiplicity.clone().unwrap_or(Multiplicity::ZERO_MANY);
        set_computed_type(cx.graph, node, typed.generic_type.as_ref(), &multiplicity)?;
        cx.state.declare(name, typed);
        Ok(())
    }

    /// Function definitions an application named `name` may call.
    fn candidates(cx: &ProcessContext<'_>, name: &str) -> Vec<NodeId> {
        let (package, short) = m3::split_path(name);
        cx.context
            .functions(short)
            .into_iter()
            .filter(|function| match package {
                Some(package) => cx
                    .graph
                    .value(*function, m3::prop::PACKAGE)
                    .is_some_and(|p| cx.graph.path_of(p) == package),
                None => true,
            })
            .collect()
    }

    fn describe(cx: &ProcessContext<'_>, name: &str, arguments: &[Argument]) -> CompileResult<String> {
        let hierarchy = cx.hierarchy()?;
        let printed: Vec<String> = arguments
            .iter()
            .map(|a| format!("_:{}", hierarchy.print_argument(a)))
            .collect();
        Ok(format!("{}({})", name, printed.join(",")))
    }
}

impl KindHandler for FunctionExpressionHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_property(node, m3::prop::PARAMETERS_VALUES)?;
        let name = cx
            .graph
            .string_value(node, m3::prop::FUNCTION_NAME)
            .map(str::to_string)
            .ok_or_else(|| CompileError::internal(format!("application {} has no function name", node)))?;
        if name == m3::LET_FUNCTION {
            return Self::process_let(node, cx);
        }

        let arguments: Vec<Argument> = cx
            .graph
            .values(node, m3::prop::PARAMETERS_VALUES)
            .iter()
            .map(|v| typed_value(cx.graph, *v))
            .collect();

        let mut signatures: Vec<(NodeId, FunctionType)> = Vec::new();
        for candidate in Self::candidates(cx, &name) {
            cx.process_property(candidate, m3::prop::PARAMETERS)?;
            cx.process_property(candidate, m3::prop::RETURN_TYPE)?;
            cx.process_property(candidate, m3::prop::RETURN_MULTIPLICITY)?;
            if let Some(signature) = lower_function_type(cx.graph, candidate) {
                signatures.push((candidate, signature));
            }
        }
        for (_, signature) in &signatures {
            for parameter in &signature.parameters {
                cx.prepare_type(&parameter.generic_type)?;
            }
        }
        for argument in &arguments {
            if let Some(generic) = &argument.generic_type {
                cx.prepare_type(generic)?;
            }
        }

        let policy = cx.policy();
        let selection = {
            let hierarchy = cx.hierarchy()?;
            let mut scored = Vec::new();
            for (candidate, signature) in &signatures {
                if let Some(score) = match_arguments(&hierarchy, &signature.parameters, &arguments, &policy)? {
                    scored.push(((*candidate, signature), score));
                }
            }
            match select_best(scored) {
                Selection::Unique((candidate, signature)) => {
                    let bindings = infer_bindings(&hierarchy, signature, &arguments);
                    Selection::Unique((
                        candidate,
                        signature.return_type.substitute(&bindings),
                        signature.return_multiplicity.substitute(&bindings),
                    ))
                }
                Selection::NoMatch => Selection::NoMatch,
                Selection::Ambiguous(_) => Selection::Ambiguous(Vec::new()),
            }
        };

        match selection {
            Selection::Unique((function, return_type, return_multiplicity)) => {
                tracing::trace!(expression = %node, function = %cx.graph.path_of(function), "application resolved");
                bind_application(cx.graph, node, function)?;
                set_computed_type(cx.graph, node, Some(&return_type), &return_multiplicity)?;
                Ok(())
            }
            Selection::NoMatch => Err(CompileError::overload(
                format!(
                    "The system can't find a match for the function: {}",
                    Self::describe(cx, &name, &arguments)?
                ),
                cx.source_info(node),
            )),
            Selection::Ambiguous(_) => Err(CompileError::overload(
                format!("Too many matches for {}", Self::describe(cx, &name, &arguments)?),
                cx.source_info(node),
            )),
        }
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        forget_application(node, cx)
    }

    fn derived_properties(&self) -> &'static [&'static str] {
        &[m3::prop::FUNC]
    }
}

/// Bind the signature's type and multiplicity parameters from the arguments.
fn infer_bindings<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    signature: &FunctionType,
    arguments: &[Argument],
) -> Bindings {
    let mut bindings = Bindings::new();
    for (parameter, argument) in signature.parameters.iter().zip(arguments) {
        if let Some(value) = &argument.generic_type {
            let value = match parameter.generic_type.nominal_type() {
                Some(target) => resolve_at(hierarchy, value, target).unwrap_or_else(|| value.clone()),
                None => value.clone(),
            };
            bindings.infer(&parameter.generic_type, &value);
        }
        if let Some(multiplicity) = &argument.multiplicity {
            bindings.infer_multiplicity(&parameter.multiplicity, multiplicity);
        }
    }
    bindings
}

// ==================== Property access ====================

pub(crate) struct PropertyAccessHandler;

/// A property found on a type; qualified properties read their return type.
struct FoundProperty {
    property: NodeId,
    owner_type: NodeId,
    qualified: bool,
}

impl PropertyAccessHandler {
    /// The enumeration a receiver names directly, as in `Color.RED`.
    fn enumeration_receiver(graph: &Graph, receiver: NodeId) -> Option<NodeId> {
        if !graph.is_instance_of(receiver, m3::INSTANCE_VALUE) {
            return None;
        }
        let [stub] = graph.values(receiver, m3::prop::VALUES) else {
            return None;
        };
        if !graph.is_instance_of(*stub, m3::IMPORT_STUB) {
            return None;
        }
        let target = hierarchy::resolve(graph, *stub)?;
        graph.is_instance_of(target, m3::ENUMERATION).then_some(target)
    }

    fn find(graph: &Graph, order: &[NodeId], name: &str) -> Option<FoundProperty> {
        let named = |p: &NodeId| graph.string_value(*p, m3::prop::NAME) == Some(name);
        order.iter().find_map(|ty| {
            let plain = [
                m3::prop::PROPERTIES,
                m3::prop::PROPERTIES_FROM_ASSOCIATIONS,
                m3::prop::GENERATED_PROPERTIES,
            ]
            .iter()
            .find_map(|property| graph.values(*ty, property).iter().copied().find(named))
            .map(|property| FoundProperty {
                property,
                owner_type: *ty,
                qualified: false,
            });
            plain.or_else(|| {
                graph
                    .values(*ty, m3::prop::QUALIFIED_PROPERTIES)
                    .iter()
                    .copied()
                    .filter(named)
                    .find(|q| graph.values(*q, m3::prop::PARAMETERS).is_empty())
                    .map(|property| FoundProperty {
                        property,
                        owner_type: *ty,
                        qualified: true,
                    })
            })
        })
    }

    fn process_enum_value(
        node: NodeId,
        enumeration: NodeId,
        name: &str,
        cx: &mut ProcessContext<'_>,
    ) -> CompileResult<()> {
        let Some(value) = enum_value(cx.graph, enumeration, name) else {
            return Err(CompileError::missing(
                format!(
                    "The enum value '{}' can't be found in the enumeration {}",
                    name,
                    cx.graph.path_of(enumeration)
                ),
                cx.source_info(node),
            ));
        };
        bind_application(cx.graph, node, value)?;
        set_computed_type(
            cx.graph,
            node,
            Some(&GenericType::nominal(enumeration)),
            &Multiplicity::PURE_ONE,
        )?;
        Ok(())
    }

    /// Make the properties readable from `class` available: associations
    /// contribute properties to classes, and supertypes contribute theirs.
    fn prepare_class(class: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<Vec<NodeId>> {
        let association_class = metaclass(cx.graph, m3::ASSOCIATION)?;
        for association in cx.context.instances_of(association_class) {
            if !cx.state.is_in_progress(association) {
                cx.process(association)?;
            }
        }
        if !cx.state.is_in_progress(class) {
            cx.process(class)?;
        }
        let order = hierarchy::generalization_order(cx.graph, class);
        for ty in &order {
            if !cx.state.is_in_progress(*ty) {
                cx.process(*ty)?;
            }
        }
        Ok(order)
    }
}

impl KindHandler for PropertyAccessHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_property(node, m3::prop::RECEIVER)?;
        let receiver = cx
            .graph
            .value(node, m3::prop::RECEIVER)
            .ok_or_else(|| CompileError::internal(format!("property access {} has no receiver", node)))?;
        let name = cx
            .graph
            .string_value(node, m3::prop::PROPERTY_NAME)
            .map(str::to_string)
            .ok_or_else(|| CompileError::internal(format!("property access {} has no name", node)))?;

        if let Some(enumeration) = Self::enumeration_receiver(cx.graph, receiver) {
            return Self::process_enum_value(node, enumeration, &name, cx);
        }

        let receiver_type = typed_value(cx.graph, receiver);
        let Some(class) = receiver_type.generic_type.as_ref().and_then(|g| g.nominal_type()) else {
            return Err(CompileError::missing(
                format!(
                    "Can't find the property '{}' in the class {}",
                    name,
                    cx.hierarchy()?.print_argument(&receiver_type)
                ),
                cx.source_info(node),
            ));
        };

        let order = Self::prepare_class(class, cx)?;
        let Some(found) = Self::find(cx.graph, &order, &name) else {
            return Err(CompileError::missing(
                format!(
                    "Can't find the property '{}' in the class {}",
                    name,
                    cx.graph.path_of(class)
                ),
                cx.source_info(node),
            ));
        };
        if !cx.state.is_in_progress(found.property) {
            cx.process(found.property)?;
        }

        let (type_property, multiplicity_property) = if found.qualified {
            (m3::prop::RETURN_TYPE, m3::prop::RETURN_MULTIPLICITY)
        } else {
            (m3::prop::GENERIC_TYPE, m3::prop::MULTIPLICITY)
        };
        let declared_type = cx
            .graph
            .value(found.property, type_property)
            .and_then(|g| lower_generic_type(cx.graph, g));
        let declared_multiplicity = cx
            .graph
            .value(found.property, multiplicity_property)
            .and_then(|m| lower_multiplicity(cx.graph, m));

        let generic_type = {
            let hierarchy = cx.hierarchy()?;
            let mut bindings = Bindings::new();
            if let Some(at_owner) = receiver_type
                .generic_type
                .as_ref()
                .and_then(|r| resolve_at(&hierarchy, r, found.owner_type))
            {
                for (parameter, argument) in hierarchy
                    .type_parameters(found.owner_type)
                    .iter()
                    .zip(at_owner.type_arguments)
                {
                    bindings.types.insert(parameter.name.clone(), argument);
                }
            }
            declared_type.map(|t| t.substitute(&bindings))
        };
        let multiplicity = match (&receiver_type.multiplicity, declared_multiplicity) {
            (Some(m), Some(declared)) if *m == Multiplicity::PURE_ONE => declared,
            _ => Multiplicity::ZERO_MANY,
        };

        bind_application(cx.graph, node, found.property)?;
        set_computed_type(cx.graph, node, generic_type.as_ref(), &multiplicity)?;
        Ok(())
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        forget_application(node, cx)
    }

    fn derived_properties(&self) -> &'static [&'static str] {
        &[m3::prop::FUNC]
    }
}

// ==================== Variables ====================

pub(crate) struct VariableHandler;

impl KindHandler for VariableHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        let declaration = cx
            .graph
            .node(node)
            .and_then(|n| n.owner.as_ref())
            .is_some_and(|o| o.property == m3::prop::PARAMETERS);
        if declaration {
            return cx.process_children(node);
        }
        let name = cx
            .graph
            .string_value(node, m3::prop::NAME)
            .map(str::to_string)
            .ok_or_else(|| CompileError::internal(format!("variable {} has no name", node)))?;
        let Some(value) = cx.state.lookup(&name).cloned() else {
            return Err(CompileError::unknown_variable(&name, cx.source_info(node)));
        };
        let multiplicity = value.multiplicity.unwrap_or(Multiplicity::ZERO_MANY);
        set_computed_type(cx.graph, node, value.generic_type.as_ref(), &multiplicity)?;
        Ok(())
    }
}

// ==================== Instance values ====================

pub(crate) struct InstanceValueHandler;

impl InstanceValueHandler {
    fn value_type(graph: &Graph, value: NodeId) -> (Option<GenericType>, Option<Multiplicity>) {
        if graph.literal(value).is_some() {
            return (graph.classifier_of(value).map(GenericType::nominal), Some(Multiplicity::PURE_ONE));
        }
        if graph.is_instance_of(value, m3::IMPORT_STUB) {
            let ty = hierarchy::resolve(graph, value)
                .and_then(|target| graph.classifier_of(target))
                .map(GenericType::nominal);
            return (ty, Some(Multiplicity::PURE_ONE));
        }
        let typed = typed_value(graph, value);
        (typed.generic_type, typed.multiplicity)
    }
}

impl KindHandler for InstanceValueHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_children(node)?;
        let values = cx.graph.values(node, m3::prop::VALUES).to_vec();
        let mut types = Vec::with_capacity(values.len());
        let mut lower = 0u32;
        let mut upper = Some(0u32);
        for value in values {
            let (ty, multiplicity) = Self::value_type(cx.graph, value);
            types.push(ty);
            match multiplicity {
                Some(Multiplicity::Concrete { lower: l, upper: u }) => {
                    lower += l;
                    upper = upper.zip(u).map(|(a, b)| a + b);
                }
                _ => upper = None,
            }
        }
        let common = common_type(cx.graph, &types);
        set_computed_type(cx.graph, node, common.as_ref(), &Multiplicity::new(lower, upper))?;
        Ok(())
    }
}

/// The nearest type every value conforms to. Unknown if any value's type is.
fn common_type(graph: &Graph, types: &[Option<GenericType>]) -> Option<GenericType> {
    let types: Vec<&GenericType> = types.iter().map(Option::as_ref).collect::<Option<_>>()?;
    let (first, rest) = types.split_first()?;
    if rest.iter().all(|t| t == first) {
        return Some((*first).clone());
    }
    let any = graph.top_level(m3::ANY)?;
    let raws: Option<Vec<NodeId>> = types.iter().map(|t| t.nominal_type()).collect();
    let Some(raws) = raws else {
        return Some(GenericType::nominal(any));
    };
    let common = hierarchy::generalization_order(graph, raws[0])
        .into_iter()
        .find(|candidate| raws.iter().all(|r| hierarchy::is_subtype(graph, *r, *candidate)))
        .unwrap_or(any);
    Some(GenericType::nominal(common))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_metamodel;

    // ========== TEST: common type of mixed numbers ==========
    #[test]
    fn test_common_type_is_nearest_shared_supertype() {
        // GIVEN
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();
        let integer = graph.top_level(m3::INTEGER).unwrap();
        let float = graph.top_level(m3::FLOAT).unwrap();
        let number = graph.top_level(m3::NUMBER).unwrap();

        // WHEN
        let common = common_type(
            &graph,
            &[Some(GenericType::nominal(integer)), Some(GenericType::nominal(float))],
        );

        // THEN
        assert_eq!(common, Some(GenericType::nominal(number)));
    }

    // ========== TEST: unrelated types meet at Any ==========
    #[test]
    fn test_common_type_falls_back_to_any() {
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();
        let string = graph.top_level(m3::STRING).unwrap();
        let boolean = graph.top_level(m3::BOOLEAN).unwrap();
        let any = graph.top_level(m3::ANY).unwrap();

        let common = common_type(
            &graph,
            &[Some(GenericType::nominal(string)), Some(GenericType::nominal(boolean))],
        );

        assert_eq!(common, Some(GenericType::nominal(any)));
    }

    // ========== TEST: unknown member type ==========
    #[test]
    fn test_common_type_unknown_when_any_value_untyped() {
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();
        let string = graph.top_level(m3::STRING).unwrap();

        assert_eq!(common_type(&graph, &[Some(GenericType::nominal(string)), None]), None);
        assert_eq!(common_type(&graph, &[]), None);
    }
}
