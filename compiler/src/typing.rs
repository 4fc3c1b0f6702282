//! Bridging graph nodes and the type-matching engine.
//!
//! Lowering reads generic type, multiplicity and function type nodes into
//! engine values; materializing writes engine values back as generated nodes.
//! Nominal raw types written by materialization are direct pointers and
//! record a reference-usage back-reference on the type they point at.

use crate::{CompileError, CompileResult};
use weft_core::{m3, GraphError, GraphResult, NodeId};
use weft_graph::{hierarchy, BackReference, Graph, Origin};
use weft_types::{
    print_generic_type, Argument, Column, FunctionType, GenericType, Multiplicity, Parameter,
    RawType, RelationType, TypeHierarchy, TypeParameter, TypeRef,
};

/// The nominal type hierarchy stored in the graph.
pub struct GraphHierarchy<'g> {
    graph: &'g Graph,
    any: NodeId,
    nil: NodeId,
}

impl<'g> GraphHierarchy<'g> {
    pub fn new(graph: &'g Graph) -> CompileResult<Self> {
        let any = graph
            .top_level(m3::ANY)
            .ok_or_else(|| CompileError::internal("the top type is not bootstrapped"))?;
        let nil = graph
            .top_level(m3::NIL)
            .ok_or_else(|| CompileError::internal("the bottom type is not bootstrapped"))?;
        Ok(Self { graph, any, nil })
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn print(&self, generic: &GenericType) -> String {
        print_generic_type(self, generic)
    }

    /// `Type[m]`, with `Nil[0]`-style placeholders for unknown parts.
    pub fn print_argument(&self, argument: &Argument) -> String {
        let ty = match &argument.generic_type {
            Some(generic) => self.print(generic),
            None => self.type_name(self.nil),
        };
        let multiplicity = argument
            .multiplicity
            .clone()
            .unwrap_or(Multiplicity::new(0, Some(0)));
        format!("{}{}", ty, multiplicity)
    }
}

impl TypeHierarchy for GraphHierarchy<'_> {
    fn top(&self) -> TypeRef {
        self.any
    }

    fn bottom(&self) -> TypeRef {
        self.nil
    }

    fn type_parameters(&self, ty: TypeRef) -> Vec<TypeParameter> {
        self.graph
            .values(ty, m3::prop::TYPE_PARAMETERS)
            .iter()
            .filter_map(|p| {
                let name = self.graph.string_value(*p, m3::prop::NAME)?;
                let contravariant = self
                    .graph
                    .bool_value(*p, m3::prop::CONTRAVARIANT)
                    .unwrap_or(false);
                Some(TypeParameter {
                    name: name.to_string(),
                    contravariant,
                })
            })
            .collect()
    }

    fn generalizations(&self, ty: TypeRef) -> Vec<GenericType> {
        self.graph
            .values(ty, m3::prop::GENERALIZATIONS)
            .iter()
            .filter_map(|g| self.graph.value(*g, m3::prop::GENERAL))
            .filter_map(|general| lower_generic_type(self.graph, general))
            .collect()
    }

    fn type_name(&self, ty: TypeRef) -> String {
        self.graph
            .node(ty)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| ty.to_string())
    }
}

// ==================== Lowering ====================

/// Read a generic type node. `None` if any part is still unresolved.
pub fn lower_generic_type(graph: &Graph, generic_type: NodeId) -> Option<GenericType> {
    let mut generic = GenericType::default();
    if let Some(parameter) = graph.value(generic_type, m3::prop::TYPE_PARAMETER) {
        let name = graph.string_value(parameter, m3::prop::NAME)?;
        generic.type_parameter = Some(name.to_string());
    } else {
        let raw = hierarchy::raw_type(graph, generic_type)?;
        generic.raw = Some(lower_raw_type(graph, raw)?);
    }
    for argument in graph.values(generic_type, m3::prop::TYPE_ARGUMENTS) {
        generic
            .type_arguments
            .push(lower_generic_type(graph, *argument)?);
    }
    for argument in graph.values(generic_type, m3::prop::MULTIPLICITY_ARGUMENTS) {
        generic
            .multiplicity_arguments
            .push(lower_multiplicity(graph, *argument)?);
    }
    Some(generic)
}

fn lower_raw_type(graph: &Graph, raw: NodeId) -> Option<RawType> {
    if graph.is_instance_of(raw, m3::FUNCTION_TYPE) {
        lower_function_type(graph, raw).map(|f| RawType::Function(Box::new(f)))
    } else if graph.is_instance_of(raw, m3::RELATION_TYPE) {
        let columns = graph
            .values(raw, m3::prop::COLUMNS)
            .iter()
            .map(|c| {
                Some(Column::new(
                    graph.string_value(*c, m3::prop::NAME)?,
                    lower_generic_type(graph, graph.value(*c, m3::prop::GENERIC_TYPE)?)?,
                    lower_multiplicity(graph, graph.value(*c, m3::prop::MULTIPLICITY)?)?,
                ))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(RawType::Relation(RelationType::new(columns)))
    } else {
        Some(RawType::Nominal(raw))
    }
}

/// Read a multiplicity node.
pub fn lower_multiplicity(graph: &Graph, multiplicity: NodeId) -> Option<Multiplicity> {
    if let Some(name) = graph.string_value(multiplicity, m3::prop::MULTIPLICITY_PARAMETER) {
        return Some(Multiplicity::Parameter(name.to_string()));
    }
    let lower = u32::try_from(graph.integer_value(multiplicity, m3::prop::LOWER_BOUND)?).ok()?;
    let upper = match graph.integer_value(multiplicity, m3::prop::UPPER_BOUND) {
        Some(upper) => Some(u32::try_from(upper).ok()?),
        None => None,
    };
    Some(Multiplicity::new(lower, upper))
}

/// Read the signature held by a function type node or a function definition.
pub fn lower_function_type(graph: &Graph, function: NodeId) -> Option<FunctionType> {
    let parameters = graph
        .values(function, m3::prop::PARAMETERS)
        .iter()
        .map(|p| {
            Some(Parameter::new(
                graph.string_value(*p, m3::prop::NAME).unwrap_or("_"),
                lower_generic_type(graph, graph.value(*p, m3::prop::GENERIC_TYPE)?)?,
                lower_multiplicity(graph, graph.value(*p, m3::prop::MULTIPLICITY)?)?,
            ))
        })
        .collect::<Option<Vec<_>>>()?;
    let return_type = lower_generic_type(graph, graph.value(function, m3::prop::RETURN_TYPE)?)?;
    let return_multiplicity =
        lower_multiplicity(graph, graph.value(function, m3::prop::RETURN_MULTIPLICITY)?)?;
    Some(FunctionType::new(parameters, return_type, return_multiplicity))
}

/// The computed type of an expression, or of anything carrying
/// `genericType` and `multiplicity`.
pub fn typed_value(graph: &Graph, node: NodeId) -> Argument {
    Argument {
        generic_type: graph
            .value(node, m3::prop::GENERIC_TYPE)
            .and_then(|g| lower_generic_type(graph, g)),
        multiplicity: graph
            .value(node, m3::prop::MULTIPLICITY)
            .and_then(|m| lower_multiplicity(graph, m)),
    }
}

// ==================== Materializing ====================

/// The bootstrapped node of a metaclass.
pub fn metaclass(graph: &Graph, path: &str) -> GraphResult<NodeId> {
    graph
        .top_level(path)
        .ok_or_else(|| GraphError::InvalidOperation(format!("metaclass '{}' is not bootstrapped", path)))
}

/// Write `generic` as a generated generic type node.
pub fn materialize_generic_type(graph: &mut Graph, generic: &GenericType) -> GraphResult<NodeId> {
    let node_class = metaclass(graph, m3::GENERIC_TYPE)?;
    let node = graph.create_anonymous(node_class, Origin::Generated, None);
    match (&generic.raw, &generic.type_parameter) {
        (Some(RawType::Nominal(ty)), _) => {
            graph.add_value(node, m3::prop::RAW_TYPE, *ty)?;
            graph.add_back_reference(*ty, BackReference::usage(node, m3::prop::RAW_TYPE, 0))?;
        }
        (Some(RawType::Function(function)), _) => {
            let raw = materialize_function_type(graph, function)?;
            graph.add_child(node, m3::prop::RAW_TYPE, raw)?;
        }
        (Some(RawType::Relation(relation)), _) => {
            let raw_class = metaclass(graph, m3::RELATION_TYPE)?;
            let raw = graph.create_anonymous(raw_class, Origin::Generated, None);
            for column in &relation.columns {
                let c_class = metaclass(graph, m3::COLUMN)?;
                let c = graph.create_anonymous(c_class, Origin::Generated, None);
                graph.set_literal(c, m3::prop::NAME, column.name.as_str())?;
                let ty = materialize_generic_type(graph, &column.generic_type)?;
                graph.add_child(c, m3::prop::GENERIC_TYPE, ty)?;
                let m = materialize_multiplicity(graph, &column.multiplicity)?;
                graph.add_child(c, m3::prop::MULTIPLICITY, m)?;
                graph.add_child(raw, m3::prop::COLUMNS, c)?;
            }
            graph.add_child(node, m3::prop::RAW_TYPE, raw)?;
        }
        (None, Some(name)) => {
            let parameter_class = metaclass(graph, m3::TYPE_PARAMETER)?;
            let parameter = graph.create_anonymous(parameter_class, Origin::Generated, None);
            graph.set_literal(parameter, m3::prop::NAME, name.as_str())?;
            graph.add_child(node, m3::prop::TYPE_PARAMETER, parameter)?;
        }
        (None, None) => {}
    }
    for argument in &generic.type_arguments {
        let child = materialize_generic_type(graph, argument)?;
        graph.add_child(node, m3::prop::TYPE_ARGUMENTS, child)?;
    }
    for argument in &generic.multiplicity_arguments {
        let child = materialize_multiplicity(graph, argument)?;
        graph.add_child(node, m3::prop::MULTIPLICITY_ARGUMENTS, child)?;
    }
    Ok(node)
}

fn materialize_function_type(graph: &mut Graph, function: &FunctionType) -> GraphResult<NodeId> {
    let node_class = metaclass(graph, m3::FUNCTION_TYPE)?;
    let node = graph.create_anonymous(node_class, Origin::Generated, None);
    for parameter in &function.parameters {
        let p_class = metaclass(graph, m3::VARIABLE_EXPRESSION)?;
        let p = graph.create_anonymous(p_class, Origin::Generated, None);
        graph.set_literal(p, m3::prop::NAME, parameter.name.as_str())?;
        let ty = materialize_generic_type(graph, &parameter.generic_type)?;
        graph.add_child(p, m3::prop::GENERIC_TYPE, ty)?;
        let m = materialize_multiplicity(graph, &parameter.multiplicity)?;
        graph.add_child(p, m3::prop::MULTIPLICITY, m)?;
        graph.add_child(node, m3::prop::PARAMETERS, p)?;
    }
    let return_type = materialize_generic_type(graph, &function.return_type)?;
    graph.add_child(node, m3::prop::RETURN_TYPE, return_type)?;
    let return_multiplicity = materialize_multiplicity(graph, &function.return_multiplicity)?;
    graph.add_child(node, m3::prop::RETURN_MULTIPLICITY, return_multiplicity)?;
    Ok(node)
}

/// Write `multiplicity` as a generated multiplicity node.
pub fn materialize_multiplicity(graph: &mut Graph, multiplicity: &Multiplicity) -> GraphResult<NodeId> {
    let node_class = metaclass(graph, m3::MULTIPLICITY)?;
    let node = graph.create_anonymous(node_class, Origin::Generated, None);
    match multiplicity {
        Multiplicity::Parameter(name) => {
            graph.set_literal(node, m3::prop::MULTIPLICITY_PARAMETER, name.as_str())?;
        }
        Multiplicity::Concrete { lower, upper } => {
            graph.set_literal(node, m3::prop::LOWER_BOUND, i64::from(*lower))?;
            if let Some(upper) = upper {
                graph.set_literal(node, m3::prop::UPPER_BOUND, i64::from(*upper))?;
            }
        }
    }
    Ok(node)
}

/// Attach a computed type to `node` as generated children.
pub fn set_computed_type(
    graph: &mut Graph,
    node: NodeId,
    generic: Option<&GenericType>,
    multiplicity: &Multiplicity,
) -> GraphResult<()> {
    if let Some(generic) = generic {
        let ty = materialize_generic_type(graph, generic)?;
        graph.add_child(node, m3::prop::GENERIC_TYPE, ty)?;
    }
    let m = materialize_multiplicity(graph, multiplicity)?;
    graph.add_child(node, m3::prop::MULTIPLICITY, m)
}
