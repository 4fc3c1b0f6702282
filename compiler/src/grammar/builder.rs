//! Building graph fragments from parsed `Pure` sections.
//!
//! Every node built here has the unit as its origin. References to other
//! elements are written as import stubs and resolved during processing.

use crate::build::BuildContext;
use crate::CompileResult;
use weft_core::{m3, Literal, NodeId, Span};
use weft_parser::{
    AssociationDef, ClassDef, ColumnDef, Element, EnumDef, Expr, FunctionDef, MultiplicityExpr,
    ParameterDef, PropertyDef, QualifiedPropertyDef, SectionAst, TypeExpr, TypeParameterDef,
};

/// Build every element of a section. Returns the top-level elements.
pub(crate) fn build_section(ast: &SectionAst, cx: &mut BuildContext<'_>) -> CompileResult<Vec<NodeId>> {
    let imports: Vec<String> = ast.imports.iter().map(|i| i.path.clone()).collect();
    let mut builder = SectionBuilder {
        cx,
        imports,
        type_parameters: Vec::new(),
    };
    let mut built = Vec::with_capacity(ast.elements.len());
    for element in &ast.elements {
        let id = match element {
            Element::Class(def) => builder.class(def)?,
            Element::Association(def) => builder.association(def)?,
            Element::Enumeration(def) => builder.enumeration(def)?,
            Element::Function(def) => builder.function(def)?,
        };
        built.push(id);
    }
    Ok(built)
}

/// `name_Type_mult_..._Type_mult__Return_mult_`, the path segment that
/// makes overloads distinct top-level elements.
pub fn signature_id(def: &FunctionDef) -> String {
    let mut id = def.name.path.clone();
    for parameter in &def.parameters {
        id.push('_');
        id.push_str(&type_id(&parameter.type_expr));
        id.push('_');
        id.push_str(&multiplicity_id(&parameter.multiplicity));
    }
    id.push_str("__");
    id.push_str(&type_id(&def.return_type));
    id.push('_');
    id.push_str(&multiplicity_id(&def.return_multiplicity));
    id.push('_');
    id
}

fn type_id(type_expr: &TypeExpr) -> String {
    match type_expr {
        TypeExpr::Named { name, .. } => name.name().to_string(),
        TypeExpr::Function { .. } => "Function".to_string(),
        TypeExpr::Relation { .. } => "Relation".to_string(),
    }
}

fn multiplicity_id(multiplicity: &MultiplicityExpr) -> String {
    match multiplicity {
        MultiplicityExpr::Parameter { name, .. } => name.clone(),
        MultiplicityExpr::Concrete { lower, upper, .. } => match upper {
            Some(upper) if upper == lower => lower.to_string(),
            Some(upper) => format!("${}_{}$", lower, upper),
            None if *lower == 0 => "MANY".to_string(),
            None => format!("${}_MANY$", lower),
        },
    }
}

struct SectionBuilder<'b, 'a> {
    cx: &'b mut BuildContext<'a>,
    imports: Vec<String>,
    /// Type parameter names in scope for the element being built.
    type_parameters: Vec<String>,
}

impl SectionBuilder<'_, '_> {
    // ==================== Elements ====================

    fn class(&mut self, def: &ClassDef) -> CompileResult<NodeId> {
        let class = self.cx.create_element(&def.name.path, m3::CLASS, def.span)?;
        for stereotype in &def.stereotypes {
            self.cx
                .graph
                .add_literal(class, m3::prop::STEREOTYPES, stereotype.as_str())?;
        }
        self.type_parameters = def.type_parameters.iter().map(|p| p.name.clone()).collect();
        self.declare_type_parameters(class, &def.type_parameters, &def.multiplicity_parameters)?;

        for general in &def.generalizations {
            let generalization = self.cx.create_node(m3::GENERALIZATION, Some(general.span()))?;
            let generic_type = self.generic_type(general)?;
            self.cx.graph.set_child(generalization, m3::prop::GENERAL, generic_type)?;
            self.cx.graph.set_value(generalization, m3::prop::SPECIFIC, class)?;
            self.cx.graph.add_child(class, m3::prop::GENERALIZATIONS, generalization)?;
        }
        for property in &def.properties {
            let node = self.property(property, class)?;
            self.cx.graph.add_child(class, m3::prop::PROPERTIES, node)?;
        }
        for qualified in &def.qualified_properties {
            let node = self.qualified_property(qualified, class)?;
            self.cx
                .graph
                .add_child(class, m3::prop::QUALIFIED_PROPERTIES, node)?;
        }
        self.type_parameters.clear();
        Ok(class)
    }

    fn association(&mut self, def: &AssociationDef) -> CompileResult<NodeId> {
        let association = self.cx.create_element(&def.name.path, m3::ASSOCIATION, def.span)?;
        for property in &def.properties {
            let node = self.property(property, association)?;
            self.cx
                .graph
                .add_child(association, m3::prop::PROPERTIES, node)?;
        }
        Ok(association)
    }

    fn enumeration(&mut self, def: &EnumDef) -> CompileResult<NodeId> {
        let enumeration = self.cx.create_element(&def.name.path, m3::ENUMERATION, def.span)?;
        for (name, span) in &def.values {
            let value = self.cx.create_node(m3::ENUM, Some(*span))?;
            self.cx.graph.set_literal(value, m3::prop::NAME, name.as_str())?;
            self.cx.graph.add_child(enumeration, m3::prop::VALUES, value)?;
        }
        Ok(enumeration)
    }

    fn function(&mut self, def: &FunctionDef) -> CompileResult<NodeId> {
        let kind = if def.native {
            m3::NATIVE_FUNCTION
        } else {
            m3::CONCRETE_FUNCTION
        };
        let function = self.cx.create_element(&signature_id(def), kind, def.span)?;
        self.cx
            .graph
            .set_literal(function, m3::prop::FUNCTION_NAME, def.name.name())?;
        self.type_parameters = def.type_parameters.iter().map(|p| p.name.clone()).collect();
        self.declare_type_parameters(function, &def.type_parameters, &def.multiplicity_parameters)?;
        self.signature(
            function,
            &def.parameters,
            &def.return_type,
            &def.return_multiplicity,
        )?;
        for expr in &def.body {
            let node = self.expr(expr)?;
            self.cx
                .graph
                .add_child(function, m3::prop::EXPRESSION_SEQUENCE, node)?;
        }
        self.type_parameters.clear();
        Ok(function)
    }

    // ==================== Members ====================

    fn declare_type_parameters(
        &mut self,
        owner: NodeId,
        type_parameters: &[TypeParameterDef],
        multiplicity_parameters: &[String],
    ) -> CompileResult<()> {
        for parameter in type_parameters {
            let node = self.cx.create_node(m3::TYPE_PARAMETER, Some(parameter.span))?;
            self.cx.graph.set_literal(node, m3::prop::NAME, parameter.name.as_str())?;
            if parameter.contravariant {
                self.cx.graph.set_literal(node, m3::prop::CONTRAVARIANT, true)?;
            }
            self.cx.graph.add_child(owner, m3::prop::TYPE_PARAMETERS, node)?;
        }
        for name in multiplicity_parameters {
            self.cx
                .graph
                .add_literal(owner, m3::prop::MULTIPLICITY_PARAMETERS, name.as_str())?;
        }
        Ok(())
    }

    fn property(&mut self, def: &PropertyDef, owner: NodeId) -> CompileResult<NodeId> {
        let property = self.cx.create_node(m3::PROPERTY, Some(def.span))?;
        self.cx.graph.set_literal(property, m3::prop::NAME, def.name.as_str())?;
        let generic_type = self.generic_type(&def.type_expr)?;
        self.cx
            .graph
            .add_child(property, m3::prop::GENERIC_TYPE, generic_type)?;
        let multiplicity = self.multiplicity(&def.multiplicity)?;
        self.cx
            .graph
            .add_child(property, m3::prop::MULTIPLICITY, multiplicity)?;
        self.cx.graph.set_value(property, m3::prop::OWNER, owner)?;
        Ok(property)
    }

    fn qualified_property(&mut self, def: &QualifiedPropertyDef, owner: NodeId) -> CompileResult<NodeId> {
        let property = self.cx.create_node(m3::QUALIFIED_PROPERTY, Some(def.span))?;
        self.cx.graph.set_literal(property, m3::prop::NAME, def.name.as_str())?;
        self.signature(property, &def.parameters, &def.return_type, &def.return_multiplicity)?;
        for expr in &def.body {
            let node = self.expr(expr)?;
            self.cx
                .graph
                .add_child(property, m3::prop::EXPRESSION_SEQUENCE, node)?;
        }
        self.cx.graph.set_value(property, m3::prop::OWNER, owner)?;
        Ok(property)
    }

    /// Parameters as variable declarations, then the return type.
    fn signature(
        &mut self,
        owner: NodeId,
        parameters: &[ParameterDef],
        return_type: &TypeExpr,
        return_multiplicity: &MultiplicityExpr,
    ) -> CompileResult<()> {
        for parameter in parameters {
            let node = self.declaration(
                Some(parameter.name.as_str()),
                &parameter.type_expr,
                &parameter.multiplicity,
                parameter.span,
            )?;
            self.cx.graph.add_child(owner, m3::prop::PARAMETERS, node)?;
        }
        let generic_type = self.generic_type(return_type)?;
        self.cx
            .graph
            .add_child(owner, m3::prop::RETURN_TYPE, generic_type)?;
        let multiplicity = self.multiplicity(return_multiplicity)?;
        self.cx
            .graph
            .add_child(owner, m3::prop::RETURN_MULTIPLICITY, multiplicity)?;
        Ok(())
    }

    fn declaration(
        &mut self,
        name: Option<&str>,
        type_expr: &TypeExpr,
        multiplicity: &MultiplicityExpr,
        span: Span,
    ) -> CompileResult<NodeId> {
        let node = self.cx.create_node(m3::VARIABLE_EXPRESSION, Some(span))?;
        if let Some(name) = name {
            self.cx.graph.set_literal(node, m3::prop::NAME, name)?;
        }
        let generic_type = self.generic_type(type_expr)?;
        self.cx.graph.add_child(node, m3::prop::GENERIC_TYPE, generic_type)?;
        let multiplicity = self.multiplicity(multiplicity)?;
        self.cx.graph.add_child(node, m3::prop::MULTIPLICITY, multiplicity)?;
        Ok(node)
    }

    // ==================== Types ====================

    fn generic_type(&mut self, type_expr: &TypeExpr) -> CompileResult<NodeId> {
        let node = self.cx.create_node(m3::GENERIC_TYPE, Some(type_expr.span()))?;
        match type_expr {
            TypeExpr::Named {
                name,
                type_arguments,
                multiplicity_arguments,
                ..
            } => {
                if self.type_parameters.iter().any(|p| *p == name.path) {
                    let parameter = self.cx.create_node(m3::TYPE_PARAMETER, Some(name.span))?;
                    self.cx.graph.set_literal(parameter, m3::prop::NAME, name.path.as_str())?;
                    self.cx.graph.add_child(node, m3::prop::TYPE_PARAMETER, parameter)?;
                } else {
                    let stub = self.cx.stub(&name.path, &self.imports, name.span)?;
                    self.cx.graph.add_child(node, m3::prop::RAW_TYPE, stub)?;
                }
                for argument in type_arguments {
                    let child = self.generic_type(argument)?;
                    self.cx.graph.add_child(node, m3::prop::TYPE_ARGUMENTS, child)?;
                }
                for argument in multiplicity_arguments {
                    let child = self.multiplicity(argument)?;
                    self.cx
                        .graph
                        .add_child(node, m3::prop::MULTIPLICITY_ARGUMENTS, child)?;
                }
            }
            TypeExpr::Function {
                parameters,
                return_type,
                return_multiplicity,
                span,
            } => {
                let function = self.cx.create_node(m3::FUNCTION_TYPE, Some(*span))?;
                for (parameter_type, multiplicity) in parameters {
                    let parameter =
                        self.declaration(None, parameter_type, multiplicity, parameter_type.span())?;
                    self.cx.graph.add_child(function, m3::prop::PARAMETERS, parameter)?;
                }
                let generic_type = self.generic_type(return_type)?;
                self.cx
                    .graph
                    .add_child(function, m3::prop::RETURN_TYPE, generic_type)?;
                let multiplicity = self.multiplicity(return_multiplicity)?;
                self.cx
                    .graph
                    .add_child(function, m3::prop::RETURN_MULTIPLICITY, multiplicity)?;
                self.cx.graph.add_child(node, m3::prop::RAW_TYPE, function)?;
            }
            TypeExpr::Relation { columns, span } => {
                let relation = self.cx.create_node(m3::RELATION_TYPE, Some(*span))?;
                for column in columns {
                    let node = self.column(column)?;
                    self.cx.graph.add_child(relation, m3::prop::COLUMNS, node)?;
                }
                self.cx.graph.add_child(node, m3::prop::RAW_TYPE, relation)?;
            }
        }
        Ok(node)
    }

    fn column(&mut self, def: &ColumnDef) -> CompileResult<NodeId> {
        let column = self.cx.create_node(m3::COLUMN, Some(def.span))?;
        self.cx.graph.set_literal(column, m3::prop::NAME, def.name.as_str())?;
        let generic_type = self.generic_type(&def.type_expr)?;
        self.cx.graph.add_child(column, m3::prop::GENERIC_TYPE, generic_type)?;
        let multiplicity = self.multiplicity(&def.multiplicity)?;
        self.cx.graph.add_child(column, m3::prop::MULTIPLICITY, multiplicity)?;
        Ok(column)
    }

    fn multiplicity(&mut self, def: &MultiplicityExpr) -> CompileResult<NodeId> {
        let node = self.cx.create_node(m3::MULTIPLICITY, Some(def.span()))?;
        match def {
            MultiplicityExpr::Parameter { name, .. } => {
                self.cx
                    .graph
                    .set_literal(node, m3::prop::MULTIPLICITY_PARAMETER, name.as_str())?;
            }
            MultiplicityExpr::Concrete { lower, upper, .. } => {
                self.cx
                    .graph
                    .set_literal(node, m3::prop::LOWER_BOUND, i64::from(*lower))?;
                if let Some(upper) = upper {
                    self.cx
                        .graph
                        .set_literal(node, m3::prop::UPPER_BOUND, i64::from(*upper))?;
                }
            }
        }
        Ok(node)
    }

    // ==================== Expressions ====================

    fn expr(&mut self, expr: &Expr) -> CompileResult<NodeId> {
        match expr {
            Expr::Literal(literal, span) => {
                let node = self.cx.create_node(m3::INSTANCE_VALUE, Some(*span))?;
                self.cx.graph.add_literal(node, m3::prop::VALUES, literal.clone())?;
                Ok(node)
            }
            Expr::Variable(name, span) => {
                let node = self.cx.create_node(m3::VARIABLE_EXPRESSION, Some(*span))?;
                self.cx.graph.set_literal(node, m3::prop::NAME, name.as_str())?;
                Ok(node)
            }
            Expr::Application(application) => {
                let node = self.cx.create_node(m3::FUNCTION_EXPRESSION, Some(application.span))?;
                self.cx.graph.set_literal(
                    node,
                    m3::prop::FUNCTION_NAME,
                    application.function.path.as_str(),
                )?;
                for argument in &application.arguments {
                    let child = self.expr(argument)?;
                    self.cx
                        .graph
                        .add_child(node, m3::prop::PARAMETERS_VALUES, child)?;
                }
                Ok(node)
            }
            Expr::PropertyAccess {
                receiver,
                property,
                span,
            } => {
                let node = self.cx.create_node(m3::PROPERTY_ACCESS, Some(*span))?;
                self.cx
                    .graph
                    .set_literal(node, m3::prop::PROPERTY_NAME, property.as_str())?;
                let receiver = self.expr(receiver)?;
                self.cx.graph.add_child(node, m3::prop::RECEIVER, receiver)?;
                Ok(node)
            }
            Expr::Collection(values, span) => {
                let node = self.cx.create_node(m3::INSTANCE_VALUE, Some(*span))?;
                for value in values {
                    match value {
                        Expr::Literal(literal, _) => {
                            self.cx.graph.add_literal(node, m3::prop::VALUES, literal.clone())?;
                        }
                        other => {
                            let child = self.expr(other)?;
                            self.cx.graph.add_child(node, m3::prop::VALUES, child)?;
                        }
                    }
                }
                Ok(node)
            }
            Expr::ElementRef(name) => {
                let node = self.cx.create_node(m3::INSTANCE_VALUE, Some(name.span))?;
                let stub = self.cx.stub(&name.path, &self.imports, name.span)?;
                self.cx.graph.add_child(node, m3::prop::VALUES, stub)?;
                Ok(node)
            }
            Expr::Let { name, value, span } => {
                let node = self.cx.create_node(m3::FUNCTION_EXPRESSION, Some(*span))?;
                self.cx
                    .graph
                    .set_literal(node, m3::prop::FUNCTION_NAME, m3::LET_FUNCTION)?;
                let variable = self.cx.create_node(m3::INSTANCE_VALUE, Some(*span))?;
                self.cx
                    .graph
                    .add_literal(variable, m3::prop::VALUES, Literal::from(name.as_str()))?;
                self.cx
                    .graph
                    .add_child(node, m3::prop::PARAMETERS_VALUES, variable)?;
                let value = self.expr(value)?;
                self.cx
                    .graph
                    .add_child(node, m3::prop::PARAMETERS_VALUES, value)?;
                Ok(node)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_parser::parse_section;

    fn function(text: &str) -> FunctionDef {
        match parse_section(text).unwrap().elements.remove(0) {
            Element::Function(def) => def,
            other => panic!("expected a function, got {:?}", other),
        }
    }

    // ========== TEST: signature_id ==========

    #[test]
    fn test_signature_id_encodes_types_and_multiplicities() {
        let def = function("function model::f(a: String[1], b: Integer[*], c: Any[0..1]): Boolean[1..*] { true }");
        assert_eq!(
            signature_id(&def),
            "model::f_String_1_Integer_MANY_Any_$0_1$__Boolean_$1_MANY$_"
        );
    }

    #[test]
    fn test_signature_id_without_parameters() {
        let def = function("native function now(): DateTime[1];");
        assert_eq!(signature_id(&def), "now__DateTime_1_");
    }

    #[test]
    fn test_signature_id_keeps_multiplicity_parameters() {
        let def = function("function first<T|m>(values: T[m]): T[0..1] { $values }");
        assert_eq!(signature_id(&def), "first_T_m__T_$0_1$_");
    }
}
