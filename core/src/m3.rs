//! Metamodel vocabulary.
//!
//! Classifier paths of the built-in kinds and the property names the core
//! processors read and write. Extensions define their own paths; these are
//! the ones the engine itself knows about.

// ==================== Packages ====================

/// Path of the root package.
pub const ROOT: &str = "Root";

/// Packages searched after the enclosing package when resolving a bare name.
pub const DEFAULT_IMPORTS: &[&str] = &["meta::pure::metamodel::type"];

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "::";

// ==================== Types ====================

pub const ANY: &str = "meta::pure::metamodel::type::Any";
pub const NIL: &str = "meta::pure::metamodel::type::Nil";
pub const ELEMENT: &str = "meta::pure::metamodel::PackageableElement";
pub const PACKAGE: &str = "meta::pure::metamodel::Package";
pub const TYPE: &str = "meta::pure::metamodel::type::Type";
pub const CLASS: &str = "meta::pure::metamodel::type::Class";
pub const PRIMITIVE_TYPE: &str = "meta::pure::metamodel::type::PrimitiveType";
pub const ENUMERATION: &str = "meta::pure::metamodel::type::Enumeration";
pub const ENUM: &str = "meta::pure::metamodel::type::Enum";
pub const FUNCTION_TYPE: &str = "meta::pure::metamodel::type::FunctionType";
pub const RELATION_TYPE: &str = "meta::pure::metamodel::relation::RelationType";
pub const COLUMN: &str = "meta::pure::metamodel::relation::Column";
pub const GENERIC_TYPE: &str = "meta::pure::metamodel::type::generics::GenericType";
pub const TYPE_PARAMETER: &str = "meta::pure::metamodel::type::generics::TypeParameter";
pub const MULTIPLICITY: &str = "meta::pure::metamodel::multiplicity::Multiplicity";

// ==================== Relationships ====================

pub const ASSOCIATION: &str = "meta::pure::metamodel::relationship::Association";
pub const GENERALIZATION: &str = "meta::pure::metamodel::relationship::Generalization";

// ==================== Functions ====================

pub const FUNCTION: &str = "meta::pure::metamodel::function::Function";
pub const CONCRETE_FUNCTION: &str = "meta::pure::metamodel::function::ConcreteFunctionDefinition";
pub const NATIVE_FUNCTION: &str = "meta::pure::metamodel::function::NativeFunction";
pub const PROPERTY: &str = "meta::pure::metamodel::function::property::Property";
pub const QUALIFIED_PROPERTY: &str = "meta::pure::metamodel::function::property::QualifiedProperty";

// ==================== Value specifications ====================

pub const VALUE_SPECIFICATION: &str =
    "meta::pure::metamodel::valuespecification::ValueSpecification";
pub const FUNCTION_EXPRESSION: &str =
    "meta::pure::metamodel::valuespecification::SimpleFunctionExpression";
pub const PROPERTY_ACCESS: &str = "meta::pure::metamodel::valuespecification::PropertyAccess";
pub const VARIABLE_EXPRESSION: &str =
    "meta::pure::metamodel::valuespecification::VariableExpression";
pub const INSTANCE_VALUE: &str = "meta::pure::metamodel::valuespecification::InstanceValue";

// ==================== References ====================

pub const IMPORT_STUB: &str = "meta::pure::metamodel::import::ImportStub";

// ==================== Primitive types ====================

pub const STRING: &str = "String";
pub const INTEGER: &str = "Integer";
pub const FLOAT: &str = "Float";
pub const DECIMAL: &str = "Decimal";
pub const NUMBER: &str = "Number";
pub const BOOLEAN: &str = "Boolean";
pub const DATE: &str = "Date";
pub const STRICT_DATE: &str = "StrictDate";
pub const DATE_TIME: &str = "DateTime";

/// Primitive types with their direct supertype (`None` means `Any`).
pub const PRIMITIVES: &[(&str, Option<&str>)] = &[
    (BOOLEAN, None),
    (STRING, None),
    (NUMBER, None),
    (INTEGER, Some(NUMBER)),
    (FLOAT, Some(NUMBER)),
    (DECIMAL, Some(NUMBER)),
    (DATE, None),
    (STRICT_DATE, Some(DATE)),
    (DATE_TIME, Some(DATE)),
];

// ==================== Functions with dedicated processing ====================

/// Name of the function a `let` binding applies.
pub const LET_FUNCTION: &str = "letFunction";

// ==================== Temporal generation ====================

/// Stereotype marking a class whose instances are versioned over time.
pub const TEMPORAL_STEREOTYPE: &str = "temporal";

/// Suffix of the generated all-versions property.
pub const ALL_VERSIONS_SUFFIX: &str = "AllVersions";

/// Property names used by the metamodel.
pub mod prop {
    pub const NAME: &str = "name";
    pub const PACKAGE: &str = "package";
    pub const CHILDREN: &str = "children";

    pub const PROPERTIES: &str = "properties";
    pub const QUALIFIED_PROPERTIES: &str = "qualifiedProperties";
    pub const PROPERTIES_FROM_ASSOCIATIONS: &str = "propertiesFromAssociations";
    pub const GENERATED_PROPERTIES: &str = "generatedProperties";
    pub const STEREOTYPES: &str = "stereotypes";
    pub const OWNER: &str = "owner";

    pub const GENERALIZATIONS: &str = "generalizations";
    pub const SPECIALIZATIONS: &str = "specializations";
    pub const GENERAL: &str = "general";
    pub const SPECIFIC: &str = "specific";

    pub const RAW_TYPE: &str = "rawType";
    pub const TYPE_ARGUMENTS: &str = "typeArguments";
    pub const MULTIPLICITY_ARGUMENTS: &str = "multiplicityArguments";
    pub const TYPE_PARAMETER: &str = "typeParameter";
    pub const TYPE_PARAMETERS: &str = "typeParameters";
    pub const CONTRAVARIANT: &str = "contravariant";
    pub const MULTIPLICITY_PARAMETERS: &str = "multiplicityParameters";
    pub const CLASSIFIER_GENERIC_TYPE: &str = "classifierGenericType";

    pub const LOWER_BOUND: &str = "lowerBound";
    pub const UPPER_BOUND: &str = "upperBound";
    pub const MULTIPLICITY_PARAMETER: &str = "multiplicityParameter";

    pub const GENERIC_TYPE: &str = "genericType";
    pub const MULTIPLICITY: &str = "multiplicity";
    pub const COLUMNS: &str = "columns";

    pub const FUNCTION_NAME: &str = "functionName";
    pub const PARAMETERS: &str = "parameters";
    pub const RETURN_TYPE: &str = "returnType";
    pub const RETURN_MULTIPLICITY: &str = "returnMultiplicity";
    pub const EXPRESSION_SEQUENCE: &str = "expressionSequence";

    pub const FUNC: &str = "func";
    pub const PARAMETERS_VALUES: &str = "parametersValues";
    pub const PROPERTY_NAME: &str = "propertyName";
    pub const RECEIVER: &str = "receiver";
    pub const VALUES: &str = "values";

    pub const ID_OR_PATH: &str = "idOrPath";
    pub const SCOPE: &str = "scope";
    pub const RESOLVED_NODE: &str = "resolvedNode";
}

/// Split a path into its package path and element name.
///
/// `a::b::C` yields `(Some("a::b"), "C")`; a bare name yields `(None, name)`.
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rfind(PATH_SEPARATOR) {
        Some(idx) => (Some(&path[..idx]), &path[idx + PATH_SEPARATOR.len()..]),
        None => (None, path),
    }
}

/// Join a package path and a name.
pub fn join_path(package: &str, name: &str) -> String {
    if package.is_empty() || package == ROOT {
        name.to_string()
    } else {
        format!("{}{}{}", package, PATH_SEPARATOR, name)
    }
}
