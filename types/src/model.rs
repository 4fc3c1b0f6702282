//! Value-level type model the engine matches over.

use std::collections::HashMap;
use std::fmt;
use weft_core::NodeId;

/// Opaque handle of a nominal type (class, primitive, enumeration, ...).
pub type TypeRef = NodeId;

/// The raw type of a generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawType {
    Nominal(TypeRef),
    Function(Box<FunctionType>),
    Relation(RelationType),
}

/// Raw type plus ordered type and multiplicity arguments.
///
/// A generic type without a raw type is a type parameter reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GenericType {
    pub raw: Option<RawType>,
    pub type_parameter: Option<String>,
    pub type_arguments: Vec<GenericType>,
    pub multiplicity_arguments: Vec<Multiplicity>,
}

impl GenericType {
    pub fn nominal(ty: TypeRef) -> Self {
        Self {
            raw: Some(RawType::Nominal(ty)),
            ..Self::default()
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            type_parameter: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn function(function: FunctionType) -> Self {
        Self {
            raw: Some(RawType::Function(Box::new(function))),
            ..Self::default()
        }
    }

    pub fn relation(relation: RelationType) -> Self {
        Self {
            raw: Some(RawType::Relation(relation)),
            ..Self::default()
        }
    }

    pub fn with_type_arguments(mut self, arguments: Vec<GenericType>) -> Self {
        self.type_arguments = arguments;
        self
    }

    pub fn with_multiplicity_arguments(mut self, arguments: Vec<Multiplicity>) -> Self {
        self.multiplicity_arguments = arguments;
        self
    }

    /// A generic type is concrete when it has a raw type.
    pub fn is_concrete(&self) -> bool {
        self.raw.is_some()
    }

    pub fn nominal_type(&self) -> Option<TypeRef> {
        match &self.raw {
            Some(RawType::Nominal(ty)) => Some(*ty),
            _ => None,
        }
    }

    /// Replace bound type and multiplicity parameters throughout.
    pub fn substitute(&self, bindings: &Bindings) -> GenericType {
        if let Some(name) = &self.type_parameter {
            if let Some(bound) = bindings.types.get(name) {
                return bound.clone();
            }
        }
        GenericType {
            raw: self.raw.as_ref().map(|raw| match raw {
                RawType::Nominal(ty) => RawType::Nominal(*ty),
                RawType::Function(f) => RawType::Function(Box::new(f.substitute(bindings))),
                RawType::Relation(r) => RawType::Relation(r.substitute(bindings)),
            }),
            type_parameter: self.type_parameter.clone(),
            type_arguments: self
                .type_arguments
                .iter()
                .map(|a| a.substitute(bindings))
                .collect(),
            multiplicity_arguments: self
                .multiplicity_arguments
                .iter()
                .map(|m| m.substitute(bindings))
                .collect(),
        }
    }
}

/// Cardinality constraint on a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    /// `[lower..upper]`; `None` upper bound means `*`.
    Concrete { lower: u32, upper: Option<u32> },
    /// A multiplicity parameter such as `[m]`.
    Parameter(String),
}

impl Multiplicity {
    pub const PURE_ONE: Multiplicity = Multiplicity::Concrete {
        lower: 1,
        upper: Some(1),
    };
    pub const ZERO_ONE: Multiplicity = Multiplicity::Concrete {
        lower: 0,
        upper: Some(1),
    };
    pub const ZERO_MANY: Multiplicity = Multiplicity::Concrete {
        lower: 0,
        upper: None,
    };
    pub const ONE_MANY: Multiplicity = Multiplicity::Concrete {
        lower: 1,
        upper: None,
    };

    pub fn new(lower: u32, upper: Option<u32>) -> Self {
        Multiplicity::Concrete { lower, upper }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Multiplicity::Concrete { .. })
    }

    /// Returns true for `[*]`.
    pub fn is_zero_many(&self) -> bool {
        *self == Multiplicity::ZERO_MANY
    }

    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Multiplicity::Parameter(name) => Some(name),
            Multiplicity::Concrete { .. } => None,
        }
    }

    pub fn substitute(&self, bindings: &Bindings) -> Multiplicity {
        match self {
            Multiplicity::Parameter(name) => bindings
                .multiplicities
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Multiplicity::Concrete { .. } => self.clone(),
        }
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Parameter(name) => write!(f, "[{}]", name),
            Multiplicity::Concrete {
                lower: 0,
                upper: None,
            } => f.write_str("[*]"),
            Multiplicity::Concrete { lower, upper: None } => write!(f, "[{}..*]", lower),
            Multiplicity::Concrete {
                lower,
                upper: Some(upper),
            } if lower == upper => write!(f, "[{}]", lower),
            Multiplicity::Concrete {
                lower,
                upper: Some(upper),
            } => write!(f, "[{}..{}]", lower, upper),
        }
    }
}

/// A function parameter or return slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl Parameter {
    pub fn new(name: impl Into<String>, generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            generic_type,
            multiplicity,
        }
    }
}

/// `{P1[m1], P2[m2] -> R[m]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub parameters: Vec<Parameter>,
    pub return_type: GenericType,
    pub return_multiplicity: Multiplicity,
}

impl FunctionType {
    pub fn new(
        parameters: Vec<Parameter>,
        return_type: GenericType,
        return_multiplicity: Multiplicity,
    ) -> Self {
        Self {
            parameters,
            return_type,
            return_multiplicity,
        }
    }

    /// Same parameter and return types and multiplicities, ignoring names.
    pub fn same_signature(&self, other: &FunctionType) -> bool {
        self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.generic_type == b.generic_type && a.multiplicity == b.multiplicity)
            && self.return_type == other.return_type
            && self.return_multiplicity == other.return_multiplicity
    }

    fn substitute(&self, bindings: &Bindings) -> FunctionType {
        FunctionType {
            parameters: self
                .parameters
                .iter()
                .map(|p| Parameter {
                    name: p.name.clone(),
                    generic_type: p.generic_type.substitute(bindings),
                    multiplicity: p.multiplicity.substitute(bindings),
                })
                .collect(),
            return_type: self.return_type.substitute(bindings),
            return_multiplicity: self.return_multiplicity.substitute(bindings),
        }
    }
}

/// A named, typed column of a relation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl Column {
    pub fn new(name: impl Into<String>, generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            generic_type,
            multiplicity,
        }
    }
}

/// Structural row type `(a: A[1], b: B[*])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RelationType {
    pub columns: Vec<Column>,
}

impl RelationType {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn substitute(&self, bindings: &Bindings) -> RelationType {
        RelationType {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    generic_type: c.generic_type.substitute(bindings),
                    multiplicity: c.multiplicity.substitute(bindings),
                })
                .collect(),
        }
    }
}

/// A declared type parameter of a nominal type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: String,
    pub contravariant: bool,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contravariant: false,
        }
    }

    pub fn contravariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contravariant: true,
        }
    }
}

/// Type and multiplicity parameter bindings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    pub types: HashMap<String, GenericType>,
    pub multiplicities: HashMap<String, Multiplicity>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.multiplicities.is_empty()
    }

    /// Bind type parameters of `target` to the matching parts of `value`.
    ///
    /// First binding wins; conflicting later bindings are ignored.
    pub fn infer(&mut self, target: &GenericType, value: &GenericType) {
        if let Some(name) = &target.type_parameter {
            if target.raw.is_none() {
                if value.is_concrete() {
                    self.types
                        .entry(name.clone())
                        .or_insert_with(|| value.clone());
                }
                return;
            }
        }
        for (t, v) in target.type_arguments.iter().zip(&value.type_arguments) {
            self.infer(t, v);
        }
        for (t, v) in target
            .multiplicity_arguments
            .iter()
            .zip(&value.multiplicity_arguments)
        {
            self.infer_multiplicity(t, v);
        }
        if let (Some(RawType::Function(t)), Some(RawType::Function(v))) = (&target.raw, &value.raw) {
            for (tp, vp) in t.parameters.iter().zip(&v.parameters) {
                self.infer(&tp.generic_type, &vp.generic_type);
                self.infer_multiplicity(&tp.multiplicity, &vp.multiplicity);
            }
            self.infer(&t.return_type, &v.return_type);
            self.infer_multiplicity(&t.return_multiplicity, &v.return_multiplicity);
        }
    }

    pub fn infer_multiplicity(&mut self, target: &Multiplicity, value: &Multiplicity) {
        if let Multiplicity::Parameter(name) = target {
            if value.is_concrete() {
                self.multiplicities
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
    }
}
