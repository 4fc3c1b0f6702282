//! Abstract Syntax Tree types for model source text.

use weft_core::{Literal, Span};

// ==================== NAMES ====================

/// A possibly qualified name such as `model::Person`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub path: String,
    pub span: Span,
}

impl QualifiedName {
    pub fn new(path: impl Into<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            span,
        }
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }
}

// ==================== SECTIONS ====================

/// One parsed section of a source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionAst {
    /// `import a::b::*;` package imports, in order.
    pub imports: Vec<QualifiedName>,
    pub elements: Vec<Element>,
}

/// A top-level element definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Class(ClassDef),
    Association(AssociationDef),
    Enumeration(EnumDef),
    Function(FunctionDef),
}

impl Element {
    pub fn name(&self) -> &QualifiedName {
        match self {
            Element::Class(c) => &c.name,
            Element::Association(a) => &a.name,
            Element::Enumeration(e) => &e.name,
            Element::Function(f) => &f.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Element::Class(c) => c.span,
            Element::Association(a) => a.span,
            Element::Enumeration(e) => e.span,
            Element::Function(f) => f.span,
        }
    }
}

// ==================== TYPES ====================

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A class, primitive, enumeration or type parameter reference with
    /// optional `<T, U|m>` arguments.
    Named {
        name: QualifiedName,
        type_arguments: Vec<TypeExpr>,
        multiplicity_arguments: Vec<MultiplicityExpr>,
        span: Span,
    },
    /// `{A[1], B[*]->C[0..1]}`
    Function {
        parameters: Vec<(TypeExpr, MultiplicityExpr)>,
        return_type: Box<TypeExpr>,
        return_multiplicity: MultiplicityExpr,
        span: Span,
    },
    /// `(a:Integer[1], b:String[*])`
    Relation { columns: Vec<ColumnDef>, span: Span },
}

impl TypeExpr {
    pub fn named(path: impl Into<String>, span: Span) -> Self {
        TypeExpr::Named {
            name: QualifiedName::new(path, span),
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. } => *span,
            TypeExpr::Function { span, .. } => *span,
            TypeExpr::Relation { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub type_expr: TypeExpr,
    pub multiplicity: MultiplicityExpr,
    pub span: Span,
}

/// `[1]`, `[0..1]`, `[*]`, `[1..*]` or a parameter `[m]`.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiplicityExpr {
    Concrete {
        lower: u32,
        upper: Option<u32>,
        span: Span,
    },
    Parameter { name: String, span: Span },
}

impl MultiplicityExpr {
    pub fn span(&self) -> Span {
        match self {
            MultiplicityExpr::Concrete { span, .. } => *span,
            MultiplicityExpr::Parameter { span, .. } => *span,
        }
    }
}

/// A declared type parameter; `-T` marks it contravariant.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDef {
    pub name: String,
    pub contravariant: bool,
    pub span: Span,
}

// ==================== ELEMENTS ====================

/// `Class <<temporal>> pkg::Name<T> extends A, B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: QualifiedName,
    pub stereotypes: Vec<String>,
    pub type_parameters: Vec<TypeParameterDef>,
    pub multiplicity_parameters: Vec<String>,
    pub generalizations: Vec<TypeExpr>,
    pub properties: Vec<PropertyDef>,
    pub qualified_properties: Vec<QualifiedPropertyDef>,
    pub span: Span,
}

/// `name: Type[m];`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub type_expr: TypeExpr,
    pub multiplicity: MultiplicityExpr,
    pub span: Span,
}

/// `name(p: T[1]) { body }: R[m];`
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedPropertyDef {
    pub name: String,
    pub parameters: Vec<ParameterDef>,
    pub body: Vec<Expr>,
    pub return_type: TypeExpr,
    pub return_multiplicity: MultiplicityExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDef {
    pub name: String,
    pub type_expr: TypeExpr,
    pub multiplicity: MultiplicityExpr,
    pub span: Span,
}

/// `Association pkg::Name { a: A[1]; b: B[*]; }`
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationDef {
    pub name: QualifiedName,
    pub properties: Vec<PropertyDef>,
    pub span: Span,
}

/// `Enum pkg::Name { A, B }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: QualifiedName,
    pub values: Vec<(String, Span)>,
    pub span: Span,
}

/// `function pkg::f<T|m>(p: T[m]): R[1] { body }` or
/// `native function pkg::f(p: T[1]): R[1];`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: QualifiedName,
    pub native: bool,
    pub type_parameters: Vec<TypeParameterDef>,
    pub multiplicity_parameters: Vec<String>,
    pub parameters: Vec<ParameterDef>,
    pub return_type: TypeExpr,
    pub return_multiplicity: MultiplicityExpr,
    pub body: Vec<Expr>,
    pub span: Span,
}

// ==================== EXPRESSIONS ====================

/// An expression in a function or qualified-property body.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    /// `$name`
    Variable(String, Span),
    /// `f(a, b)`, `a->f(b)`, and desugared operators.
    Application(Application),
    /// `$x.name`
    PropertyAccess {
        receiver: Box<Expr>,
        property: String,
        span: Span,
    },
    /// `[a, b, c]`
    Collection(Vec<Expr>, Span),
    /// `@pkg::Type`, a reference to a packageable element.
    ElementRef(QualifiedName),
    /// `let x = expr`
    Let {
        name: String,
        value: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) => *span,
            Expr::Variable(_, span) => *span,
            Expr::Application(app) => app.span,
            Expr::PropertyAccess { span, .. } => *span,
            Expr::Collection(_, span) => *span,
            Expr::ElementRef(name) => name.span,
            Expr::Let { span, .. } => *span,
        }
    }
}

/// A function application.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub function: QualifiedName,
    pub arguments: Vec<Expr>,
    pub span: Span,
}
