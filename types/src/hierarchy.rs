//! The nominal type hierarchy the engine consults.

use crate::{Bindings, GenericType, RawType, TypeParameter, TypeRef};
use std::collections::{HashSet, VecDeque};

/// Everything the engine needs to know about nominal types.
pub trait TypeHierarchy {
    /// The universal supertype.
    fn top(&self) -> TypeRef;

    /// The empty subtype of every type.
    fn bottom(&self) -> TypeRef;

    /// Declared type parameters of `ty`, in order.
    fn type_parameters(&self, ty: TypeRef) -> Vec<TypeParameter>;

    /// Direct supertypes of `ty`, with arguments written in terms of `ty`'s
    /// own type parameters.
    fn generalizations(&self, ty: TypeRef) -> Vec<GenericType>;

    /// Display name of `ty`.
    fn type_name(&self, ty: TypeRef) -> String;

    fn is_top(&self, ty: TypeRef) -> bool {
        ty == self.top()
    }

    fn is_bottom(&self, ty: TypeRef) -> bool {
        ty == self.bottom()
    }

    /// `ty` followed by its supertypes breadth-first, ending with the top type.
    ///
    /// The index of a supertype in this list is its generalization distance.
    fn generalization_order(&self, ty: TypeRef) -> Vec<TypeRef> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([ty]);
        while let Some(next) = queue.pop_front() {
            if order.contains(&next) {
                continue;
            }
            order.push(next);
            queue.extend(
                self.generalizations(next)
                    .iter()
                    .filter_map(|g| g.nominal_type()),
            );
        }
        let top = self.top();
        order.retain(|t| *t != top);
        order.push(top);
        order
    }
}

/// Re-express `value` as an instance of its supertype `target`.
///
/// Walks the generalizations of `value`'s raw type, substituting type
/// arguments at each step, until `target` is reached. Returns `None` when
/// `target` is not a supertype.
pub fn resolve_at<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    value: &GenericType,
    target: TypeRef,
) -> Option<GenericType> {
    let mut queue = VecDeque::from([value.clone()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        let Some(raw) = current.nominal_type() else {
            continue;
        };
        if raw == target {
            return Some(current);
        }
        if !seen.insert(raw) {
            continue;
        }
        let mut bindings = Bindings::new();
        for (parameter, argument) in hierarchy
            .type_parameters(raw)
            .iter()
            .zip(&current.type_arguments)
        {
            bindings
                .types
                .insert(parameter.name.clone(), argument.clone());
        }
        for general in hierarchy.generalizations(raw) {
            queue.push_back(general.substitute(&bindings));
        }
    }
    if hierarchy.is_top(target) {
        return Some(GenericType::nominal(target));
    }
    None
}

/// Render a generic type the way it is written in source.
pub fn print_generic_type<H: TypeHierarchy + ?Sized>(hierarchy: &H, generic: &GenericType) -> String {
    let mut out = match &generic.raw {
        None => generic
            .type_parameter
            .clone()
            .unwrap_or_else(|| "?".to_string()),
        Some(RawType::Nominal(ty)) => hierarchy.type_name(*ty),
        Some(RawType::Function(f)) => {
            let params: Vec<String> = f
                .parameters
                .iter()
                .map(|p| format!("{}{}", print_generic_type(hierarchy, &p.generic_type), p.multiplicity))
                .collect();
            format!(
                "{{{}->{}{}}}",
                params.join(", "),
                print_generic_type(hierarchy, &f.return_type),
                f.return_multiplicity
            )
        }
        Some(RawType::Relation(r)) => {
            let columns: Vec<String> = r
                .columns
                .iter()
                .map(|c| format!("{}:{}{}", c.name, print_generic_type(hierarchy, &c.generic_type), c.multiplicity))
                .collect();
            format!("({})", columns.join(", "))
        }
    };
    if !generic.type_arguments.is_empty() || !generic.multiplicity_arguments.is_empty() {
        let mut args: Vec<String> = generic
            .type_arguments
            .iter()
            .map(|a| print_generic_type(hierarchy, a))
            .collect();
        let mults: Vec<String> = generic
            .multiplicity_arguments
            .iter()
            .map(|m| m.to_string().trim_matches(|c| c == '[' || c == ']').to_string())
            .collect();
        if !mults.is_empty() {
            args.push(format!("|{}", mults.join(",")));
        }
        out.push('<');
        out.push_str(&args.join(", "));
        out.push('>');
    }
    out
}
