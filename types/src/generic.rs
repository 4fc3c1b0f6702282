//! Generic and raw type matching.

use crate::function::function_type_match;
use crate::relation::relation_type_match;
use crate::{
    multiplicity_match, resolve_at, GenericType, GenericTypeMatch, MatchError, MatchPolicy,
    MatchResult, MultiplicityMatch, NullMatchBehavior, ParameterMatchBehavior, RawType,
    TypeHierarchy, TypeMatch,
};

/// Match `value` against `target`.
///
/// With `covariant`, `value` must be usable where `target` is expected
/// (value is the subtype side). Without it the roles swap.
pub fn generic_type_match<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    target: &GenericType,
    value: Option<&GenericType>,
    covariant: bool,
    policy: &MatchPolicy,
) -> MatchResult<Option<GenericTypeMatch>> {
    let Some(value) = value else {
        return match policy.null_value {
            NullMatchBehavior::MatchAnything => Ok(Some(GenericTypeMatch::Null)),
            NullMatchBehavior::MatchNothing => Ok(None),
            NullMatchBehavior::Error => Err(MatchError::NullValue { what: "type" }),
        };
    };

    if target == value {
        return Ok(Some(GenericTypeMatch::Exact));
    }

    let Some(target_raw) = &target.raw else {
        return match policy.target_parameters {
            ParameterMatchBehavior::MatchAnything => Ok(Some(GenericTypeMatch::NonConcrete)),
            ParameterMatchBehavior::MatchCautiously => {
                let matches = match value.nominal_type() {
                    None if !value.is_concrete() => value.type_parameter == target.type_parameter,
                    None => false,
                    Some(ty) => {
                        (covariant && hierarchy.is_bottom(ty)) || (!covariant && hierarchy.is_top(ty))
                    }
                };
                Ok(matches.then_some(GenericTypeMatch::NonConcrete))
            }
            ParameterMatchBehavior::MatchNothing => Ok(None),
            ParameterMatchBehavior::Error => Err(MatchError::NonConcreteTarget {
                what: "type",
                found: target.type_parameter.clone().unwrap_or_default(),
            }),
        };
    };

    let Some(value_raw) = &value.raw else {
        return match policy.value_parameters {
            ParameterMatchBehavior::MatchAnything => Ok(Some(GenericTypeMatch::NonConcrete)),
            ParameterMatchBehavior::MatchCautiously => {
                let matches = match target.nominal_type() {
                    Some(ty) => {
                        (covariant && hierarchy.is_top(ty)) || (!covariant && hierarchy.is_bottom(ty))
                    }
                    None => false,
                };
                Ok(matches.then_some(GenericTypeMatch::NonConcrete))
            }
            ParameterMatchBehavior::MatchNothing => Ok(None),
            ParameterMatchBehavior::Error => Err(MatchError::NonConcreteValue {
                what: "type",
                found: value.type_parameter.clone().unwrap_or_default(),
            }),
        };
    };

    let Some(raw) = raw_type_match(hierarchy, target_raw, value_raw, covariant, policy)? else {
        return Ok(None);
    };

    let (sub, sup) = if covariant { (value, target) } else { (target, value) };
    let sub_is_bottom = sub.nominal_type().is_some_and(|t| hierarchy.is_bottom(t));
    let Some(sup_type) = sup.nominal_type() else {
        return Ok(Some(GenericTypeMatch::raw(raw)));
    };
    if sub_is_bottom || hierarchy.is_top(sup_type) {
        return Ok(Some(GenericTypeMatch::raw(raw)));
    }

    // Express the subtype side at the supertype's raw type so the arguments line up.
    let Some(resolved) = resolve_at(hierarchy, sub, sup_type) else {
        return Ok(None);
    };
    let (target_side, value_side) = if covariant {
        (target, &resolved)
    } else {
        (&resolved, value)
    };

    let parameters = hierarchy.type_parameters(sup_type);
    let mut type_arguments = Vec::new();
    if !target_side.type_arguments.is_empty() && !value_side.type_arguments.is_empty() {
        if target_side.type_arguments.len() != value_side.type_arguments.len() {
            return Ok(None);
        }
        for (index, (t, v)) in target_side
            .type_arguments
            .iter()
            .zip(&value_side.type_arguments)
            .enumerate()
        {
            let contravariant = parameters.get(index).is_some_and(|p| p.contravariant);
            let argument_covariant = covariant != contravariant;
            match generic_type_match(hierarchy, t, Some(v), argument_covariant, policy)? {
                Some(m) => type_arguments.push(m),
                None => return Ok(None),
            }
        }
    }

    let mut multiplicity_arguments: Vec<MultiplicityMatch> = Vec::new();
    if !target_side.multiplicity_arguments.is_empty() && !value_side.multiplicity_arguments.is_empty() {
        if target_side.multiplicity_arguments.len() != value_side.multiplicity_arguments.len() {
            return Ok(None);
        }
        for (t, v) in target_side
            .multiplicity_arguments
            .iter()
            .zip(&value_side.multiplicity_arguments)
        {
            match multiplicity_match(t, Some(v), covariant, policy)? {
                Some(m) => multiplicity_arguments.push(m),
                None => return Ok(None),
            }
        }
    }

    Ok(Some(GenericTypeMatch::Concrete {
        raw,
        type_arguments,
        multiplicity_arguments,
    }))
}

/// Match raw types, ignoring type and multiplicity arguments.
pub fn raw_type_match<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    target: &RawType,
    value: &RawType,
    covariant: bool,
    policy: &MatchPolicy,
) -> MatchResult<Option<TypeMatch>> {
    if target == value {
        return Ok(Some(TypeMatch::Exact));
    }
    let (sub, sup) = if covariant { (value, target) } else { (target, value) };
    let is_top = |raw: &RawType| matches!(raw, RawType::Nominal(t) if hierarchy.is_top(*t));

    if matches!(sub, RawType::Relation(_)) {
        return match (target, value) {
            (RawType::Relation(t), RawType::Relation(v)) => Ok(relation_type_match(
                hierarchy, t, v, covariant, policy,
            )?
            .map(|m| TypeMatch::Relation(Box::new(m)))),
            _ if is_top(sup) => Ok(Some(TypeMatch::Simple(1))),
            _ => Ok(None),
        };
    }

    if matches!(sub, RawType::Nominal(t) if hierarchy.is_bottom(*t)) {
        return Ok(Some(TypeMatch::Bottom));
    }

    match (sub, sup) {
        (RawType::Function(sub_fn), RawType::Function(sup_fn)) => {
            if sub_fn.same_signature(sup_fn) {
                return Ok(Some(TypeMatch::Exact));
            }
            let (RawType::Function(t), RawType::Function(v)) = (target, value) else {
                return Ok(None);
            };
            Ok(function_type_match(hierarchy, t, v, covariant, policy)?
                .map(|m| TypeMatch::Function(Box::new(m))))
        }
        (RawType::Function(_), sup) if is_top(sup) => Ok(Some(TypeMatch::Simple(1))),
        (RawType::Nominal(sub_type), RawType::Nominal(sup_type)) => Ok(hierarchy
            .generalization_order(*sub_type)
            .iter()
            .position(|t| t == sup_type)
            .map(TypeMatch::Simple)),
        _ => Ok(None),
    }
}
