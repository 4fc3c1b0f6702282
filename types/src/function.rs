//! Function type matching.

use crate::{
    generic_type_match, multiplicity_match, FunctionType, FunctionTypeMatch, MatchPolicy,
    MatchResult, TypeHierarchy,
};

/// Parameters match with the variance flipped, the return slot without.
pub(crate) fn function_type_match<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    target: &FunctionType,
    value: &FunctionType,
    covariant: bool,
    policy: &MatchPolicy,
) -> MatchResult<Option<FunctionTypeMatch>> {
    if target.parameters.len() != value.parameters.len() {
        return Ok(None);
    }

    let mut parameter_types = Vec::with_capacity(target.parameters.len());
    let mut parameter_multiplicities = Vec::with_capacity(target.parameters.len());
    for (t, v) in target.parameters.iter().zip(&value.parameters) {
        let Some(type_match) =
            generic_type_match(hierarchy, &t.generic_type, Some(&v.generic_type), !covariant, policy)?
        else {
            return Ok(None);
        };
        let Some(multiplicity) =
            multiplicity_match(&t.multiplicity, Some(&v.multiplicity), !covariant, policy)?
        else {
            return Ok(None);
        };
        parameter_types.push(type_match);
        parameter_multiplicities.push(multiplicity);
    }

    let Some(return_type) = generic_type_match(
        hierarchy,
        &target.return_type,
        Some(&value.return_type),
        covariant,
        policy,
    )?
    else {
        return Ok(None);
    };
    let Some(return_multiplicity) = multiplicity_match(
        &target.return_multiplicity,
        Some(&value.return_multiplicity),
        covariant,
        policy,
    )?
    else {
        return Ok(None);
    };

    Ok(Some(FunctionTypeMatch {
        parameter_types,
        parameter_multiplicities,
        return_type,
        return_multiplicity,
    }))
}
