//! Multiplicity matching.

use crate::{
    MatchError, MatchPolicy, MatchResult, Multiplicity, MultiplicityMatch, NullMatchBehavior,
    ParameterMatchBehavior,
};

/// Match `value` against `target`.
///
/// With `covariant`, the value's range must fit inside the target's; without
/// it, the target's range must fit inside the value's. The distances are how
/// far the inner range's bounds sit from the outer range's.
pub fn multiplicity_match(
    target: &Multiplicity,
    value: Option<&Multiplicity>,
    covariant: bool,
    policy: &MatchPolicy,
) -> MatchResult<Option<MultiplicityMatch>> {
    let Some(value) = value else {
        return match policy.null_value {
            NullMatchBehavior::MatchAnything => Ok(Some(MultiplicityMatch::Null)),
            NullMatchBehavior::MatchNothing => Ok(None),
            NullMatchBehavior::Error => Err(MatchError::NullValue {
                what: "multiplicity",
            }),
        };
    };

    if target == value {
        return Ok(Some(MultiplicityMatch::Exact));
    }

    if let Multiplicity::Parameter(target_param) = target {
        return match policy.target_parameters {
            ParameterMatchBehavior::MatchAnything => Ok(Some(MultiplicityMatch::NonConcrete)),
            ParameterMatchBehavior::MatchCautiously => {
                let matches = match value {
                    Multiplicity::Concrete { .. } => false,
                    Multiplicity::Parameter(value_param) => value_param == target_param,
                };
                Ok(matches.then_some(MultiplicityMatch::NonConcrete))
            }
            ParameterMatchBehavior::MatchNothing => Ok(None),
            ParameterMatchBehavior::Error => Err(MatchError::NonConcreteTarget {
                what: "multiplicity",
                found: target.to_string(),
            }),
        };
    }

    if let Multiplicity::Parameter(_) = value {
        return match policy.value_parameters {
            ParameterMatchBehavior::MatchAnything => Ok(Some(MultiplicityMatch::NonConcrete)),
            ParameterMatchBehavior::MatchCautiously => {
                // Only [*] accepts every binding of the parameter.
                if covariant && target.is_zero_many() {
                    Ok(Some(MultiplicityMatch::Simple {
                        lower: u32::MAX,
                        upper: u32::MAX,
                    }))
                } else {
                    Ok(None)
                }
            }
            ParameterMatchBehavior::MatchNothing => Ok(None),
            ParameterMatchBehavior::Error => Err(MatchError::NonConcreteValue {
                what: "multiplicity",
                found: value.to_string(),
            }),
        };
    }

    let (large, small) = if covariant { (target, value) } else { (value, target) };
    let (
        Multiplicity::Concrete {
            lower: large_lower,
            upper: large_upper,
        },
        Multiplicity::Concrete {
            lower: small_lower,
            upper: small_upper,
        },
    ) = (large, small)
    else {
        return Ok(None);
    };

    let Some(lower) = small_lower.checked_sub(*large_lower) else {
        return Ok(None);
    };
    let upper = match (large_upper, small_upper) {
        (None, None) => 0,
        (None, Some(_)) => u32::MAX,
        (Some(_), None) => return Ok(None),
        (Some(large), Some(small)) => match large.checked_sub(*small) {
            Some(distance) => distance,
            None => return Ok(None),
        },
    };

    if lower == 0 && upper == 0 {
        Ok(Some(MultiplicityMatch::Exact))
    } else {
        Ok(Some(MultiplicityMatch::Simple { lower, upper }))
    }
}
