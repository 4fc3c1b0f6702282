//! Matching call arguments against function signatures.

use crate::matching::compare_lists;
use crate::{
    generic_type_match, multiplicity_match, GenericType, GenericTypeMatch, MatchPolicy,
    MatchResult, Multiplicity, MultiplicityMatch, Parameter, TypeHierarchy,
};
use std::cmp::Ordering;

/// A call argument as far as its type is known.
///
/// `None` parts are unknown, e.g. an empty collection literal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    pub generic_type: Option<GenericType>,
    pub multiplicity: Option<Multiplicity>,
}

impl Argument {
    pub fn new(generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            generic_type: Some(generic_type),
            multiplicity: Some(multiplicity),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Per-argument matches of one candidate signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentsMatch {
    pub types: Vec<GenericTypeMatch>,
    pub multiplicities: Vec<MultiplicityMatch>,
}

impl Ord for ArgumentsMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.types, &other.types)
            .then_with(|| compare_lists(&self.multiplicities, &other.multiplicities))
    }
}

impl PartialOrd for ArgumentsMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match each argument covariantly against the parameter at the same position.
pub fn match_arguments<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    parameters: &[Parameter],
    arguments: &[Argument],
    policy: &MatchPolicy,
) -> MatchResult<Option<ArgumentsMatch>> {
    if parameters.len() != arguments.len() {
        return Ok(None);
    }
    let mut types = Vec::with_capacity(parameters.len());
    let mut multiplicities = Vec::with_capacity(parameters.len());
    for (parameter, argument) in parameters.iter().zip(arguments) {
        let Some(type_match) = generic_type_match(
            hierarchy,
            &parameter.generic_type,
            argument.generic_type.as_ref(),
            true,
            policy,
        )?
        else {
            return Ok(None);
        };
        let Some(multiplicity) = multiplicity_match(
            &parameter.multiplicity,
            argument.multiplicity.as_ref(),
            true,
            policy,
        )?
        else {
            return Ok(None);
        };
        types.push(type_match);
        multiplicities.push(multiplicity);
    }
    Ok(Some(ArgumentsMatch {
        types,
        multiplicities,
    }))
}

/// Outcome of picking the best candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    NoMatch,
    Unique(T),
    /// Several candidates share the best score.
    Ambiguous(Vec<T>),
}

/// Keep the candidates with the minimum match.
pub fn select_best<T>(candidates: impl IntoIterator<Item = (T, ArgumentsMatch)>) -> Selection<T> {
    let mut best: Option<ArgumentsMatch> = None;
    let mut winners: Vec<T> = Vec::new();
    for (candidate, score) in candidates {
        match best.as_ref().map(|b| score.cmp(b)) {
            None | Some(Ordering::Less) => {
                best = Some(score);
                winners.clear();
                winners.push(candidate);
            }
            Some(Ordering::Equal) => winners.push(candidate),
            Some(Ordering::Greater) => {}
        }
    }
    match winners.len() {
        0 => Selection::NoMatch,
        1 => match winners.pop() {
            Some(winner) => Selection::Unique(winner),
            None => Selection::NoMatch,
        },
        _ => Selection::Ambiguous(winners),
    }
}
