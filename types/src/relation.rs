//! Relation type matching.

use crate::{
    generic_type_match, multiplicity_match, MatchPolicy, MatchResult, RelationType,
    RelationTypeMatch, TypeHierarchy,
};

/// The subtype side must carry every column of the supertype side, by name.
/// Extra columns are ignored. Aligned columns are compared in name order,
/// so declaration order never affects how two matches rank.
pub(crate) fn relation_type_match<H: TypeHierarchy + ?Sized>(
    hierarchy: &H,
    target: &RelationType,
    value: &RelationType,
    covariant: bool,
    policy: &MatchPolicy,
) -> MatchResult<Option<RelationTypeMatch>> {
    let (sub, sup) = if covariant { (value, target) } else { (target, value) };
    if sub.columns.len() < sup.columns.len() {
        return Ok(None);
    }

    let mut column_types = Vec::with_capacity(sup.columns.len());
    let mut column_multiplicities = Vec::with_capacity(sup.columns.len());
    let mut aligned: Vec<_> = sup.columns.iter().collect();
    aligned.sort_by(|a, b| a.name.cmp(&b.name));
    for sup_column in aligned {
        let Some(sub_column) = sub.column(&sup_column.name) else {
            return Ok(None);
        };
        let (t, v) = if covariant {
            (sup_column, sub_column)
        } else {
            (sub_column, sup_column)
        };
        let Some(type_match) =
            generic_type_match(hierarchy, &t.generic_type, Some(&v.generic_type), covariant, policy)?
        else {
            return Ok(None);
        };
        let Some(multiplicity) =
            multiplicity_match(&t.multiplicity, Some(&v.multiplicity), covariant, policy)?
        else {
            return Ok(None);
        };
        column_types.push(type_match);
        column_multiplicities.push(multiplicity);
    }

    Ok(Some(RelationTypeMatch {
        column_types,
        column_multiplicities,
    }))
}
