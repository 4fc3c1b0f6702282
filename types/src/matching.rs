//! Match values and their total order.
//!
//! Every match type orders by a rank first (the kind of match) and then by
//! its contents, so the relation is a lexicographic order and therefore
//! transitive and antisymmetric. Lists of matches compare element by element,
//! then by length.

use std::cmp::Ordering;

/// How a value's raw type relates to a target raw type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeMatch {
    /// Identical or structurally equal types.
    Exact,
    /// The subtype side is the bottom type.
    Bottom,
    /// The supertype is this many generalization steps away.
    Simple(usize),
    Function(Box<FunctionTypeMatch>),
    Relation(Box<RelationTypeMatch>),
}

impl TypeMatch {
    fn rank(&self) -> u8 {
        match self {
            TypeMatch::Exact => 0,
            TypeMatch::Bottom => 1,
            TypeMatch::Simple(_) => 2,
            TypeMatch::Function(_) => 3,
            TypeMatch::Relation(_) => 4,
        }
    }
}

impl Ord for TypeMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (TypeMatch::Simple(a), TypeMatch::Simple(b)) => a.cmp(b),
            (TypeMatch::Function(a), TypeMatch::Function(b)) => a.cmp(b),
            (TypeMatch::Relation(a), TypeMatch::Relation(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for TypeMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match between two function types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionTypeMatch {
    pub parameter_types: Vec<GenericTypeMatch>,
    pub parameter_multiplicities: Vec<MultiplicityMatch>,
    pub return_type: GenericTypeMatch,
    pub return_multiplicity: MultiplicityMatch,
}

impl Ord for FunctionTypeMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.parameter_types, &other.parameter_types)
            .then_with(|| compare_lists(&self.parameter_multiplicities, &other.parameter_multiplicities))
            .then_with(|| self.return_type.cmp(&other.return_type))
            .then_with(|| self.return_multiplicity.cmp(&other.return_multiplicity))
    }
}

impl PartialOrd for FunctionTypeMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match between two relation types, column by aligned column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationTypeMatch {
    pub column_types: Vec<GenericTypeMatch>,
    pub column_multiplicities: Vec<MultiplicityMatch>,
}

impl Ord for RelationTypeMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_lists(&self.column_types, &other.column_types)
            .then_with(|| compare_lists(&self.column_multiplicities, &other.column_multiplicities))
    }
}

impl PartialOrd for RelationTypeMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match between two generic types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericTypeMatch {
    /// Identical generic types.
    Exact,
    /// Raw types matched; arguments matched pairwise.
    Concrete {
        raw: TypeMatch,
        type_arguments: Vec<GenericTypeMatch>,
        multiplicity_arguments: Vec<MultiplicityMatch>,
    },
    /// One side is an unbound type parameter.
    NonConcrete,
    /// The value was missing and the policy let it match.
    Null,
}

impl GenericTypeMatch {
    pub fn raw(raw: TypeMatch) -> Self {
        GenericTypeMatch::Concrete {
            raw,
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn simple(distance: usize) -> Self {
        Self::raw(TypeMatch::Simple(distance))
    }

    fn rank(&self) -> u8 {
        match self {
            GenericTypeMatch::Exact => 0,
            GenericTypeMatch::Concrete { .. } => 1,
            GenericTypeMatch::NonConcrete => 2,
            GenericTypeMatch::Null => 3,
        }
    }
}

impl Ord for GenericTypeMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (
                GenericTypeMatch::Concrete {
                    raw: a_raw,
                    type_arguments: a_types,
                    multiplicity_arguments: a_mults,
                },
                GenericTypeMatch::Concrete {
                    raw: b_raw,
                    type_arguments: b_types,
                    multiplicity_arguments: b_mults,
                },
            ) => a_raw
                .cmp(b_raw)
                .then_with(|| compare_lists(a_types, b_types))
                .then_with(|| compare_lists(a_mults, b_mults)),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for GenericTypeMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match between two multiplicities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultiplicityMatch {
    Exact,
    /// Distances between the bounds; the upper distance compares first.
    Simple { lower: u32, upper: u32 },
    NonConcrete,
    Null,
}

impl MultiplicityMatch {
    fn rank(&self) -> u8 {
        match self {
            MultiplicityMatch::Exact => 0,
            MultiplicityMatch::Simple { .. } => 1,
            MultiplicityMatch::NonConcrete => 2,
            MultiplicityMatch::Null => 3,
        }
    }
}

impl Ord for MultiplicityMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (
                MultiplicityMatch::Simple { lower: al, upper: au },
                MultiplicityMatch::Simple { lower: bl, upper: bu },
            ) => au.cmp(bu).then_with(|| al.cmp(bl)),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for MultiplicityMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Element-wise comparison, then shorter first.
pub fn compare_lists<T: Ord>(a: &[T], b: &[T]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<GenericTypeMatch> {
        vec![
            GenericTypeMatch::Exact,
            GenericTypeMatch::raw(TypeMatch::Exact),
            GenericTypeMatch::raw(TypeMatch::Bottom),
            GenericTypeMatch::simple(0),
            GenericTypeMatch::simple(1),
            GenericTypeMatch::simple(3),
            GenericTypeMatch::Concrete {
                raw: TypeMatch::Simple(1),
                type_arguments: vec![GenericTypeMatch::simple(2)],
                multiplicity_arguments: vec![],
            },
            GenericTypeMatch::raw(TypeMatch::Function(Box::new(FunctionTypeMatch {
                parameter_types: vec![GenericTypeMatch::Exact],
                parameter_multiplicities: vec![MultiplicityMatch::Exact],
                return_type: GenericTypeMatch::simple(1),
                return_multiplicity: MultiplicityMatch::Exact,
            }))),
            GenericTypeMatch::NonConcrete,
            GenericTypeMatch::Null,
        ]
    }

    // ========== TEST: ordering ==========

    #[test]
    fn test_documented_order() {
        assert!(GenericTypeMatch::Exact < GenericTypeMatch::simple(0));
        assert!(GenericTypeMatch::simple(0) < GenericTypeMatch::simple(1));
        assert!(GenericTypeMatch::simple(7) < GenericTypeMatch::NonConcrete);
        assert!(GenericTypeMatch::NonConcrete < GenericTypeMatch::Null);
    }

    #[test]
    fn test_bottom_between_exact_and_distance() {
        assert!(TypeMatch::Exact < TypeMatch::Bottom);
        assert!(TypeMatch::Bottom < TypeMatch::Simple(0));
    }

    #[test]
    fn test_order_is_transitive_and_antisymmetric() {
        let all = samples();
        for a in &all {
            for b in &all {
                if a.cmp(b) == Ordering::Equal {
                    assert_eq!(a, b);
                }
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &all {
                    if a <= b && b <= c {
                        assert!(a <= c, "{:?} <= {:?} <= {:?}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_argument_lists_break_ties() {
        let plain = GenericTypeMatch::simple(1);
        let with_args = GenericTypeMatch::Concrete {
            raw: TypeMatch::Simple(1),
            type_arguments: vec![GenericTypeMatch::Exact],
            multiplicity_arguments: vec![],
        };
        assert!(plain < with_args);
    }

    #[test]
    fn test_multiplicity_upper_distance_compares_first() {
        let a = MultiplicityMatch::Simple { lower: 5, upper: 0 };
        let b = MultiplicityMatch::Simple { lower: 0, upper: 1 };
        assert!(a < b);
        assert!(MultiplicityMatch::Exact < a);
        assert!(b < MultiplicityMatch::NonConcrete);
        assert!(MultiplicityMatch::NonConcrete < MultiplicityMatch::Null);
    }
}
