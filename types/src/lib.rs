//! Weft Type-Matching Engine
//!
//! A pure function from (target, candidate, covariance, policies) to either
//! "no match" (`None`) or a [`GenericTypeMatch`] / [`MultiplicityMatch`].
//! Match values are totally ordered, best first, so overload resolution can
//! pick the unique minimum:
//!
//! exact < bottom < simple(distance) < function < relation < non-concrete < null
//!
//! The engine never touches the graph: nominal types are opaque [`TypeRef`]s
//! and everything it needs to know about them comes from a [`TypeHierarchy`].

mod error;
mod function;
mod generic;
mod hierarchy;
mod matching;
mod model;
mod multiplicity;
mod policy;
mod relation;
mod signature;

pub use error::*;
pub use generic::{generic_type_match, raw_type_match};
pub use hierarchy::*;
pub use matching::*;
pub use model::*;
pub use multiplicity::multiplicity_match;
pub use policy::*;
pub use signature::*;
