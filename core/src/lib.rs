//! Weft Core Types
//!
//! This crate provides the foundational types used throughout the weft compiler:
//! - Identity types (NodeId)
//! - Source locations (Span, SourceInfo)
//! - Literal values interned by the graph store
//! - The metamodel vocabulary (classifier paths and property names)
//! - Common error types

mod error;
mod id;
mod literal;
pub mod m3;
mod span;

pub use error::*;
pub use id::*;
pub use literal::*;
pub use span::*;
