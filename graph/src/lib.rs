//! Weft Graph Storage
//!
//! This crate provides the shared instance graph every compiler stage works on:
//! - Node arena addressed by stable `NodeId` handles
//! - Top-level path table with forward-reference placeholders and packages
//! - Ordered property multimaps with owned (anonymous) and referenced values
//! - Literal interning
//! - Classifier index: find instances by classifier
//! - Back-reference index: find who points at a node without scanning the graph
//! - Canonical, id-free serialization used to compare graph states

mod backref;
mod graph;
pub mod hierarchy;
mod index;
mod node;
mod serialize;

pub use backref::*;
pub use graph::*;
pub use node::*;
pub use serialize::*;
