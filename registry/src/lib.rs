//! Weft Dispatch Registry
//!
//! Maps a node's kind (the path of its classifier) to the handler registered
//! for each of the four compilation roles:
//! - processor: resolves references and computes derived state
//! - walker: discovers derived state to remove on unload
//! - unbinder: removes that state
//! - validator: read-only post-processing checks
//!
//! The registry is generic over the handler interface so that the compiler
//! owns the handler signatures while extensions only need a path to register
//! under.

mod builder;
mod error;
mod matcher;
mod role;

pub use builder::*;
pub use error::*;
pub use matcher::*;
pub use role::*;
