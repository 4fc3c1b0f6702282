//! Weft Session
//!
//! Owns the graph and keeps it in step with a set of source units:
//! - Pending changes: add, replace, delete
//! - Incremental compile: unload, build, process, validate
//! - Rollback of a failed batch, with the changes kept pending
//! - Canonical serialization and metadata export

mod config;
mod error;
mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use session::{CompileReport, Session};
