//! Weft Integration Test Framework
//!
//! Provides a fluent API for driving a session through edits and compiles.
//!
//! # Example
//!
//! ```ignore
//! use weft_tests::prelude::*;
//!
//! #[test]
//! fn test() {
//!     Scenario::new("classes")
//!         .add("a.pure", "Class A {}")
//!         .step("compile", |a| a.succeeds().defines("A"))
//!         .delete("a.pure")
//!         .step("delete", |a| a.succeeds().lacks("A"))
//!         .run()
//!         .unwrap();
//! }
//! ```

mod assertion;
pub mod diagram;
mod error;
mod scenario;

pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::Scenario;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::AssertionBuilder;
    pub use crate::diagram::DiagramExtension;
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::init_tracing;
    pub use crate::scenario::Scenario;
    pub use weft_session::{CompileReport, Session, SessionConfig, SessionError};
}

/// Install a test subscriber filtered by `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
