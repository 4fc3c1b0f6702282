//! Weft Compiler
//!
//! Turn source units into compiled graph fragments, and take them out again.
//!
//! Responsibilities:
//! - Bootstrap the metamodel
//! - Build graph fragments from parsed sections (through extensions)
//! - Process: resolve references, type expressions, pick overloads
//! - Validate processed elements
//! - Walk and unbind the derived state of units being removed

mod bootstrap;
mod build;
mod compiler;
mod context;
mod error;
mod extension;
mod grammar;
mod handler;
mod process;
mod typing;
mod unload;

pub use bootstrap::{add_generalization, bootstrap_metamodel};
pub use build::BuildContext;
pub use compiler::{BuiltSection, Compiler};
pub use context::Context;
pub use error::{CompileError, CompileResult};
pub use extension::Extension;
pub use grammar::{signature_id, CoreExtension};
pub use handler::{register_kind, KindHandler, UnbindContext};
pub use process::{process_all, source_info, validate_all, ProcessContext, ProcessorState};
pub use typing::{
    lower_function_type, lower_generic_type, lower_multiplicity, materialize_generic_type,
    materialize_multiplicity, metaclass, set_computed_type, typed_value, GraphHierarchy,
};
pub use unload::{disposition, unbind, walk, Disposition, UnloadOutcome, WalkResult};
