//! Weft Metadata
//!
//! Persisted compile metadata:
//! - `ModuleManifest`: the elements a module defines
//! - `SourceMetadata`: the elements each source unit defines, per section
//! - `BackReferenceTable`: who points at each element
//!
//! Records travel in a versioned envelope. Readers decode the payloads whose
//! version they support and report the rest as skipped.

mod envelope;
mod error;
mod records;

pub use envelope::*;
pub use error::{MetadataError, MetadataResult};
pub use records::*;
