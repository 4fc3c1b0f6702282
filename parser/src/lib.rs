//! Weft Parser
//!
//! This crate turns model source text into syntax trees:
//! - Section splitting on `###Name` headers
//! - Element parsing (Class, Association, Enum, function, native function)
//! - Types (generic, function, relation) and multiplicities
//! - Expressions (literals, variables, applications, property access)
//! - Error handling with location information
//!
//! Building graph fragments from the trees is the job of the grammar
//! extension that owns the section.

mod ast;
mod error;
mod lexer;
mod parser;
mod section;

pub use ast::*;
pub use error::*;
pub use parser::{parse_expr, parse_section, parse_section_at, parse_type, Parser};
pub use section::{split_sections, Section, DEFAULT_SECTION};
