//! Source locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range plus the line/column of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Smallest span covering both `self` and `other`, anchored at `self`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end.max(self.end), self.line, self.column)
    }
}

/// A span inside a named source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source: String,
    pub span: Span,
}

impl SourceInfo {
    pub fn new(source: impl Into<String>, span: Span) -> Self {
        Self {
            source: source.into(),
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line:{} column:{}",
            self.source, self.span.line, self.span.column
        )
    }
}
