//! Splitting a source unit into `###Name` sections.

use crate::{ParseError, ParseResult};
use regex_lite::Regex;
use weft_core::Span;

/// Section name used for text before the first header.
pub const DEFAULT_SECTION: &str = "Pure";

/// A contiguous slice of a source unit handled by one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: String,
    pub text: &'a str,
    /// Byte offset of `text` in the unit.
    pub offset: usize,
    /// Line of the first character of `text`.
    pub line: usize,
    /// Span of the header line, or an empty span at the start for the default section.
    pub header: Span,
}

const HEADER_PATTERN: &str = r"(?m)^###([A-Za-z][A-Za-z0-9_]*)[ \t]*\r?$";

/// Split `text` on `###Name` header lines.
///
/// Text before the first header forms a `Pure` section; it is omitted when it
/// holds nothing but whitespace and a header follows.
pub fn split_sections(text: &str) -> ParseResult<Vec<Section<'_>>> {
    let header_pattern = Regex::new(HEADER_PATTERN).map_err(|e| {
        ParseError::new(format!("invalid section header pattern: {}", e), Span::default())
    })?;
    let mut sections = Vec::new();
    let mut name = DEFAULT_SECTION.to_string();
    let mut header = Span::new(0, 0, 1, 1);
    let mut body_start = 0;

    for captures in header_pattern.captures_iter(text) {
        let (Some(whole), Some(section_name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let body = &text[body_start..whole.start()];
        if !(sections.is_empty() && body_start == 0 && body.trim().is_empty()) {
            sections.push(Section {
                name: name.clone(),
                text: body,
                offset: body_start,
                line: line_of(text, body_start),
                header,
            });
        }
        name = section_name.as_str().to_string();
        header = Span::new(
            whole.start(),
            whole.end(),
            line_of(text, whole.start()),
            1,
        );
        body_start = whole.end();
    }

    sections.push(Section {
        name,
        text: &text[body_start..],
        offset: body_start,
        line: line_of(text, body_start),
        header,
    });
    Ok(sections)
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
