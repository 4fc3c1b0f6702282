//! A small `###Diagram` grammar used to exercise extension plumbing.
//!
//! ```text
//! ###Diagram
//! Diagram model::Overview { model::Person, Firm }
//! ```
//!
//! A diagram names the types it shows. Processing resolves each name and
//! records a `modelElement` back-reference on the type, so removing a type
//! sends its diagrams back through processing.

use regex_lite::Regex;
use std::sync::Arc;
use weft_compiler::{
    add_generalization, register_kind, BuildContext, CompileError, CompileResult, Extension,
    KindHandler, ProcessContext, UnbindContext,
};
use weft_core::{m3, GraphResult, NodeId, Span};
use weft_graph::{BackReference, Graph, Origin};
use weft_parser::{ParseError, Section};
use weft_registry::{MatcherBuilder, RegistryResult};

pub const DIAGRAM: &str = "meta::pure::metamodel::diagram::Diagram";

/// Owned stubs naming the shown types.
pub const TYPE_REFERENCES: &str = "typeReferences";
/// The resolved types, set by processing.
pub const TYPES: &str = "types";

const DIAGRAM_PATTERN: &str = r"Diagram\s+([A-Za-z_][A-Za-z0-9_:]*)\s*\{([^}]*)\}";

#[derive(Debug, Default, Clone, Copy)]
pub struct DiagramExtension;

impl DiagramExtension {
    pub fn shared() -> Arc<dyn Extension> {
        Arc::new(Self)
    }
}

impl Extension for DiagramExtension {
    fn name(&self) -> &str {
        "Diagram"
    }

    fn required_extensions(&self) -> Vec<String> {
        vec!["Pure".to_string()]
    }

    fn register(&self, builder: &mut MatcherBuilder<dyn KindHandler>) -> RegistryResult<()> {
        register_kind(builder, DIAGRAM, Arc::new(DiagramHandler))
    }

    fn bootstrap(&self, graph: &mut Graph) -> GraphResult<()> {
        let class = graph.get_or_create_top_level(m3::CLASS)?;
        let diagram = graph.create_top_level(DIAGRAM, class, Origin::Bootstrap, None)?;
        let (package, name) = m3::split_path(DIAGRAM);
        graph.set_literal(diagram, m3::prop::NAME, name)?;
        let package = graph.get_or_create_package(package.unwrap_or(m3::ROOT))?;
        graph.add_to_package(diagram, package)?;
        let element = graph.get_or_create_top_level(m3::ELEMENT)?;
        add_generalization(graph, diagram, element)?;
        Ok(())
    }

    fn parse(&self, section: &Section<'_>, cx: &mut BuildContext<'_>) -> CompileResult<Vec<NodeId>> {
        let re = Regex::new(DIAGRAM_PATTERN)
            .map_err(|e| CompileError::internal(format!("diagram pattern: {}", e)))?;
        let text = section.text;
        let mut elements = Vec::new();
        let mut cursor = 0;

        for caps in re.captures_iter(text) {
            let (Some(all), Some(path), Some(body)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            expect_blank(section, cursor, all.start())
                .map_err(|e| CompileError::parse(cx.source_id(), e))?;
            cursor = all.end();

            let diagram = cx.create_element(path.as_str(), DIAGRAM, span_at(section, all.start(), all.end()))?;
            let mut offset = body.start();
            for name in body.as_str().split(',') {
                let trimmed = name.trim();
                if !trimmed.is_empty() {
                    let start = offset + (name.len() - name.trim_start().len());
                    let span = span_at(section, start, start + trimmed.len());
                    let stub = cx.stub(trimmed, &[], span)?;
                    cx.graph.add_child(diagram, TYPE_REFERENCES, stub)?;
                }
                offset += name.len() + 1;
            }
            elements.push(diagram);
        }
        expect_blank(section, cursor, text.len()).map_err(|e| CompileError::parse(cx.source_id(), e))?;
        Ok(elements)
    }
}

/// Span of `text[start..end]` within the unit.
fn span_at(section: &Section<'_>, start: usize, end: usize) -> Span {
    let before = &section.text[..start];
    let line = section.line + before.matches('\n').count();
    let column = match before.rfind('\n') {
        Some(newline) => start - newline,
        None => start + 1,
    };
    Span::new(section.offset + start, section.offset + end, line, column)
}

fn expect_blank(section: &Section<'_>, start: usize, end: usize) -> Result<(), ParseError> {
    let gap = &section.text[start..end];
    match gap.find(|c: char| !c.is_whitespace()) {
        Some(at) => Err(ParseError::new(
            "expected a Diagram definition",
            span_at(section, start + at, start + at + 1),
        )),
        None => Ok(()),
    }
}

struct DiagramHandler;

impl KindHandler for DiagramHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        let stubs = cx.graph.values(node, TYPE_REFERENCES).to_vec();
        for stub in stubs {
            cx.process(stub)?;
            let Some(target) = cx.graph.value(stub, m3::prop::RESOLVED_NODE) else {
                continue;
            };
            if cx.graph.values(node, TYPES).contains(&target) {
                continue;
            }
            cx.graph.add_value(node, TYPES, target)?;
            cx.graph
                .add_back_reference(target, BackReference::ModelElement { element: node })?;
        }
        Ok(())
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        let targets = cx.graph.values(node, TYPES).to_vec();
        for target in targets {
            cx.forget(target, &BackReference::ModelElement { element: node })?;
        }
        Ok(())
    }

    fn derived_properties(&self) -> &'static [&'static str] {
        &[TYPES]
    }

    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        if graph.values(node, TYPE_REFERENCES).is_empty() {
            return Err(CompileError::shape(
                format!("Diagram '{}' shows no types", graph.path_of(node)),
                graph.node(node).and_then(|n| n.source.clone()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(text: &str) -> Section<'_> {
        Section {
            name: "Diagram".to_string(),
            text,
            offset: 10,
            line: 2,
            header: Span::new(0, 10, 1, 1),
        }
    }

    // ========== TEST: span_at ==========

    #[test]
    fn test_span_at_counts_lines_from_section_start() {
        // GIVEN
        let s = section("\nDiagram D { A }");

        // WHEN
        let span = span_at(&s, 1, 8);

        // THEN
        assert_eq!((span.start, span.line, span.column), (11, 3, 1));
    }

    #[test]
    fn test_expect_blank_points_at_stray_text() {
        let s = section("  junk");

        let err = expect_blank(&s, 0, s.text.len()).unwrap_err();

        assert_eq!((err.line(), err.column()), (2, 3));
    }
}
