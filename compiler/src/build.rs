//! The build stage: turning parsed sections into graph fragments.

use crate::context::Context;
use crate::typing::metaclass;
use crate::{CompileError, CompileResult};
use weft_core::{m3, GraphError, NodeId, SourceInfo, Span};
use weft_graph::{Graph, Origin};

/// What a grammar extension sees while building one section.
pub struct BuildContext<'a> {
    pub graph: &'a mut Graph,
    pub context: &'a Context,
    source_id: &'a str,
}

impl<'a> BuildContext<'a> {
    pub fn new(graph: &'a mut Graph, context: &'a Context, source_id: &'a str) -> Self {
        Self {
            graph,
            context,
            source_id,
        }
    }

    /// The unit being built.
    pub fn source_id(&self) -> &str {
        self.source_id
    }

    pub fn origin(&self) -> Origin {
        Origin::Source(self.source_id.to_string())
    }

    pub fn source_info(&self, span: Span) -> SourceInfo {
        SourceInfo::new(self.source_id, span)
    }

    /// Bind a top-level element of kind `classifier` at `path`, name it and
    /// link it into its package.
    pub fn create_element(&mut self, path: &str, classifier: &str, span: Span) -> CompileResult<NodeId> {
        let classifier = metaclass(self.graph, classifier)?;
        let origin = self.origin();
        let info = self.source_info(span);
        let element = self
            .graph
            .create_top_level(path, classifier, origin, Some(info.clone()))
            .map_err(|e| match e {
                GraphError::NamingConflict { .. } | GraphError::DuplicateDefinition { .. } => {
                    CompileError::naming_conflict(e.to_string(), Some(info.clone()))
                }
                GraphError::InvalidPath(path) => {
                    CompileError::shape(format!("'{}' is not a valid element path", path), Some(info.clone()))
                }
                other => CompileError::Graph(other),
            })?;

        let (package, name) = m3::split_path(path);
        self.graph.set_literal(element, m3::prop::NAME, name)?;
        let package = self
            .graph
            .get_or_create_package(package.unwrap_or(m3::ROOT))
            .map_err(|e| CompileError::naming_conflict(e.to_string(), Some(info)))?;
        self.graph.add_to_package(element, package)?;
        Ok(element)
    }

    /// Create an anonymous node of kind `classifier` built from this unit.
    pub fn create_node(&mut self, classifier: &str, span: Option<Span>) -> CompileResult<NodeId> {
        let classifier = metaclass(self.graph, classifier)?;
        let origin = self.origin();
        let info = span.map(|s| self.source_info(s));
        Ok(self.graph.create_anonymous(classifier, origin, info))
    }

    /// An unresolved reference to `id_or_path`, looked up later against
    /// the enclosing package and `imports`.
    pub fn stub(&mut self, id_or_path: &str, imports: &[String], span: Span) -> CompileResult<NodeId> {
        let stub = self.create_node(m3::IMPORT_STUB, Some(span))?;
        self.graph.set_literal(stub, m3::prop::ID_OR_PATH, id_or_path)?;
        for import in imports {
            self.graph.add_literal(stub, m3::prop::SCOPE, import.as_str())?;
        }
        Ok(stub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_metamodel;

    fn graph() -> Graph {
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();
        graph
    }

    // ========== TEST: create_element ==========

    #[test]
    fn test_create_element_links_package() {
        // GIVEN
        let mut graph = graph();
        let context = Context::new();
        let mut cx = BuildContext::new(&mut graph, &context, "a.pure");

        // WHEN
        let person = cx.create_element("model::Person", m3::CLASS, Span::new(0, 5, 1, 1)).unwrap();

        // THEN
        let package = graph.value(person, m3::prop::PACKAGE).unwrap();
        assert_eq!(graph.path_of(package), "model");
        assert_eq!(graph.string_value(person, m3::prop::NAME), Some("Person"));
        assert_eq!(graph.node(person).unwrap().origin, Origin::Source("a.pure".into()));
    }

    #[test]
    fn test_redefinition_is_naming_conflict_at_span() {
        // GIVEN
        let mut graph = graph();
        let context = Context::new();
        BuildContext::new(&mut graph, &context, "a.pure")
            .create_element("A", m3::CLASS, Span::new(0, 1, 1, 1))
            .unwrap();

        // WHEN
        let err = BuildContext::new(&mut graph, &context, "b.pure")
            .create_element("A", m3::ASSOCIATION, Span::new(10, 11, 3, 7))
            .unwrap_err();

        // THEN
        assert!(matches!(err, CompileError::NamingConflict { .. }));
        let info = err.source_info().unwrap();
        assert_eq!((info.source.as_str(), info.line(), info.column()), ("b.pure", 3, 7));
    }

    #[test]
    fn test_stub_keeps_name_and_scope() {
        let mut graph = graph();
        let context = Context::new();
        let mut cx = BuildContext::new(&mut graph, &context, "a.pure");

        let stub = cx
            .stub("Person", &["model".to_string()], Span::new(3, 9, 1, 4))
            .unwrap();

        assert_eq!(graph.string_value(stub, m3::prop::ID_OR_PATH), Some("Person"));
        assert_eq!(graph.values(stub, m3::prop::SCOPE).len(), 1);
        assert!(graph.value(stub, m3::prop::RESOLVED_NODE).is_none());
    }
}
