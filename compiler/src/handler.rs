//! The per-kind handler interface.

use crate::process::ProcessContext;
use crate::{CompileError, CompileResult};
use std::sync::Arc;
use tracing::warn;
use weft_core::NodeId;
use weft_graph::{BackReference, Graph};
use weft_registry::{MatcherBuilder, RegistryResult, Role};

/// Handlers for one node kind, one method per role.
///
/// Every method has a default, so a kind only implements the roles it cares
/// about. Kinds without a processor have their owned children processed.
pub trait KindHandler: Send + Sync {
    /// Roles this handler is registered for.
    fn roles(&self) -> &'static [Role] {
        &Role::ALL
    }

    /// Resolve references and compute derived state for `node`.
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_children(node)
    }

    /// Nodes whose derived state depends on `node`.
    fn walk(&self, graph: &Graph, node: NodeId) -> Vec<NodeId> {
        graph.back_references(node).map(|r| r.source()).collect()
    }

    /// Remove what processing `node` contributed to other nodes.
    fn unbind(&self, _node: NodeId, _cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        Ok(())
    }

    /// Properties processing sets on the node itself that hold plain
    /// references; cleared when the node is reset.
    fn derived_properties(&self) -> &'static [&'static str] {
        &[]
    }

    /// Read-only checks after processing.
    fn validate(&self, _graph: &Graph, _node: NodeId) -> CompileResult<()> {
        Ok(())
    }
}

/// Register `handler` for each of its roles under `path`.
pub fn register_kind(
    builder: &mut MatcherBuilder<dyn KindHandler>,
    path: &str,
    handler: Arc<dyn KindHandler>,
) -> RegistryResult<()> {
    let roles = handler.roles();
    builder.register_roles(path, roles, handler)?;
    Ok(())
}

/// What an unbinder sees.
pub struct UnbindContext<'a> {
    pub graph: &'a mut Graph,
    strict: bool,
}

impl<'a> UnbindContext<'a> {
    pub fn new(graph: &'a mut Graph, strict: bool) -> Self {
        Self { graph, strict }
    }

    /// Remove `value` from `target.property` together with the back-reference
    /// recorded for it.
    ///
    /// A missing target is a no-op. A live target missing the back-reference
    /// is an inconsistency, fatal in strict mode.
    pub fn unlink(
        &mut self,
        target: NodeId,
        property: &str,
        value: NodeId,
        back_reference: &BackReference,
    ) -> CompileResult<()> {
        if !self.graph.contains(target) {
            warn!(node = %target, property, "unlink target already gone");
            return Ok(());
        }
        if self.graph.remove_value(target, property, value)? {
            self.forget(target, back_reference)?;
        }
        Ok(())
    }

    /// Remove a back-reference recorded on `target`.
    pub fn forget(&mut self, target: NodeId, back_reference: &BackReference) -> CompileResult<()> {
        if !self.graph.contains(target) {
            warn!(node = %target, kind = back_reference.kind(), "back-reference target already gone");
            return Ok(());
        }
        if self.graph.remove_back_reference(target, back_reference) {
            return Ok(());
        }
        if self.strict {
            return Err(CompileError::internal(format!(
                "{} has no {} back-reference from {}",
                self.graph.path_of(target),
                back_reference.kind(),
                back_reference.source()
            )));
        }
        warn!(node = %target, kind = back_reference.kind(), "missing back-reference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::m3;
    use weft_graph::Origin;

    /// A class `A` referenced from a property of `B`, with the
    /// back-reference recorded on `A`.
    fn linked() -> (Graph, NodeId, BackReference) {
        let mut graph = Graph::new();
        let class = graph.get_or_create_top_level(m3::CLASS).unwrap();
        let a = graph
            .create_top_level("A", class, Origin::Source("a.pure".into()), None)
            .unwrap();
        let b = graph
            .create_top_level("B", class, Origin::Source("b.pure".into()), None)
            .unwrap();
        let holder = graph.create_anonymous(class, Origin::Source("b.pure".into()), None);
        graph.add_child(b, m3::prop::PROPERTIES, holder).unwrap();
        graph.add_value(holder, m3::prop::RAW_TYPE, a).unwrap();
        let reference = BackReference::usage(holder, m3::prop::RAW_TYPE, 0);
        graph.add_back_reference(a, reference.clone()).unwrap();
        (graph, a, reference)
    }

    // ========== TEST: forget ==========

    #[test]
    fn test_forget_removes_recorded_back_reference() {
        // GIVEN
        let (mut graph, a, reference) = linked();

        // WHEN
        UnbindContext::new(&mut graph, true).forget(a, &reference).unwrap();

        // THEN
        assert_eq!(graph.back_references(a).count(), 0);
    }

    #[test]
    fn test_forget_on_gone_target_is_noop() {
        // GIVEN: the target was detached before its dependents unbind
        let (mut graph, a, reference) = linked();
        graph.delete_node(a).unwrap();

        // WHEN
        let result = UnbindContext::new(&mut graph, true).forget(a, &reference);

        // THEN
        assert!(result.is_ok());
    }

    #[test]
    fn test_forget_missing_back_reference_is_fatal_when_strict() {
        // GIVEN: a live target whose back-reference is already gone
        let (mut graph, a, reference) = linked();
        graph.remove_back_reference(a, &reference);

        // WHEN
        let result = UnbindContext::new(&mut graph, true).forget(a, &reference);

        // THEN
        match result {
            Err(CompileError::InternalConsistency(message)) => {
                assert!(message.contains("has no referenceUsage back-reference"), "{}", message);
            }
            other => panic!("expected an internal consistency error, got {:?}", other),
        }
    }

    #[test]
    fn test_forget_missing_back_reference_warns_when_lenient() {
        let (mut graph, a, reference) = linked();
        graph.remove_back_reference(a, &reference);

        let result = UnbindContext::new(&mut graph, false).forget(a, &reference);

        assert!(result.is_ok());
    }

    // ========== TEST: unlink ==========

    /// `A` exposes a property contributed by an association.
    fn contributed() -> (Graph, NodeId, NodeId, BackReference) {
        let mut graph = Graph::new();
        let class = graph.get_or_create_top_level(m3::CLASS).unwrap();
        let property_class = graph.get_or_create_top_level(m3::PROPERTY).unwrap();
        let a = graph
            .create_top_level("A", class, Origin::Source("a.pure".into()), None)
            .unwrap();
        let property = graph.create_anonymous(property_class, Origin::Source("assoc.pure".into()), None);
        graph
            .add_value(a, m3::prop::PROPERTIES_FROM_ASSOCIATIONS, property)
            .unwrap();
        let reference = BackReference::PropertyFromAssociation { property };
        graph.add_back_reference(a, reference.clone()).unwrap();
        (graph, a, property, reference)
    }

    #[test]
    fn test_unlink_removes_value_and_back_reference() {
        // GIVEN
        let (mut graph, a, property, reference) = contributed();

        // WHEN
        UnbindContext::new(&mut graph, true)
            .unlink(a, m3::prop::PROPERTIES_FROM_ASSOCIATIONS, property, &reference)
            .unwrap();

        // THEN
        assert!(graph.values(a, m3::prop::PROPERTIES_FROM_ASSOCIATIONS).is_empty());
        assert_eq!(graph.back_references(a).count(), 0);
    }

    #[test]
    fn test_unlink_on_gone_target_is_noop() {
        let (mut graph, a, property, reference) = contributed();
        graph.delete_node(a).unwrap();

        let result = UnbindContext::new(&mut graph, true).unlink(
            a,
            m3::prop::PROPERTIES_FROM_ASSOCIATIONS,
            property,
            &reference,
        );

        assert!(result.is_ok());
    }
}
