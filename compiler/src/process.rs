//! The process and validate stages.
//!
//! Processing dispatches each node to the processor registered for its kind.
//! Processors recurse into the nodes they depend on through
//! [`ProcessContext::process`], which guarantees each node is processed at
//! most once per batch and rejects re-entry into a node still in progress.
//! Work a processor defers is enqueued and handled in the next round, until
//! a round enqueues nothing.

use crate::context::Context;
use crate::typing::GraphHierarchy;
use crate::{CompileError, CompileResult, KindHandler};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};
use weft_core::{m3, NodeId, SourceInfo};
use weft_graph::{CompileState, Graph, Origin};
use weft_registry::{Matcher, Role};
use weft_types::{Argument, GenericType, MatchPolicy, RawType, TypeHierarchy};

/// Per-batch processing bookkeeping.
#[derive(Debug, Default)]
pub struct ProcessorState {
    in_progress: IndexSet<NodeId>,
    processed: Vec<NodeId>,
    touched: IndexSet<NodeId>,
    queue: VecDeque<NodeId>,
    scopes: Vec<IndexMap<String, Argument>>,
}

impl ProcessorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes processed in this batch, in completion order.
    pub fn processed(&self) -> &[NodeId] {
        &self.processed
    }

    /// Top-level owners of every node processing entered, including nodes
    /// whose processing failed.
    pub fn touched(&self) -> Vec<NodeId> {
        self.touched.iter().copied().collect()
    }

    pub fn is_in_progress(&self, node: NodeId) -> bool {
        self.in_progress.contains(&node)
    }

    fn take_queue(&mut self) -> Vec<NodeId> {
        self.queue.drain(..).collect()
    }

    // ==================== Variable scopes ====================

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a variable in the innermost scope.
    pub fn declare(&mut self, name: impl Into<String>, value: Argument) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Innermost declaration of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Argument> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

/// What a processor sees.
pub struct ProcessContext<'a> {
    pub graph: &'a mut Graph,
    pub context: &'a mut Context,
    pub state: &'a mut ProcessorState,
    matcher: &'a Matcher<dyn KindHandler>,
    policy: MatchPolicy,
}

impl<'a> ProcessContext<'a> {
    pub fn new(
        graph: &'a mut Graph,
        context: &'a mut Context,
        state: &'a mut ProcessorState,
        matcher: &'a Matcher<dyn KindHandler>,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            graph,
            context,
            state,
            matcher,
            policy,
        }
    }

    /// Policy used for overload resolution.
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn hierarchy(&self) -> CompileResult<GraphHierarchy<'_>> {
        GraphHierarchy::new(&*self.graph)
    }

    /// Process `node` unless it already is.
    pub fn process(&mut self, node: NodeId) -> CompileResult<()> {
        let current = self.graph.require(node)?;
        if current.is_processed() || matches!(current.origin, Origin::Bootstrap | Origin::Literal) {
            return Ok(());
        }
        if self.state.in_progress.contains(&node) {
            return Err(CompileError::internal(format!(
                "re-entered processing of {} ({})",
                self.graph.path_of(node),
                self.graph.classifier_path(node)
            )));
        }
        if let Some(top) = self.graph.top_level_owner(node) {
            self.state.touched.insert(top);
        }

        let matcher = self.matcher;
        let handler = matcher.dispatch(&*self.graph, node, Role::Processor).cloned();
        trace!(node = %node, kind = %self.graph.classifier_path(node), "process");

        self.state.in_progress.insert(node);
        let result = match handler {
            Some(handler) => handler.process(node, self),
            None => self.process_children(node),
        };
        self.state.in_progress.shift_remove(&node);
        result?;

        self.graph.require_mut(node)?.state.insert(CompileState::PROCESSED);
        self.state.processed.push(node);
        Ok(())
    }

    /// Process every node `node` owns, in property order.
    pub fn process_children(&mut self, node: NodeId) -> CompileResult<()> {
        for child in self.graph.owned_children(node) {
            self.process(child)?;
        }
        Ok(())
    }

    /// Process the owned values of one property.
    pub fn process_property(&mut self, node: NodeId, property: &str) -> CompileResult<()> {
        let values = self.graph.values(node, property).to_vec();
        for value in values {
            if self.is_owned_by(value, node) {
                self.process(value)?;
            }
        }
        Ok(())
    }

    fn is_owned_by(&self, value: NodeId, owner: NodeId) -> bool {
        self.graph
            .node(value)
            .and_then(|n| n.owner.as_ref())
            .is_some_and(|o| o.node == owner)
    }

    /// Defer `node` to the next round.
    pub fn enqueue(&mut self, node: NodeId) {
        if !self.state.queue.contains(&node) {
            self.state.queue.push_back(node);
        }
    }

    /// Make sure the supertypes of every nominal type in `generic` can be
    /// read, so the engine sees the full hierarchy.
    pub fn prepare_type(&mut self, generic: &GenericType) -> CompileResult<()> {
        let mut seen = HashSet::new();
        self.prepare_generic(generic, &mut seen)
    }

    fn prepare_generic(&mut self, generic: &GenericType, seen: &mut HashSet<NodeId>) -> CompileResult<()> {
        match &generic.raw {
            Some(RawType::Nominal(ty)) => self.prepare_nominal(*ty, seen)?,
            Some(RawType::Function(function)) => {
                for parameter in &function.parameters {
                    self.prepare_generic(&parameter.generic_type, seen)?;
                }
                self.prepare_generic(&function.return_type, seen)?;
            }
            Some(RawType::Relation(relation)) => {
                for column in &relation.columns {
                    self.prepare_generic(&column.generic_type, seen)?;
                }
            }
            None => {}
        }
        for argument in &generic.type_arguments {
            self.prepare_generic(argument, seen)?;
        }
        Ok(())
    }

    fn prepare_nominal(&mut self, ty: NodeId, seen: &mut HashSet<NodeId>) -> CompileResult<()> {
        if !seen.insert(ty) {
            return Ok(());
        }
        let generals: Vec<NodeId> = self
            .graph
            .values(ty, m3::prop::GENERALIZATIONS)
            .iter()
            .filter_map(|g| self.graph.value(*g, m3::prop::GENERAL))
            .collect();
        for general in &generals {
            self.process(*general)?;
        }
        let supertypes = self.hierarchy()?.generalizations(ty);
        for supertype in supertypes {
            self.prepare_generic(&supertype, seen)?;
        }
        Ok(())
    }

    /// Source location of `node`, or of its nearest owner that has one.
    pub fn source_info(&self, node: NodeId) -> Option<SourceInfo> {
        source_info(&*self.graph, node)
    }
}

/// Source location of `node`, or of its nearest owner that has one.
pub fn source_info(graph: &Graph, node: NodeId) -> Option<SourceInfo> {
    let mut current = node;
    loop {
        let n = graph.node(current)?;
        if let Some(info) = &n.source {
            return Some(info.clone());
        }
        current = n.owner.as_ref()?.node;
    }
}

/// Process `roots` and everything they enqueue.
pub fn process_all(cx: &mut ProcessContext<'_>, roots: &[NodeId], max_rounds: usize) -> CompileResult<()> {
    let mut round_nodes = roots.to_vec();
    let mut round = 0;
    while !round_nodes.is_empty() {
        round += 1;
        if round > max_rounds {
            return Err(CompileError::internal(format!(
                "processing did not settle after {} rounds",
                max_rounds
            )));
        }
        debug!(round, nodes = round_nodes.len(), "process round");
        for node in round_nodes {
            if cx.graph.contains(node) {
                cx.process(node)?;
            }
        }
        round_nodes = cx.state.take_queue();
    }
    debug!(processed = cx.state.processed().len(), rounds = round, "process done");
    Ok(())
}

/// Run validators over the subtrees of `roots`. Never mutates until every
/// check has passed; then marks the checked nodes validated.
pub fn validate_all(
    graph: &mut Graph,
    matcher: &Matcher<dyn KindHandler>,
    roots: &[NodeId],
) -> CompileResult<usize> {
    let mut checked = Vec::new();
    for root in roots {
        for node in graph.owned_subtree(*root) {
            if graph.node(node).map_or(true, |n| n.is_validated()) {
                continue;
            }
            if let Some(validator) = matcher.dispatch(graph, node, Role::Validator) {
                validator.validate(graph, node)?;
            }
            checked.push(node);
        }
    }
    for node in &checked {
        if let Some(n) = graph.node_mut(*node) {
            n.state.insert(CompileState::VALIDATED);
        }
    }
    debug!(validated = checked.len(), "validate done");
    Ok(checked.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weft_registry::MatcherBuilder;

    const KIND: &str = "test::Kind";

    /// Processes its node again from inside its own processor.
    struct Reentrant;

    impl KindHandler for Reentrant {
        fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
            cx.process(node)
        }
    }

    /// Defers a fresh node of its own kind every time it runs, until
    /// `limit` instances exist.
    struct Restless {
        limit: Option<usize>,
    }

    impl KindHandler for Restless {
        fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
            let kind = cx.graph.require(node)?.classifier.ok_or_else(|| CompileError::internal("no kind"))?;
            if self.limit.is_some_and(|limit| cx.graph.instances_of(kind).count() >= limit) {
                return Ok(());
            }
            let fresh = cx.graph.create_anonymous(kind, Origin::Source("a.pure".into()), None);
            cx.enqueue(fresh);
            Ok(())
        }
    }

    fn run(handler: Arc<dyn KindHandler>, max_rounds: usize) -> CompileResult<usize> {
        let mut graph = Graph::new();
        let kind = graph.get_or_create_top_level(KIND).unwrap();
        let node = graph.create_anonymous(kind, Origin::Source("a.pure".into()), None);

        let mut builder: MatcherBuilder<dyn KindHandler> = MatcherBuilder::new();
        builder.register(KIND, Role::Processor, handler).unwrap();
        let matcher = builder.build();
        let mut context = Context::new();
        let mut state = ProcessorState::new();
        let mut cx = ProcessContext::new(&mut graph, &mut context, &mut state, &matcher, MatchPolicy::default());
        process_all(&mut cx, &[node], max_rounds)?;
        Ok(state.processed().len())
    }

    // ========== TEST: process guards ==========

    #[test]
    fn test_reentry_is_an_error() {
        // GIVEN a processor that processes its own node
        // WHEN
        let err = run(Arc::new(Reentrant), 8).unwrap_err();

        // THEN
        assert!(matches!(err, CompileError::InternalConsistency(_)));
        assert!(err.message().contains("re-entered processing"), "{}", err);
    }

    #[test]
    fn test_round_cap_stops_runaway_enqueueing() {
        // GIVEN a processor that always defers more work
        // WHEN
        let err = run(Arc::new(Restless { limit: None }), 2).unwrap_err();

        // THEN
        assert!(err.message().contains("did not settle after 2 rounds"), "{}", err);
    }

    #[test]
    fn test_deferred_work_runs_in_later_rounds() {
        // GIVEN a processor that defers work until three instances exist
        // WHEN
        let processed = run(Arc::new(Restless { limit: Some(3) }), 8).unwrap();

        // THEN
        assert_eq!(processed, 3);
    }

    #[test]
    fn test_scopes_shadow_outer_declarations() {
        let mut state = ProcessorState::new();
        state.push_scope();
        state.declare("x", Argument::unknown());
        state.push_scope();
        let inner = Argument::new(GenericType::parameter("T"), weft_types::Multiplicity::PURE_ONE);
        state.declare("x", inner.clone());

        assert_eq!(state.lookup("x"), Some(&inner));
        state.pop_scope();
        assert_eq!(state.lookup("x"), Some(&Argument::unknown()));
        state.pop_scope();
        assert_eq!(state.lookup("x"), None);
    }
}
