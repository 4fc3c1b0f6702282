//! Incremental unload: walk, then unbind.
//!
//! The walk computes every top-level element whose derived state depends on
//! the units being removed, without touching the graph. Unbind then runs
//! each kind's unbinder over the whole visited set before any node is reset
//! or detached, so forward edges are still readable while their
//! back-references are removed.

use crate::context::Context;
use crate::handler::UnbindContext;
use crate::{CompileResult, KindHandler};
use indexmap::IndexSet;
use std::collections::VecDeque;
use tracing::{debug, trace};
use weft_core::{m3, NodeId};
use weft_graph::{CompileState, Graph, Node, Origin};
use weft_registry::{Matcher, Role};

/// What unload does with a node it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Delete the node and everything it owns.
    Detach,
    /// Keep the node, drop what processing derived on it.
    Reset,
    /// Never touched by unload.
    Retain,
}

/// The single place deciding between detaching and resetting.
///
/// A node goes away when its existence comes from a unit being removed or
/// from processing; bootstrap, literal and placeholder nodes stay; nodes of
/// surviving units are reset.
pub fn disposition(node: &Node, removed: &IndexSet<String>) -> Disposition {
    match &node.origin {
        Origin::Source(unit) if removed.contains(unit) => Disposition::Detach,
        Origin::Generated => Disposition::Detach,
        Origin::Bootstrap | Origin::Literal | Origin::Placeholder => Disposition::Retain,
        Origin::Source(_) => Disposition::Reset,
    }
}

/// Top-level elements reached by a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkResult {
    /// Every element reached, in discovery order.
    pub visited: Vec<NodeId>,
    /// Elements that will be deleted.
    pub to_detach: Vec<NodeId>,
    /// Surviving elements that will be reset and must be processed again.
    pub to_reprocess: Vec<NodeId>,
}

impl WalkResult {
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Summary of an unbind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnloadOutcome {
    /// Nodes deleted, including owned descendants.
    pub detached: usize,
    /// Elements left unprocessed.
    pub reset: Vec<NodeId>,
}

/// Discover every element depending on the units in `removed`, plus the
/// elements in `extra_roots` and their dependents.
pub fn walk(
    graph: &Graph,
    matcher: &Matcher<dyn KindHandler>,
    removed: &IndexSet<String>,
    extra_roots: &[NodeId],
) -> WalkResult {
    let mut queue: VecDeque<NodeId> = graph
        .top_levels()
        .filter(|(_, id)| {
            graph
                .node(*id)
                .and_then(|n| n.origin.source_unit())
                .is_some_and(|unit| removed.contains(unit))
        })
        .map(|(_, id)| id)
        .collect();
    queue.extend(extra_roots.iter().copied());

    let mut visited = IndexSet::new();
    while let Some(top) = queue.pop_front() {
        let Some(node) = graph.node(top) else {
            continue;
        };
        if disposition(node, removed) == Disposition::Retain
            || graph.is_instance_of(top, m3::PACKAGE)
            || !visited.insert(top)
        {
            continue;
        }
        for member in graph.owned_subtree(top) {
            let dependents = match matcher.dispatch(graph, member, Role::Walker) {
                Some(handler) => handler.walk(graph, member),
                None => graph.back_references(member).map(|r| r.source()).collect(),
            };
            for dependent in dependents {
                if let Some(owner) = graph.top_level_owner(dependent) {
                    if !visited.contains(&owner) {
                        trace!(from = %top, to = %owner, "walk");
                        queue.push_back(owner);
                    }
                }
            }
        }
    }

    let mut result = WalkResult::default();
    for top in visited {
        match graph.node(top).map(|n| disposition(n, removed)) {
            Some(Disposition::Detach) => result.to_detach.push(top),
            Some(Disposition::Reset) => result.to_reprocess.push(top),
            _ => {}
        }
        result.visited.push(top);
    }
    debug!(
        visited = result.visited.len(),
        detach = result.to_detach.len(),
        reprocess = result.to_reprocess.len(),
        "walk done"
    );
    result
}

/// Undo processing for everything `walked` reached, reset survivors and
/// detach the rest.
pub fn unbind(
    graph: &mut Graph,
    context: &mut Context,
    matcher: &Matcher<dyn KindHandler>,
    walked: &WalkResult,
    strict: bool,
) -> CompileResult<UnloadOutcome> {
    // Every unbinder sees the graph exactly as processing left it.
    let mut unbound = 0;
    for top in &walked.visited {
        for node in graph.owned_subtree(*top) {
            if let Some(handler) = matcher.dispatch(graph, node, Role::Unbinder).cloned() {
                handler.unbind(node, &mut UnbindContext::new(graph, strict))?;
                unbound += 1;
            }
        }
    }

    for top in &walked.to_reprocess {
        reset(graph, matcher, *top)?;
    }

    let mut detached = 0;
    for top in &walked.to_detach {
        if !graph.contains(*top) {
            continue;
        }
        let package = graph.value(*top, m3::prop::PACKAGE);
        context.remove(*top);
        detached += graph.detach_subtree(*top)?.len();
        if let Some(package) = package {
            graph.try_remove_package(package)?;
        }
    }

    debug!(
        unbound,
        reset = walked.to_reprocess.len(),
        detached,
        "unbind done"
    );
    Ok(UnloadOutcome {
        detached,
        reset: walked.to_reprocess.clone(),
    })
}

/// Return `top` and its owned nodes to their built form.
fn reset(graph: &mut Graph, matcher: &Matcher<dyn KindHandler>, top: NodeId) -> CompileResult<()> {
    for node in graph.owned_subtree(top) {
        if !graph.contains(node) {
            continue;
        }
        let generated: Vec<NodeId> = graph
            .owned_children(node)
            .into_iter()
            .filter(|c| graph.node(*c).is_some_and(|n| n.origin == Origin::Generated))
            .collect();
        for child in generated {
            graph.detach_subtree(child)?;
        }
        if let Some(handler) = matcher.dispatch(graph, node, Role::Unbinder).cloned() {
            for property in handler.derived_properties() {
                graph.remove_property(node, property)?;
            }
        }
        graph.require_mut(node)?.state = CompileState::empty();
    }
    trace!(node = %top, "reset");
    Ok(())
}
