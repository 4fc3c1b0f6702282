//! The pipeline driver.

use crate::bootstrap::bootstrap_metamodel;
use crate::build::BuildContext;
use crate::context::Context;
use crate::extension::Extension;
use crate::process::{process_all, validate_all, ProcessContext, ProcessorState};
use crate::unload::{unbind, walk, UnloadOutcome, WalkResult};
use crate::{CompileError, CompileResult, KindHandler};
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::debug;
use weft_core::NodeId;
use weft_graph::Graph;
use weft_parser::{split_sections, ParseError};
use weft_registry::{Matcher, MatcherBuilder};
use weft_types::MatchPolicy;

/// The top-level elements one section of a unit defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltSection {
    pub name: String,
    pub elements: Vec<NodeId>,
}

/// Runs build, process, validate and unload with a fixed set of
/// extensions.
///
/// The compiler holds no graph state; every stage takes the graph and
/// context it works on.
pub struct Compiler {
    extensions: Vec<Arc<dyn Extension>>,
    matcher: Matcher<dyn KindHandler>,
}

impl Compiler {
    /// Register the handlers of every extension. Duplicate extension names,
    /// duplicate `(kind, role)` registrations and missing prerequisites are
    /// rejected.
    pub fn new(extensions: Vec<Arc<dyn Extension>>) -> CompileResult<Self> {
        let mut names = IndexSet::new();
        let mut builder = MatcherBuilder::new();
        for extension in &extensions {
            if !names.insert(extension.name().to_string()) {
                return Err(CompileError::naming_conflict(
                    format!("The extension '{}' is registered twice", extension.name()),
                    None,
                ));
            }
            extension.register(&mut builder)?;
        }
        for extension in &extensions {
            for required in extension.required_extensions() {
                if !names.contains(&required) {
                    return Err(CompileError::missing(
                        format!(
                            "The extension '{}' requires the extension '{}'",
                            extension.name(),
                            required
                        ),
                        None,
                    ));
                }
            }
        }
        let matcher = builder.build();
        debug!(
            extensions = extensions.len(),
            kinds = matcher.registered_kinds().len(),
            "compiler ready"
        );
        Ok(Self {
            extensions,
            matcher,
        })
    }

    pub fn matcher(&self) -> &Matcher<dyn KindHandler> {
        &self.matcher
    }

    pub fn extension(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.extensions.iter().find(|e| e.name() == name)
    }

    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    /// Bootstrap the metamodel, then let each extension add its kinds.
    pub fn bootstrap(&self, graph: &mut Graph) -> CompileResult<()> {
        bootstrap_metamodel(graph)?;
        for extension in &self.extensions {
            extension.bootstrap(graph)?;
        }
        Ok(())
    }

    /// Build one unit and index its elements. Returns the top-level
    /// elements built by each section, in section order.
    pub fn build_unit(
        &self,
        graph: &mut Graph,
        context: &mut Context,
        source_id: &str,
        text: &str,
    ) -> CompileResult<Vec<BuiltSection>> {
        let sections = split_sections(text).map_err(|e| CompileError::parse(source_id, e))?;
        let mut built = Vec::with_capacity(sections.len());
        for section in &sections {
            let extension = self.extension(&section.name).ok_or_else(|| {
                CompileError::parse(
                    source_id,
                    ParseError::unknown_section(section.header, &section.name),
                )
            })?;
            let mut cx = BuildContext::new(graph, context, source_id);
            let elements = extension.parse(section, &mut cx)?;
            built.push(BuiltSection {
                name: section.name.clone(),
                elements,
            });
        }
        let mut count = 0;
        for element in built.iter().flat_map(|s| &s.elements) {
            context.register(graph, *element);
            count += 1;
        }
        debug!(source = source_id, sections = built.len(), elements = count, "build done");
        Ok(built)
    }

    /// Process `roots` to a fixed point.
    pub fn process(
        &self,
        graph: &mut Graph,
        context: &mut Context,
        state: &mut ProcessorState,
        roots: &[NodeId],
        policy: MatchPolicy,
        max_rounds: usize,
    ) -> CompileResult<()> {
        let mut cx = ProcessContext::new(graph, context, state, &self.matcher, policy);
        process_all(&mut cx, roots, max_rounds)
    }

    /// Validate the subtrees of `roots`.
    pub fn validate(&self, graph: &mut Graph, roots: &[NodeId]) -> CompileResult<usize> {
        validate_all(graph, &self.matcher, roots)
    }

    /// Walk from the units in `removed` and from `extra_roots`, then unbind
    /// everything reached.
    pub fn unload(
        &self,
        graph: &mut Graph,
        context: &mut Context,
        removed: &IndexSet<String>,
        extra_roots: &[NodeId],
        strict: bool,
    ) -> CompileResult<(WalkResult, UnloadOutcome)> {
        let walked = walk(graph, &self.matcher, removed, extra_roots);
        let outcome = unbind(graph, context, &self.matcher, &walked, strict)?;
        Ok((walked, outcome))
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("extensions", &self.extension_names())
            .field("kinds", &self.matcher.registered_kinds())
            .finish()
    }
}
