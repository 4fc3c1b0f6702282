//! Grammar extensions.

use crate::build::BuildContext;
use crate::handler::KindHandler;
use crate::CompileResult;
use weft_core::{GraphResult, NodeId};
use weft_graph::Graph;
use weft_parser::Section;
use weft_registry::{MatcherBuilder, RegistryResult};

/// A grammar that owns `###Name` sections and the node kinds it builds.
pub trait Extension: Send + Sync {
    /// Section name this extension parses.
    fn name(&self) -> &str;

    /// Extensions that must be present for this one to work.
    fn required_extensions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Register handlers for the kinds this extension introduces.
    fn register(&self, builder: &mut MatcherBuilder<dyn KindHandler>) -> RegistryResult<()>;

    /// Add the metaclasses this extension needs to a bootstrapped graph.
    fn bootstrap(&self, _graph: &mut Graph) -> GraphResult<()> {
        Ok(())
    }

    /// Build one section, returning the top-level elements created.
    fn parse(&self, section: &Section<'_>, cx: &mut BuildContext<'_>) -> CompileResult<Vec<NodeId>>;
}
