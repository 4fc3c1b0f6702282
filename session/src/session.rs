//! Session manager.

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use weft_compiler::{
    BuiltSection, CompileError, CompileResult, Compiler, Context, CoreExtension, Extension,
    ProcessorState,
};
use weft_core::NodeId;
use weft_graph::Graph;
use weft_metadata::{
    BackReferenceTable, Envelope, ModuleManifest, SourceMetadata, BACK_REFERENCES_KIND,
    MANIFEST_KIND, RECORD_VERSION, SOURCE_KIND,
};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

/// A change waiting for the next compile.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    AddOrReplace(String),
    Delete,
}

/// What one compile did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Units built in this batch.
    pub built_units: usize,
    /// Top-level elements built.
    pub built_elements: usize,
    /// Nodes deleted by unload.
    pub detached: usize,
    /// Surviving elements reset and processed again.
    pub reprocessed: usize,
    /// Nodes processed.
    pub processed: usize,
    /// Nodes validated.
    pub validated: usize,
}

impl CompileReport {
    /// True when compile had nothing to do.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// A compile session over a set of source units.
pub struct Session {
    config: SessionConfig,
    compiler: Compiler,
    graph: Graph,
    context: Context,
    /// Compiled units: id -> text.
    sources: IndexMap<String, String>,
    /// Elements built per compiled unit, per section.
    source_metadata: IndexMap<String, SourceMetadata>,
    pending: IndexMap<String, Change>,
    /// Elements reset by a rolled-back batch that still need processing.
    dirty: IndexSet<NodeId>,
}

impl Session {
    /// Create a session with the core grammar and the default configuration.
    pub fn new() -> SessionResult<Self> {
        Self::with_config(SessionConfig::default())
    }

    /// Create a session with the core grammar only.
    pub fn with_config(config: SessionConfig) -> SessionResult<Self> {
        Self::with_extensions(config, Vec::new())
    }

    /// Create a session with the core grammar plus the supplied extensions
    /// the configuration enables.
    pub fn with_extensions(
        config: SessionConfig,
        available: Vec<Arc<dyn Extension>>,
    ) -> SessionResult<Self> {
        let mut extensions: Vec<Arc<dyn Extension>> = vec![Arc::new(CoreExtension::new())];
        for name in &config.extensions {
            let extension = available
                .iter()
                .find(|e| e.name() == name.as_str())
                .ok_or_else(|| SessionError::missing_extension(name.as_str()))?;
            extensions.push(Arc::clone(extension));
        }
        for extension in &extensions {
            for required in extension.required_extensions() {
                if !extensions.iter().any(|e| e.name() == required) {
                    return Err(SessionError::missing_extension(required));
                }
            }
        }

        let compiler = Compiler::new(extensions)?;
        let mut graph = Graph::new();
        compiler.bootstrap(&mut graph)?;
        info!(
            extensions = ?compiler.extension_names(),
            nodes = graph.node_count(),
            "session ready"
        );
        Ok(Self {
            config,
            compiler,
            graph,
            context: Context::new(),
            sources: IndexMap::new(),
            source_metadata: IndexMap::new(),
            pending: IndexMap::new(),
            dirty: IndexSet::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    // ==================== Source units ====================

    /// Queue `text` as the new content of `source_id`.
    pub fn add_or_replace(&mut self, source_id: impl Into<String>, text: impl Into<String>) {
        self.pending
            .insert(source_id.into(), Change::AddOrReplace(text.into()));
    }

    /// Queue the removal of `source_id`.
    pub fn delete(&mut self, source_id: &str) -> SessionResult<()> {
        if self.sources.contains_key(source_id) {
            self.pending.insert(source_id.to_string(), Change::Delete);
            return Ok(());
        }
        match self.pending.get(source_id) {
            Some(Change::AddOrReplace(_)) => {
                self.pending.shift_remove(source_id);
                Ok(())
            }
            _ => Err(SessionError::unknown_source(source_id)),
        }
    }

    /// Text of a compiled unit.
    pub fn source(&self, source_id: &str) -> Option<&str> {
        self.sources.get(source_id).map(String::as_str)
    }

    /// Ids of compiled units, in compile order.
    pub fn source_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.sources.keys().map(String::as_str)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn source_metadata(&self, source_id: &str) -> Option<&SourceMetadata> {
        self.source_metadata.get(source_id)
    }

    // ==================== Compile ====================

    /// Apply every pending change.
    ///
    /// On failure the graph is rolled back to a consistent state without
    /// the units built in this batch, the changes stay pending and the
    /// error is returned.
    pub fn compile(&mut self) -> SessionResult<CompileReport> {
        if self.pending.is_empty() && self.dirty.is_empty() {
            debug!("nothing to compile");
            return Ok(CompileReport::default());
        }

        let removed: IndexSet<String> = self
            .pending
            .keys()
            .filter(|id| self.sources.contains_key(*id))
            .cloned()
            .collect();
        let (walked, outcome) = self.compiler.unload(
            &mut self.graph,
            &mut self.context,
            &removed,
            &[],
            self.config.strict_unbind,
        )?;
        for id in &removed {
            self.sources.shift_remove(id);
            self.source_metadata.shift_remove(id);
        }
        self.dirty.extend(outcome.reset.iter().copied());

        let to_build: Vec<(String, String)> = self
            .pending
            .iter()
            .filter_map(|(id, change)| match change {
                Change::AddOrReplace(text) => Some((id.clone(), text.clone())),
                Change::Delete => None,
            })
            .collect();

        let mut state = ProcessorState::new();
        let mut report = CompileReport {
            built_units: to_build.len(),
            detached: outcome.detached,
            reprocessed: walked.to_reprocess.len(),
            ..CompileReport::default()
        };
        match self.run_batch(&to_build, &mut state, &mut report) {
            Ok(metadata) => {
                for ((id, text), metadata) in to_build.into_iter().zip(metadata) {
                    self.source_metadata.insert(id.clone(), metadata);
                    self.sources.insert(id, text);
                }
                self.pending.clear();
                self.dirty.clear();
                info!(
                    units = report.built_units,
                    elements = report.built_elements,
                    processed = report.processed,
                    "compile done"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "compile failed, rolling back");
                let built: IndexSet<String> = to_build.into_iter().map(|(id, _)| id).collect();
                self.rollback(&built, &state)?;
                Err(err.into())
            }
        }
    }

    /// Build, process and validate one batch.
    fn run_batch(
        &mut self,
        to_build: &[(String, String)],
        state: &mut ProcessorState,
        report: &mut CompileReport,
    ) -> CompileResult<Vec<SourceMetadata>> {
        let mut roots: Vec<NodeId> = Vec::new();
        let mut metadata = Vec::with_capacity(to_build.len());
        for (id, text) in to_build {
            let sections = self
                .compiler
                .build_unit(&mut self.graph, &mut self.context, id, text)?;
            metadata.push(self.describe(id, &sections));
            roots.extend(sections.into_iter().flat_map(|s| s.elements));
        }
        report.built_elements = roots.len();
        roots.extend(self.dirty.iter().copied().filter(|id| self.graph.contains(*id)));

        self.compiler.process(
            &mut self.graph,
            &mut self.context,
            state,
            &roots,
            self.config.match_policy(),
            self.config.max_process_rounds,
        )?;
        report.processed = state.processed().len();

        if self.config.validate {
            report.validated = self.compiler.validate(&mut self.graph, &roots)?;
        }
        Ok(metadata)
    }

    fn describe(&self, source_id: &str, sections: &[BuiltSection]) -> SourceMetadata {
        let mut metadata = SourceMetadata::new(source_id);
        for section in sections {
            let paths = section
                .elements
                .iter()
                .map(|e| self.graph.path_of(*e))
                .collect();
            metadata.add_section(section.name.as_str(), paths);
        }
        metadata
    }

    /// Unbind everything processed in the failed batch and detach what it
    /// built. Survivors it touched stay dirty for the next compile.
    fn rollback(&mut self, built: &IndexSet<String>, state: &ProcessorState) -> CompileResult<()> {
        let touched = state.touched();
        let (walked, outcome) = self.compiler.unload(
            &mut self.graph,
            &mut self.context,
            built,
            &touched,
            self.config.strict_unbind,
        )?;
        self.dirty.extend(outcome.reset.iter().copied());
        self.dirty.retain(|id| self.graph.contains(*id));
        debug!(
            visited = walked.visited.len(),
            detached = outcome.detached,
            dirty = self.dirty.len(),
            "rollback done"
        );
        Ok(())
    }

    // ==================== Output ====================

    /// Canonical text form of the graph.
    pub fn serialize(&self) -> String {
        weft_graph::serialize(&self.graph)
    }

    /// Byte length of the canonical form.
    pub fn graph_size(&self) -> usize {
        weft_graph::serialized_size(&self.graph)
    }

    pub fn module_manifest(&self) -> ModuleManifest {
        ModuleManifest::from_graph(&self.graph, self.config.module_name.as_str())
    }

    pub fn back_reference_table(&self) -> BackReferenceTable {
        BackReferenceTable::from_graph(&self.graph)
    }

    /// Manifest, per-unit metadata and back-reference table in one envelope.
    pub fn export_metadata(&self) -> SessionResult<Vec<u8>> {
        let mut envelope = Envelope::new();
        envelope.add(MANIFEST_KIND, RECORD_VERSION, &self.module_manifest())?;
        for metadata in self.source_metadata.values() {
            envelope.add(SOURCE_KIND, RECORD_VERSION, metadata)?;
        }
        envelope.add(BACK_REFERENCES_KIND, RECORD_VERSION, &self.back_reference_table())?;
        Ok(envelope.to_bytes()?)
    }

    /// The compile error behind a failed compile, if any.
    pub fn compile_error(result: &SessionResult<CompileReport>) -> Option<&CompileError> {
        result.as_ref().err().and_then(SessionError::as_compile_error)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("nodes", &self.graph.node_count())
            .finish()
    }
}
