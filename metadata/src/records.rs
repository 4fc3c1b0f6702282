//! The records carried in an envelope, and how they are read off a graph.

use serde::{Deserialize, Serialize};
use weft_core::NodeId;
use weft_graph::Graph;

pub const MANIFEST_KIND: &str = "meta::pure::metadata::ModuleManifest";
pub const SOURCE_KIND: &str = "meta::pure::metadata::SourceMetadata";
pub const BACK_REFERENCES_KIND: &str = "meta::pure::metadata::BackReferenceTable";

/// Version written for every record kind in this crate.
pub const RECORD_VERSION: u32 = 1;

// ==================== Module manifest ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestElement {
    pub path: String,
    pub classifier: String,
    pub source: String,
}

/// The elements a module defines, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub module: String,
    pub elements: Vec<ManifestElement>,
}

impl ModuleManifest {
    /// Every top-level element built from a source unit.
    pub fn from_graph(graph: &Graph, module: impl Into<String>) -> Self {
        let mut elements: Vec<ManifestElement> = graph
            .top_levels()
            .filter_map(|(path, id)| {
                let source = graph.node(id)?.origin.source_unit()?.to_string();
                Some(ManifestElement {
                    path: path.to_string(),
                    classifier: graph.classifier_path(id),
                    source,
                })
            })
            .collect();
        elements.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            module: module.into(),
            elements,
        }
    }

    pub fn element(&self, path: &str) -> Option<&ManifestElement> {
        self.elements.iter().find(|e| e.path == path)
    }

    /// Paths defined by `source`, in path order.
    pub fn elements_of(&self, source: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|e| e.source == source)
            .map(|e| e.path.as_str())
            .collect()
    }
}

// ==================== Source metadata ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMetadata {
    pub name: String,
    pub elements: Vec<String>,
}

/// The elements one source unit defines, in the order its sections
/// define them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source_id: String,
    pub sections: Vec<SectionMetadata>,
}

impl SourceMetadata {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, name: impl Into<String>, elements: Vec<String>) {
        self.sections.push(SectionMetadata {
            name: name.into(),
            elements,
        });
    }

    pub fn element_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.elements.iter().map(String::as_str))
    }
}

// ==================== Back-reference table ====================

/// One inbound pointer, named by the element holding it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackReferenceRecord {
    pub kind: String,
    /// Top-level path of the element holding the forward pointer.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackReferenceEntry {
    pub element: String,
    pub references: Vec<BackReferenceRecord>,
}

/// Back-references grouped by the top-level element they land in.
///
/// References landing on members of an element (enum values, properties)
/// are listed under the element. Elements without inbound references are
/// left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackReferenceTable {
    pub entries: Vec<BackReferenceEntry>,
}

impl BackReferenceTable {
    pub fn from_graph(graph: &Graph) -> Self {
        let mut paths: Vec<(&str, NodeId)> = graph.top_levels().collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        let mut entries = Vec::new();
        for (path, id) in paths {
            let mut references: Vec<BackReferenceRecord> = graph
                .owned_subtree(id)
                .into_iter()
                .flat_map(|member| graph.back_references(member))
                .map(|r| BackReferenceRecord {
                    kind: r.kind().to_string(),
                    source: graph
                        .top_level_owner(r.source())
                        .map(|owner| graph.path_of(owner))
                        .unwrap_or_else(|| "<detached>".to_string()),
                })
                .collect();
            if references.is_empty() {
                continue;
            }
            references.sort();
            entries.push(BackReferenceEntry {
                element: path.to_string(),
                references,
            });
        }
        Self { entries }
    }

    pub fn references(&self, element: &str) -> &[BackReferenceRecord] {
        self.entries
            .iter()
            .find(|e| e.element == element)
            .map(|e| e.references.as_slice())
            .unwrap_or(&[])
    }

    /// Elements some record in the table names as a source.
    pub fn referring_elements(&self, element: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .references(element)
            .iter()
            .map(|r| r.source.as_str())
            .collect();
        sources.dedup();
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decoded, Envelope};
    use pretty_assertions::assert_eq;
    use weft_graph::{BackReference, Origin};

    fn sample_graph() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let class = graph
            .get_or_create_top_level("Class")
            .unwrap();
        let person = graph
            .create_top_level("model::Person", class, Origin::Source("a.pure".into()), None)
            .unwrap();
        let firm = graph
            .create_top_level("model::Firm", class, Origin::Source("b.pure".into()), None)
            .unwrap();
        (graph, person, firm)
    }

    // ========== TEST: manifest lists source elements only ==========
    #[test]
    fn test_manifest_from_graph() {
        // GIVEN
        let (graph, _, _) = sample_graph();

        // WHEN
        let manifest = ModuleManifest::from_graph(&graph, "main");

        // THEN
        assert_eq!(
            manifest.elements,
            vec![
                ManifestElement {
                    path: "model::Firm".into(),
                    classifier: "Class".into(),
                    source: "b.pure".into(),
                },
                ManifestElement {
                    path: "model::Person".into(),
                    classifier: "Class".into(),
                    source: "a.pure".into(),
                },
            ]
        );
        assert_eq!(manifest.elements_of("a.pure"), vec!["model::Person"]);
    }

    // ========== TEST: back-references grouped by element ==========
    #[test]
    fn test_back_reference_table_names_source_elements() {
        // GIVEN
        let (mut graph, person, firm) = sample_graph();
        graph
            .add_back_reference(person, BackReference::usage(firm, "employees", 0))
            .unwrap();

        // WHEN
        let table = BackReferenceTable::from_graph(&graph);

        // THEN
        assert_eq!(table.entries.len(), 1);
        assert_eq!(
            table.references("model::Person"),
            &[BackReferenceRecord {
                kind: "referenceUsage".into(),
                source: "model::Firm".into(),
            }]
        );
        assert_eq!(table.referring_elements("model::Person"), vec!["model::Firm"]);
        assert!(table.references("model::Firm").is_empty());
    }

    // ========== TEST: records survive the envelope ==========
    #[test]
    fn test_records_through_envelope() {
        let (graph, _, _) = sample_graph();
        let manifest = ModuleManifest::from_graph(&graph, "main");
        let mut source = SourceMetadata::new("a.pure");
        source.add_section("Pure", vec!["model::Person".into()]);

        let mut envelope = Envelope::new();
        envelope.add(MANIFEST_KIND, RECORD_VERSION, &manifest).unwrap();
        envelope.add(SOURCE_KIND, RECORD_VERSION, &source).unwrap();
        let bytes = envelope.to_bytes().unwrap();
        let decoded = Envelope::from_bytes(&bytes).unwrap();

        let manifests: Vec<Decoded<ModuleManifest>> = decoded.read(MANIFEST_KIND, RECORD_VERSION).unwrap();
        let sources: Vec<Decoded<SourceMetadata>> = decoded.read(SOURCE_KIND, RECORD_VERSION).unwrap();
        assert_eq!(manifests, vec![Decoded::Value(manifest)]);
        assert_eq!(sources[0].clone().value().unwrap().element_paths().collect::<Vec<_>>(), vec!["model::Person"]);
    }
}
