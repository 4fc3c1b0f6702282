//! Exported metadata describes the compiled module.

use pretty_assertions::assert_eq;
use weft_core::m3;
use weft_metadata::{
    BackReferenceTable, Decoded, Envelope, ModuleManifest, Payload, SourceMetadata,
    BACK_REFERENCES_KIND, MANIFEST_KIND, RECORD_VERSION, SOURCE_KIND,
};
use weft_tests::prelude::*;

fn compiled() -> Session {
    Scenario::new("metadata")
        .config(SessionConfig::new().with_module_name("hr"))
        .add("person.pure", "Class model::Person { name: String[1]; }")
        .add("firm.pure", "Class model::Firm { boss: model::Person[1]; }\nEnum model::Size { SMALL, LARGE }")
        .step("compile", |a| a.succeeds())
        .run()
        .unwrap()
}

#[test]
fn test_exported_manifest() {
    // GIVEN
    let session = compiled();

    // WHEN
    let bytes = session.export_metadata().unwrap();
    let envelope = Envelope::from_bytes(&bytes).unwrap();
    let manifests: Vec<Decoded<ModuleManifest>> = envelope.read(MANIFEST_KIND, RECORD_VERSION).unwrap();

    // THEN
    let manifest = manifests.into_iter().next().and_then(Decoded::value).unwrap();
    assert_eq!(manifest.module, "hr");
    assert_eq!(manifest.elements_of("firm.pure"), vec!["model::Firm", "model::Size"]);
    assert_eq!(manifest.elements_of("person.pure"), vec!["model::Person"]);
    assert_eq!(manifest.element("model::Size").unwrap().classifier, m3::ENUMERATION);
    assert!(manifest.element("model").is_none());
}

#[test]
fn test_exported_sources_and_back_references() {
    let session = compiled();

    let bytes = session.export_metadata().unwrap();
    let envelope = Envelope::from_bytes(&bytes).unwrap();
    let sources: Vec<SourceMetadata> = envelope
        .read(SOURCE_KIND, RECORD_VERSION)
        .unwrap()
        .into_iter()
        .filter_map(Decoded::value)
        .collect();
    let table: BackReferenceTable = envelope
        .read(BACK_REFERENCES_KIND, RECORD_VERSION)
        .unwrap()
        .into_iter()
        .find_map(Decoded::value)
        .unwrap();

    assert_eq!(sources.len(), 2);
    let firm = sources.iter().find(|s| s.source_id == "firm.pure").unwrap();
    assert_eq!(firm.element_paths().collect::<Vec<_>>(), vec!["model::Firm", "model::Size"]);
    assert_eq!(table, session.back_reference_table());
    assert!(table.referring_elements("model::Person").contains(&"model::Firm"));
}

#[test]
fn test_metadata_follows_deletes() {
    // GIVEN: the table before firm.pure existed
    let baseline = Scenario::new("baseline")
        .config(SessionConfig::new().with_module_name("hr"))
        .add("person.pure", "Class model::Person { name: String[1]; }")
        .step("compile", |a| a.succeeds())
        .run()
        .unwrap()
        .back_reference_table();
    let mut session = compiled();
    assert!(session
        .back_reference_table()
        .referring_elements("model::Person")
        .contains(&"model::Firm"));

    // WHEN
    session.delete("firm.pure").unwrap();
    session.compile().unwrap();

    // THEN
    let manifest = session.module_manifest();
    assert_eq!(manifest.elements_of("firm.pure"), Vec::<&str>::new());
    assert!(session.source_metadata("firm.pure").is_none());
    let table = session.back_reference_table();
    assert!(!table.referring_elements("model::Person").contains(&"model::Firm"));
    assert_eq!(table, baseline);
}

#[test]
fn test_newer_payloads_are_skipped() {
    // GIVEN: an export with a manifest written by a newer version appended
    let session = compiled();
    let mut envelope = Envelope::from_bytes(&session.export_metadata().unwrap()).unwrap();
    envelope.push(Payload {
        kind: MANIFEST_KIND.to_string(),
        version: RECORD_VERSION + 1,
        bytes: vec![0xff, 0x00, 0x13],
    });
    let bytes = envelope.to_bytes().unwrap();

    // WHEN
    let manifests: Vec<Decoded<ModuleManifest>> = Envelope::from_bytes(&bytes)
        .unwrap()
        .read(MANIFEST_KIND, RECORD_VERSION)
        .unwrap();

    // THEN
    assert_eq!(manifests.len(), 2);
    assert!(matches!(manifests[0], Decoded::Value(_)));
    assert_eq!(
        manifests[1],
        Decoded::Skipped {
            kind: MANIFEST_KIND.to_string(),
            version: RECORD_VERSION + 1,
        }
    );
}
