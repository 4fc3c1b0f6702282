//! Grammar extensions plug new kinds into every pipeline stage.

use std::sync::Arc;
use weft_compiler::{BuildContext, CompileResult, Extension, KindHandler};
use weft_core::NodeId;
use weft_parser::Section;
use weft_registry::{MatcherBuilder, RegistryResult};
use weft_tests::diagram::TYPES;
use weft_tests::prelude::*;

const MODEL: &str = "Class model::Person {}\nClass model::Firm {}";
const VIEWS: &str = "###Diagram\nDiagram views::Overview { model::Person, model::Firm }";

fn shown_by(session: &Session, element: &str, diagram: &str) -> bool {
    session
        .back_reference_table()
        .references(element)
        .iter()
        .any(|r| r.kind == "modelElement" && r.source == diagram)
}

fn shown_types(session: &Session, diagram: &str) -> usize {
    let graph = session.graph();
    graph
        .top_level(diagram)
        .map_or(0, |d| graph.values(d, TYPES).len())
}

mod diagram_lifecycle {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("diagram_lifecycle")
            .extension(DiagramExtension::shared())
            .add("model.pure", MODEL)
            .step("model", |a| a.succeeds().snapshot("model_only"))
            .add("views.pure", VIEWS)
            .step("views", |a| {
                a.succeeds()
                    .defines("views::Overview")
                    .custom(|s| shown_by(s, "model::Person", "views::Overview"))
                    .custom(|s| shown_types(s, "views::Overview") == 2)
            })
            .delete("model.pure")
            .step("delete_model", |a| {
                a.error("model::Person has not been defined!")
                    .error_at("views.pure", 2)
                    .error_column(27)
            })
            .add("model.pure", MODEL)
            .step("restore_model", |a| {
                a.succeeds()
                    .custom(|s| shown_by(s, "model::Firm", "views::Overview"))
            })
            .add("views.pure", "###Diagram\nDiagram views::Overview { model::Firm }")
            .step("narrow_view", |a| {
                a.succeeds()
                    .reprocessed(0)
                    .custom(|s| !shown_by(s, "model::Person", "views::Overview"))
                    .custom(|s| shown_types(s, "views::Overview") == 1)
            })
            .delete("views.pure")
            .step("delete_views", |a| {
                a.succeeds().lacks("views::Overview").lacks("views").matches_snapshot("model_only")
            })
    }

    #[test]
    fn test_diagram_follows_the_types_it_shows() {
        // GIVEN: a diagram showing two classes from another unit

        // WHEN: the classes go away and come back, and the diagram changes

        // THEN: the diagram's back-references track each edit, and deleting
        // it leaves the model as it was
        init_tracing();
        scenario().run().unwrap();
    }
}

#[test]
fn test_mixed_sections_in_one_unit() {
    let scenario = Scenario::new("mixed_sections")
        .extension(DiagramExtension::shared())
        .add(
            "all.pure",
            "Class model::Person {}\n###Diagram\nDiagram views::People { model::Person }\n###Pure\nClass model::Firm {}",
        )
        .step("compile", |a| {
            a.succeeds()
                .built(3)
                .defines("model::Person")
                .defines("views::People")
                .defines("model::Firm")
                .custom(|s| {
                    s.source_metadata("all.pure").is_some_and(|m| {
                        m.sections.iter().map(|sec| sec.name.as_str()).collect::<Vec<_>>()
                            == vec!["Pure", "Diagram", "Pure"]
                    })
                })
        });

    scenario.run().unwrap();
}

#[test]
fn test_empty_diagram_is_rejected() {
    let scenario = Scenario::new("empty_diagram")
        .extension(DiagramExtension::shared())
        .add("views.pure", "###Diagram\n\nDiagram views::Empty { }")
        .step("compile", |a| {
            a.error("Diagram 'views::Empty' shows no types").error_at("views.pure", 3)
        });

    scenario.run().unwrap();
}

#[test]
fn test_section_without_extension_is_a_parse_error() {
    let scenario = Scenario::new("no_extension")
        .add("views.pure", VIEWS)
        .step("compile", |a| a.error("unknown section '###Diagram'").error_at("views.pure", 1));

    scenario.run().unwrap();
}

#[test]
fn test_enabled_extension_must_be_supplied() {
    let result = Scenario::new("unsupplied")
        .config(SessionConfig::new().with_extension("Diagram"))
        .run();

    assert!(matches!(
        result,
        Err(ScenarioError::Session(SessionError::MissingExtension { ref name })) if name == "Diagram"
    ));
}

/// Adds nothing of its own; only present to require `Diagram`.
struct AnnotationExtension;

impl Extension for AnnotationExtension {
    fn name(&self) -> &str {
        "Annotation"
    }

    fn required_extensions(&self) -> Vec<String> {
        vec!["Diagram".to_string()]
    }

    fn register(&self, _builder: &mut MatcherBuilder<dyn KindHandler>) -> RegistryResult<()> {
        Ok(())
    }

    fn parse(&self, _section: &Section<'_>, _cx: &mut BuildContext<'_>) -> CompileResult<Vec<NodeId>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_missing_prerequisite_extension() {
    // GIVEN: an extension requiring Diagram, enabled without it
    let result = Scenario::new("missing_prerequisite")
        .extension(Arc::new(AnnotationExtension))
        .run();

    // THEN
    assert!(matches!(
        result,
        Err(ScenarioError::Session(SessionError::MissingExtension { ref name })) if name == "Diagram"
    ));

    // WHEN: the prerequisite is enabled too
    let session = Scenario::new("with_prerequisite")
        .extension(DiagramExtension::shared())
        .extension(Arc::new(AnnotationExtension))
        .run()
        .unwrap();

    // THEN
    assert_eq!(session.compiler().extension_names(), vec!["Pure", "Diagram", "Annotation"]);
}
