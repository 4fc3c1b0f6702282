//! Compiling with nothing changed does nothing.

use pretty_assertions::assert_eq;
use weft_tests::prelude::*;

const MODEL: &str = "\
Class model::Person { name: String[1]; }
Class model::Employee extends Person { badge: Integer[1]; }
Class model::Firm { legalName: String[1]; }
native function model::describe(p: Person[1]): String[1];
";

const LOGIC: &str = "\
Association model::Employment { employer: Firm[0..1]; employees: Employee[*]; }
function model::label(e: Employee[1]): String[1] { describe($e) }
function model::nameOf(e: Employee[1]): String[1] { $e.name }
";

mod recompile {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("recompile")
            .add("model.pure", MODEL)
            .add("logic.pure", LOGIC)
            .step("compile", |a| a.succeeds().built(7).snapshot("compiled"))
            .step("again", |a| a.succeeds().noop().matches_snapshot("compiled"))
            .add("logic.pure", LOGIC)
            .step("replace_leaf", |a| {
                a.succeeds().reprocessed(0).matches_snapshot("compiled")
            })
            .add("model.pure", MODEL)
            .step("replace_base", |a| {
                a.succeeds().reprocessed(3).matches_snapshot("compiled")
            })
            .step("settled", |a| a.succeeds().noop())
    }

    #[test]
    fn test_recompiling_unchanged_units() {
        // GIVEN: a model split across two units

        // WHEN: compile runs again with nothing pending, then each unit is
        // replaced by identical text

        // THEN: the graph never changes, and replacing the base reprocesses
        // exactly the elements built on it
        scenario().run().unwrap();
    }
}

#[test]
fn test_noop_compile_mutates_nothing() {
    // GIVEN
    let mut session = Session::new().unwrap();
    session.add_or_replace("model.pure", MODEL);
    session.add_or_replace("logic.pure", LOGIC);
    session.compile().unwrap();
    let before = session.serialize();
    let nodes = session.graph().node_count();

    // WHEN
    let report = session.compile().unwrap();

    // THEN
    assert!(report.is_noop());
    assert!(!session.has_pending_changes());
    assert_eq!(session.graph().node_count(), nodes);
    assert_eq!(session.serialize(), before);
}
