//! Compiling, deleting and recompiling the same text leaves no residue.

use weft_tests::prelude::*;

const MODEL: &str = "\
Class model::Person { name: String[1]; age: Integer[0..1]; }
Class model::Employee extends Person { badge: Integer[1]; }
Class model::Firm { legalName: String[1]; }
Enum model::Level { JUNIOR, SENIOR }
native function model::describe(p: Person[1]): String[1];
";

const LOGIC: &str = "\
Association model::Employment { employer: Firm[0..1]; employees: Employee[*]; }
function model::label(e: Employee[1]): String[1] { describe($e) }
function model::nameOf(e: Employee[1]): String[1] { $e.name }
";

const CYCLES: usize = 10;

#[test]
fn test_single_unit_round_trip() {
    // GIVEN: one unit holding the whole model
    init_tracing();
    let whole = format!("{}{}", MODEL, LOGIC);
    let mut scenario = Scenario::new("single_unit_round_trip")
        .add("model.pure", whole.as_str())
        .step("initial", |a| a.succeeds().snapshot("compiled"));

    // WHEN: it is deleted and recompiled repeatedly
    for cycle in 0..CYCLES {
        scenario = scenario
            .delete("model.pure")
            .step(format!("delete_{}", cycle), |a| {
                a.succeeds().lacks("model::Person").lacks("model")
            })
            .add("model.pure", whole.as_str())
            // THEN: every recompile produces the same graph
            .step(format!("recompile_{}", cycle), |a| a.succeeds().matches_snapshot("compiled"));
    }

    scenario.run().unwrap();
}

#[test]
fn test_dependent_unit_round_trip() {
    // GIVEN: a model and a unit building on it
    let mut scenario = Scenario::new("dependent_unit_round_trip")
        .add("model.pure", MODEL)
        .step("model", |a| a.succeeds().snapshot("model_only"))
        .add("logic.pure", LOGIC)
        .step("logic", |a| {
            a.succeeds()
                .has_property("model::Firm", "employees")
                .has_property("model::Employee", "employer")
                .snapshot("full")
        });

    // WHEN: the dependent unit is deleted and recompiled repeatedly
    for cycle in 0..CYCLES {
        scenario = scenario
            .delete("logic.pure")
            // THEN: the model returns to its standalone form each time
            .step(format!("delete_{}", cycle), |a| {
                a.succeeds()
                    .lacks_property("model::Firm", "employees")
                    .matches_snapshot("model_only")
            })
            .add("logic.pure", LOGIC)
            .step(format!("recompile_{}", cycle), |a| a.succeeds().matches_snapshot("full"));
    }

    scenario.run().unwrap();
}

#[test]
fn test_graph_size_is_stable() {
    // GIVEN
    let mut session = Session::new().unwrap();
    session.add_or_replace("model.pure", MODEL);
    session.add_or_replace("logic.pure", LOGIC);
    session.compile().unwrap();
    let size = session.graph_size();

    // WHEN
    for _ in 0..CYCLES {
        session.delete("model.pure").unwrap();
        session.delete("logic.pure").unwrap();
        session.compile().unwrap();
        session.add_or_replace("model.pure", MODEL);
        session.add_or_replace("logic.pure", LOGIC);
        session.compile().unwrap();

        // THEN
        assert_eq!(session.graph_size(), size);
    }
}
