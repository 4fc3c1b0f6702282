//! Validators reject malformed elements after processing.

use weft_tests::prelude::*;

#[test]
fn test_association_arity() {
    // GIVEN: an association with a single property
    let scenario = Scenario::new("association_arity")
        .add("a.pure", "Class A {}")
        .add("x.pure", "\nAssociation X { a: A[1]; }")
        // THEN: validation names the association at its declaration
        .step("compile", |a| {
            a.error("Expected 2 properties for association 'X', found 1")
                .error_at("x.pure", 2)
                .lacks("X")
        });

    scenario.run().unwrap();
}

#[test]
fn test_validation_can_be_disabled() {
    // GIVEN: a session that skips the validate stage
    let scenario = Scenario::new("no_validation")
        .config(SessionConfig::minimal())
        .add("a.pure", "Class A {}\nAssociation X { a: A[1]; }")
        // THEN: the arity problem goes unreported
        .step("compile", |a| a.succeeds().defines("X"));

    scenario.run().unwrap();
}

#[test]
fn test_circular_generalization() {
    let scenario = Scenario::new("circular_generalization")
        .add("a.pure", "Class A extends B {}")
        .add("b.pure", "Class B extends A {}")
        .step("compile", |a| a.error_matching(r"^Class '[AB]' is involved in a circular generalization$"));

    scenario.run().unwrap();
}

#[test]
fn test_qualified_property_return_type() {
    let scenario = Scenario::new("qualified_property")
        .add("a.pure", "Class A { name: String[1]; size() { $this.name }: Integer[1]; }")
        .step("compile", |a| {
            a.error("Return type error in qualified property 'size'; found: String[1]; expected: Integer[1]")
        })
        .add("a.pure", "Class A { name: String[1]; label() { $this.name }: String[1]; }")
        .step("fixed", |a| a.succeeds().defines("A"));

    scenario.run().unwrap();
}

#[test]
fn test_redefinition_is_a_naming_conflict() {
    let scenario = Scenario::new("naming_conflict")
        .add("a.pure", "Class model::A {}")
        .step("compile_a", |a| a.succeeds().snapshot("a"))
        .add("b.pure", "Class model::B {}\n\nClass model::A {}")
        .step("redefine", |a| a.error_at("b.pure", 3).matches_snapshot("a"));

    scenario.run().unwrap();
}

#[test]
fn test_unknown_section() {
    let scenario = Scenario::new("unknown_section")
        .add("a.pure", "Class A {}\n###Mapping\nwhatever")
        .step("compile", |a| a.error("unknown section '###Mapping'").error_at("a.pure", 2));

    scenario.run().unwrap();
}
