//! Deleting a unit other units depend on.

use weft_tests::prelude::*;

const B: &str = "Class B\n{\n  a: A[1];\n}";

mod delete_dependency {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("delete_dependency")
            .add("a.pure", "Class A {}")
            .add("b.pure", B)
            .step("compile", |a| a.succeeds().defines("A").defines("B"))
            .delete("a.pure")
            .step("delete_a", |a| {
                a.error("A has not been defined!")
                    .error_at("b.pure", 3)
                    .error_column(6)
                    .lacks("A")
            })
            .add("b.pure", B)
            .step("recompile_b", |a| {
                a.error("A has not been defined!").error_at("b.pure", 3).error_column(6)
            })
            .add("a.pure", "Class A {}")
            .step("restore_a", |a| a.succeeds().defines("A").defines("B"))
            .step("settled", |a| a.succeeds().noop())
    }

    #[test]
    fn test_dangling_reference_reports_origin() {
        // GIVEN: B refers to A from another unit

        // WHEN: A's unit is deleted, and B is recompiled unchanged

        // THEN: both compiles fail at the span naming A, and adding A back
        // settles the session
        init_tracing();
        scenario().run().unwrap();
    }
}

mod delete_dependent {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("delete_dependent")
            .add("a.pure", "Class A {}")
            .step("compile_a", |a| a.succeeds().snapshot("a_only"))
            .add("b.pure", B)
            .step("compile_b", |a| a.succeeds().defines("B"))
            .delete("b.pure")
            .step("delete_b", |a| a.succeeds().lacks("B").matches_snapshot("a_only"))
    }

    #[test]
    fn test_deleting_dependent_leaves_dependency_intact() {
        // GIVEN: B refers to A

        // WHEN: B's unit is deleted

        // THEN: A carries no trace of B
        scenario().run().unwrap();
    }
}

mod failed_batch {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("failed_batch")
            .add("a.pure", "Class A {}")
            .step("compile_a", |a| a.succeeds().snapshot("good"))
            .add("bad.pure", "Class Bad\n{\n  a: A[1];\n  m: Missing[1];\n}")
            .step("compile_bad", |a| {
                a.error_matching(r"^Missing has not been defined!$")
                    .error_at("bad.pure", 4)
                    .lacks("Bad")
                    .matches_snapshot("good")
            })
            .step("retry_bad", |a| a.error("Missing has not been defined!"))
            .delete("bad.pure")
            .step("drop_bad", |a| a.succeeds().noop().matches_snapshot("good"))
    }

    #[test]
    fn test_failed_batch_rolls_back_and_stays_pending() {
        // GIVEN: a compiled unit

        // WHEN: a unit that references it and a missing class fails to compile

        // THEN: the graph is unchanged, the change stays pending until it
        // is withdrawn
        scenario().run().unwrap();
    }
}
