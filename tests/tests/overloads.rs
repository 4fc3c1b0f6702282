//! Overload resolution across units, and how it follows edits.

use weft_core::m3;
use weft_tests::prelude::*;

const NATIVES: &str = "\
native function describe(x: String[1]): String[1];
native function describe(x: Integer[1]): String[1];
native function describe(x: Any[1]): String[1];
";

const SHOW: &str = "function show(): String[1] { describe(1) }";

/// Path of the function the body of `show` applies.
fn show_calls(session: &Session) -> Option<String> {
    let graph = session.graph();
    let show = graph.top_level("show__String_1_")?;
    let call = *graph.values(show, m3::prop::EXPRESSION_SEQUENCE).first()?;
    let target = graph.value(call, m3::prop::FUNC)?;
    Some(graph.path_of(target))
}

mod follows_edits {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("follows_edits")
            .add("natives.pure", NATIVES)
            .add("show.pure", SHOW)
            .step("exact_match", |a| {
                a.succeeds().custom(|s| {
                    show_calls(s).as_deref() == Some("describe_Integer_1__String_1_")
                })
            })
            .add(
                "natives.pure",
                "native function describe(x: String[1]): String[1];\n\
                 native function describe(x: Any[1]): String[1];",
            )
            .step("falls_back_to_supertype", |a| {
                a.succeeds().reprocessed(1).custom(|s| {
                    show_calls(s).as_deref() == Some("describe_Any_1__String_1_")
                })
            })
            .add("natives.pure", "native function describe(x: String[1]): String[1];")
            .step("no_candidate", |a| {
                a.error("The system can't find a match for the function: describe(_:Integer[1])")
                    .error_at("show.pure", 1)
            })
            .add("natives.pure", NATIVES)
            .step("restored", |a| {
                a.succeeds().custom(|s| {
                    show_calls(s).as_deref() == Some("describe_Integer_1__String_1_")
                })
            })
    }

    #[test]
    fn test_overload_choice_follows_edits() {
        // GIVEN: three overloads and a caller in another unit

        // WHEN: the overload set shrinks, disappears and comes back

        // THEN: the caller binds to the closest candidate each time, and
        // fails when none fits
        init_tracing();
        scenario().run().unwrap();
    }
}

#[test]
fn test_unknown_function() {
    let scenario = Scenario::new("unknown_function")
        .add("show.pure", SHOW)
        .step("compile", |a| {
            a.error("The system can't find a match for the function: describe(_:Integer[1])")
        });

    scenario.run().unwrap();
}

#[test]
fn test_generic_return_type_is_inferred() {
    let scenario = Scenario::new("generic_return")
        .add("first.pure", "native function first<T>(c: T[*]): T[0..1];")
        .add("use.pure", "function g(): String[0..1] { first(['a', 'b']) }")
        .step("compile", |a| a.succeeds().defines("g__String_$0_1$_"))
        .add("use.pure", "function g(): Integer[0..1] { first(['a', 'b']) }")
        .step("mismatch", |a| {
            a.error_matching(r"^Return type error in function 'g'; found: String\[.*\]; expected: Integer\[.*\]$")
        });

    scenario.run().unwrap();
}

#[test]
fn test_enum_values_and_properties() {
    let scenario = Scenario::new("enum_and_property")
        .add("model.pure", "Enum Color { RED, GREEN }\nClass Car { color: Color[1]; }")
        .add(
            "use.pure",
            "function pick(): Color[1] { Color.RED }\nfunction paint(c: Car[1]): Color[1] { $c.color }",
        )
        .step("compile", |a| a.succeeds().defines("pick__Color_1_"))
        .add("model.pure", "Enum Color { GREEN }\nClass Car { color: Color[1]; }")
        .step("value_removed", |a| a.error_at("use.pure", 1))
        .add("model.pure", "Enum Color { RED, GREEN }\nClass Car { colour: Color[1]; }")
        .step("property_renamed", |a| {
            a.error("Can't find the property 'color' in the class Car").error_at("use.pure", 2)
        });

    scenario.run().unwrap();
}
