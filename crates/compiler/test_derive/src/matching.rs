//! Walking the derived matcher builders the way a caller of the generated code would.
use adt_emit::TypeSpec;
use adt_reflect::Snapshot;
use adt_types::Type;
use pretty_assertions::assert_eq;

use crate::util::{derive, snapshot, visitor_adt};

fn event() -> Snapshot {
    snapshot(&[&visitor_adt(
        "Event",
        &[
            ("Started", &[("id", "int")]),
            ("Paused", &[]),
            ("Resumed", &[]),
            ("Tagged", &[("id", "int"), ("tag", "java.lang.String")]),
            ("Stopped", &[]),
        ],
    )])
}

const CONSTRUCTORS: [&str; 5] = ["Started", "Paused", "Resumed", "Tagged", "Stopped"];
const TERMINALS: [&str; 3] = ["otherwise", "otherwise_", "otherwiseEmpty"];

/// The builder class `ty` refers to, if it is one of `holder`'s.
fn builder<'c>(holder: &'c TypeSpec, ty: &Type) -> Option<&'c TypeSpec> {
    holder.nested(ty.base_name()?.simple_name())
}

fn has_terminal(step: &TypeSpec) -> bool {
    TERMINALS.iter().any(|name| step.method(name).is_some())
}

#[test]
fn total_path_takes_one_call_per_constructor() {
    let derived = derive(&event(), "a.Event");
    let code = &derived.units[0].code;
    let holder = code.nested("CasesMatchers").unwrap();

    let entry = code.method("cases").unwrap().returns.clone().unwrap();
    let mut step = builder(holder, &entry).unwrap();
    let mut calls = 0;
    let mut outcome = None;
    for (i, constructor) in CONSTRUCTORS.iter().enumerate() {
        // a total match cannot be cut short before two handlers are in
        if i < 2 {
            assert!(!has_terminal(step), "{} offers a terminal", step.name);
        }
        let next = step.method(constructor).unwrap().returns.clone().unwrap();
        calls += 1;
        match builder(holder, &next) {
            Some(next_step) => step = next_step,
            None => {
                outcome = Some(next);
                break;
            }
        }
    }

    assert_eq!(calls, CONSTRUCTORS.len());
    assert_eq!(
        outcome,
        Some(Type::parse("java.util.function.Function<a.Event, R>").unwrap())
    );
}

#[test]
fn skipping_a_constructor_leaves_only_otherwise() {
    let derived = derive(&event(), "a.Event");
    let code = &derived.units[0].code;
    let holder = code.nested("CasesMatchers").unwrap();

    let first = holder.nested("TotalMatcher_Started").unwrap();
    let skipped = first.method("Tagged").unwrap().returns.clone().unwrap();
    let partial = builder(holder, &skipped).unwrap();
    assert_eq!(partial.name, "PartialMatcher");

    for method in partial.methods.iter() {
        let returns = method.returns.as_ref().unwrap();
        let stays_partial = builder(holder, returns).map(|b| b.name.as_str()) == Some("PartialMatcher");
        assert_eq!(
            stays_partial,
            !TERMINALS.contains(&method.name.as_str()),
            "{}",
            method.name
        );
    }
}

#[test]
fn case_of_holds_the_value() {
    let derived = derive(&event(), "a.Event");
    let code = &derived.units[0].code;

    let case_of = code.method("caseOf").unwrap();
    assert_eq!(case_of.params.len(), 1);
    assert_eq!(case_of.params[0].ty, Type::class("a.Event"));

    let holder = code.nested("CaseOfMatchers").unwrap();
    let names: Vec<_> = holder.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Handlers",
            "TotalMatcher_Started",
            "TotalMatcher_Paused",
            "TotalMatcher_Resumed",
            "TotalMatcher_Tagged",
            "TotalMatcher_Stopped",
            "PartialMatcher"
        ]
    );
}
