//! Where structural instances find the instances of their field types.
use adt_config::{DeriveConfig, Flavour, InstanceRequest};
use adt_derive_key::DeriveBuiltin;
use adt_problem::{DeriveProblem, Problem};
use adt_reflect::Snapshot;
use insta::assert_snapshot;

use crate::util::{derive_with, snapshot, visitor_adt};

fn payment() -> String {
    visitor_adt(
        "Payment",
        &[
            ("Card", &[("amount", "a.Money"), ("number", "int")]),
            ("Cash", &[("amount", "a.Money")]),
        ],
    )
}

fn equal_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, ty)| {
            format!(r#"{{ "name": "{name}", "ty": "fj.Equal<{ty}>", "modifiers": ["static", "final"] }}"#)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn class(name: &str, fields: &[(&str, &str)]) -> String {
    format!(
        r#"[{{ "name": "{name}", "kind": "class", "fields": [{}] }}]"#,
        equal_fields(fields)
    )
}

fn fj_equal(fields: &[(&str, &str)]) -> String {
    format!(
        r#"[{{ "name": "fj.Equal", "kind": "class", "type_params": [{{ "name": "A" }}], "fields": [{}] }}]"#,
        equal_fields(fields)
    )
}

fn config() -> DeriveConfig {
    DeriveConfig {
        flavour: Flavour::Fj,
        instances: vec![InstanceRequest {
            builtins: vec![DeriveBuiltin::Equal],
            in_class: None,
        }],
        ..DeriveConfig::default()
    }
}

fn universe(money: &[(&str, &str)], equal: &[(&str, &str)]) -> Snapshot {
    snapshot(&[&payment(), &class("a.Money", money), &fj_equal(equal)])
}

#[test]
fn field_type_instances_come_first() {
    let universe = universe(
        &[("EQUAL", "a.Money")],
        &[("intEqual", "java.lang.Integer"), ("moneyEqual", "a.Money")],
    );

    let derived = derive_with(&universe, "a.Payment", &config()).unwrap();
    let rendered = derived.units[0].render();

    assert!(rendered.contains("Money.EQUAL.eq(amount1, amount2)"));
    assert!(rendered.contains("Equal.intEqual.eq(number1, number2)"));
    assert!(!rendered.contains("moneyEqual"));
}

#[test]
fn instance_class_before_fallback_providers() {
    let mut universe = universe(&[], &[("intEqual", "java.lang.Integer"), ("moneyEqual", "a.Money")]);
    let fallback: Snapshot = serde_json::from_str(&class(
        "a.Instances",
        &[("intEq", "java.lang.Integer"), ("moneyEq", "a.Money")],
    ))
    .unwrap();
    universe.insert(fallback.types()[0].clone());
    let mut config = config();
    config.fallback_providers = vec!["a.Instances".into()];

    let derived = derive_with(&universe, "a.Payment", &config).unwrap();
    let rendered = derived.units[0].render();

    assert!(rendered.contains("Equal.moneyEqual.eq(amount1, amount2)"));
    assert!(!rendered.contains("Instances.moneyEq"));
}

#[test]
fn fallback_providers_fill_the_gaps() {
    let mut universe = universe(&[], &[("intEqual", "java.lang.Integer")]);
    let fallback: Snapshot =
        serde_json::from_str(&class("a.Instances", &[("moneyEq", "a.Money")])).unwrap();
    universe.insert(fallback.types()[0].clone());
    let mut config = config();
    config.fallback_providers = vec!["a.Instances".into()];

    let derived = derive_with(&universe, "a.Payment", &config).unwrap();

    assert!(derived.units[0]
        .render()
        .contains("Instances.moneyEq.eq(amount1, amount2)"));
}

#[test]
fn same_level_candidates_are_ambiguous() {
    let universe = universe(
        &[("EQUAL", "a.Money"), ("LEGACY_EQUAL", "a.Money")],
        &[("intEqual", "java.lang.Integer")],
    );

    let problem = derive_with(&universe, "a.Payment", &config()).unwrap_err();

    assert!(matches!(problem, DeriveProblem::AmbiguousInstance { .. }));
    let reports: Vec<String> = problem.reports().iter().map(|r| r.to_string()).collect();
    assert_snapshot!(reports.join("\n"), @"error: a.Payment.Card(amount): several Equal instances for Equal<Money> are equally applicable: Money.EQUAL, Money.LEGACY_EQUAL");
}

#[test]
fn missing_instance_is_reported_on_the_field() {
    let universe = universe(&[], &[("intEqual", "java.lang.Integer")]);

    let problem = derive_with(&universe, "a.Payment", &config()).unwrap_err();

    assert!(!problem.is_deferrable());
    let reports: Vec<String> = problem.reports().iter().map(|r| r.to_string()).collect();
    assert_snapshot!(reports.join("\n"), @"error: a.Payment.Card(amount): could not find a Equal instance for Equal<Money>; provide one as a static member of the type, of its derived companion, or as a fallback provider");
}
