//! Types whose dependencies show up in a later round.
use adt_derive::Registry;
use adt_load::{DeriveJob, Loader, RoundSummary, Threading};
use adt_problem::{Problem, ProblemKind};
use adt_reflect::Snapshot;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::util::{snapshot, visitor_adt};

fn job() -> DeriveJob {
    serde_json::from_str(indoc!(
        r#"
        {
          "defaults": { "flavour": "fj", "instances": [{ "builtins": ["Equal"] }] },
          "types": [{ "name": "a.Color" }, { "name": "a.Point" }]
        }
        "#
    ))
    .unwrap()
}

fn without_equal() -> Snapshot {
    snapshot(&[
        &visitor_adt("Color", &[("Red", &[]), ("Blue", &[])]),
        &visitor_adt("Point", &[("Point", &[("x", "int"), ("y", "int")])]),
    ])
}

fn with_equal() -> Snapshot {
    let mut universe = without_equal();
    let equal: Snapshot = serde_json::from_str(
        r#"[{
          "name": "fj.Equal",
          "kind": "class",
          "type_params": [{ "name": "A" }],
          "fields": [{ "name": "intEqual", "ty": "fj.Equal<java.lang.Integer>", "modifiers": ["static"] }]
        }]"#,
    )
    .unwrap();
    universe.insert(equal.types()[0].clone());
    universe
}

#[test]
fn deferred_types_are_derived_once_their_dependencies_appear() {
    let registry = Registry::builtin();
    let mut loader = Loader::new(&registry, Threading::AtMost(2));
    loader.request(&job());

    let first = loader.round(&without_equal());
    assert_eq!(
        first,
        RoundSummary {
            derived: 0,
            failed: 0,
            deferred: 2
        }
    );
    assert!(!first.made_progress());

    let second = loader.round(&with_equal());
    assert_eq!(second.derived, 2);

    let result = loader.finish(&with_equal());
    assert!(!result.has_errors());
    let rendered: Vec<String> = result.units.iter().map(|unit| unit.render()).collect();
    assert!(rendered[0].contains("public static Equal<Color> colorEqual()"));
    assert!(rendered[1].contains("Equal.intEqual.eq(x1, x2) && Equal.intEqual.eq(y1, y2)"));
}

#[test]
fn still_missing_after_the_last_round() {
    let result = adt_load::load(
        &job(),
        &without_equal(),
        &Registry::builtin(),
        Threading::Single,
    );

    assert!(result.units.is_empty());
    assert!(result
        .problems
        .iter()
        .all(|problem| problem.kind() == ProblemKind::DependencyUnavailable));
    assert_eq!(result.problems.len(), 2);
}
