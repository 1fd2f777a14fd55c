use adt_derive::DeriveEnv;
use adt_derive_key::{DeriveKey, Make};
use adt_emit::DerivedCode;
use adt_problem::ProblemKind;
use adt_reflect::Snapshot;
use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;

const DECLS: &str = indoc!(
    r#"
    [
      {
        "name": "java.util.function.Supplier",
        "kind": "interface",
        "type_params": [{ "name": "T" }],
        "methods": [{ "name": "get", "return_type": "T", "modifiers": ["abstract"] }]
      },
      {
        "name": "java.util.function.Function",
        "kind": "interface",
        "type_params": [{ "name": "T" }, { "name": "R" }],
        "methods": [
          { "name": "apply", "params": [{ "name": "t", "ty": "T" }], "return_type": "R", "modifiers": ["abstract"] }
        ]
      },
      {
        "name": "a.Option",
        "kind": "abstract_class",
        "type_params": [{ "name": "A" }],
        "methods": [
          {
            "name": "match",
            "type_params": [{ "name": "R" }],
            "params": [
              { "name": "none", "ty": "java.util.function.Supplier<R>" },
              { "name": "some", "ty": "java.util.function.Function<A, R>" }
            ],
            "return_type": "R",
            "modifiers": ["abstract"]
          }
        ]
      },
      {
        "name": "a.Broken",
        "kind": "abstract_class",
        "methods": [{ "name": "size", "return_type": "int", "modifiers": ["abstract"] }]
      },
      {
        "name": "a.Tree",
        "kind": "interface",
        "methods": [
          {
            "name": "match",
            "type_params": [{ "name": "R" }],
            "params": [{ "name": "cases", "ty": "a.Tree.Cases<R>" }],
            "return_type": "R",
            "modifiers": ["abstract"]
          }
        ]
      }
    ]
    "#
);

const TREE_CASES: &str = indoc!(
    r#"
    {
      "name": "a.Tree.Cases",
      "kind": "interface",
      "type_params": [{ "name": "R" }],
      "methods": [
        { "name": "Leaf", "return_type": "R", "modifiers": ["abstract"] },
        {
          "name": "Node",
          "params": [{ "name": "left", "ty": "a.Tree" }, { "name": "right", "ty": "a.Tree" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }
      ]
    }
    "#
);

fn without_tree_cases() -> Snapshot {
    serde_json::from_str(DECLS).unwrap()
}

fn everything() -> Snapshot {
    let mut snapshot = without_tree_cases();
    snapshot.insert(serde_json::from_str(TREE_CASES).unwrap());
    snapshot
}

fn targets(result: &LoadResult) -> Vec<&str> {
    result.units.iter().map(|unit| unit.target.name.as_str()).collect()
}

#[test]
fn failures_stay_local() {
    let job = DeriveJob::of_types(["a.Option", "a.Broken", "a.Tree"]);

    let result = load(&job, &everything(), &Registry::builtin(), Threading::Single);

    assert_eq!(targets(&result), ["a.Options", "a.Trees"]);
    assert_eq!(result.problems.len(), 1);
    assert_eq!(result.problems[0].kind(), ProblemKind::Shape);
    assert!(result.has_errors());
}

#[test]
fn deferred_until_dependencies_appear() {
    let registry = Registry::builtin();
    let mut loader = Loader::new(&registry, Threading::Single);
    loader.request(&DeriveJob::of_types(["a.Tree", "a.Option"]));

    let first = loader.round(&without_tree_cases());
    assert_eq!(
        first,
        RoundSummary {
            derived: 1,
            failed: 0,
            deferred: 1
        }
    );
    assert_eq!(loader.pending().map(QualifiedName::as_str).collect::<Vec<_>>(), ["a.Tree"]);

    let second = loader.round(&everything());
    assert_eq!(second.derived, 1);

    let result = loader.finish(&everything());
    assert_eq!(targets(&result), ["a.Options", "a.Trees"]);
    assert!(!result.has_errors());
}

#[test]
fn missing_dependencies_fail_in_the_last_round() {
    let job = DeriveJob::of_types(["a.Tree", "a.Missing"]);

    let result = load(&job, &without_tree_cases(), &Registry::builtin(), Threading::Single);

    assert!(result.units.is_empty());
    let kinds: Vec<_> = result.problems.iter().map(|p| p.kind()).collect();
    assert_eq!(
        kinds,
        [ProblemKind::DependencyUnavailable, ProblemKind::DependencyUnavailable]
    );
    assert!(result
        .reports()
        .iter()
        .any(|report| report.to_string().contains("a.Missing")));
}

fn panicking(env: &mut DeriveEnv<'_>, _: DeriveKey) -> Result<DerivedCode, DeriveProblem> {
    if env.adt.visitor().is_some() {
        panic!("factory exploded");
    }
    Ok(DerivedCode::default())
}

#[test]
fn panics_become_internal_problems() {
    let mut registry = Registry::builtin();
    registry.register(DeriveKey::Make(Make::Factory), None, panicking);
    let job = DeriveJob::of_types(["a.Tree", "a.Option"]);

    let result = load(&job, &everything(), &registry, Threading::Single);

    assert_eq!(targets(&result), ["a.Options"]);
    match &result.problems[..] {
        [DeriveProblem::Internal { decl, message }] => {
            assert_eq!(decl.path, "a.Tree");
            assert_eq!(message, "factory exploded");
        }
        other => panic!("expected one internal problem, got {other:?}"),
    }
}

#[test]
fn parallel_rounds_match_sequential_ones() {
    let job = DeriveJob::of_types(["a.Option", "a.Broken", "a.Tree", "a.Missing"]);
    let universe = everything();
    let registry = Registry::builtin();

    let sequential = load(&job, &universe, &registry, Threading::Single);
    let parallel = load(&job, &universe, &registry, Threading::AtMost(4));

    assert_eq!(sequential.units, parallel.units);
    assert_eq!(sequential.problems, parallel.problems);
}

#[test]
fn type_config_overrides_defaults() {
    let job: DeriveJob = serde_json::from_str(indoc!(
        r#"
        {
          "defaults": { "make": ["getters"], "inClass": "{ClassName}Derived" },
          "types": [
            { "name": "a.Option" },
            { "name": "a.Tree", "config": { "make": ["constructors"] } }
          ]
        }
        "#
    ))
    .unwrap();

    let result = load(&job, &everything(), &Registry::builtin(), Threading::Single);

    assert_eq!(targets(&result), ["a.OptionDerived", "a.TreeDerived"]);
    assert!(result.units[0].code.nested("None").is_none());
    assert!(result.units[1].code.nested("Leaf").is_some());
    assert!(result.units[1].code.nested("CasesMatchers").is_none());
}
