use adt_config::DeriveConfig;
use adt_derive::{derive_adt, Derived, Registry};
use adt_model::AlgebraicDataType;
use adt_parse::parse_adt;
use adt_problem::DeriveProblem;
use adt_reflect::{Snapshot, Universe};
use indoc::indoc;

pub(crate) const FUNCTIONS: &str = indoc!(
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
      }
    ]
    "#
);

/// Declarations of a visitor-dispatched `a.<name>`: the data type and its `Cases<R>` visitor,
/// with one case method per entry of `cases`.
pub(crate) fn visitor_adt(name: &str, cases: &[(&str, &[(&str, &str)])]) -> String {
    let cases = cases
        .iter()
        .map(|(case, params)| {
            let params = params
                .iter()
                .map(|(name, ty)| format!(r#"{{ "name": "{name}", "ty": "{ty}" }}"#))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                r#"{{ "name": "{case}", "params": [{params}], "return_type": "R", "modifiers": ["abstract"] }}"#
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"[
          {{
            "name": "a.{name}",
            "kind": "abstract_class",
            "methods": [
              {{
                "name": "match",
                "type_params": [{{ "name": "R" }}],
                "params": [{{ "name": "cases", "ty": "a.{name}.Cases<R>" }}],
                "return_type": "R",
                "modifiers": ["abstract"]
              }}
            ]
          }},
          {{
            "name": "a.{name}.Cases",
            "kind": "interface",
            "type_params": [{{ "name": "R" }}],
            "methods": [{cases}]
          }}
        ]"#
    )
}

/// The functional interfaces plus every declaration in `jsons`, each a JSON array.
pub(crate) fn snapshot(jsons: &[&str]) -> Snapshot {
    let mut snapshot: Snapshot = serde_json::from_str(FUNCTIONS).unwrap();
    for json in jsons {
        let decls: Snapshot = serde_json::from_str(json).unwrap();
        for decl in decls.types() {
            snapshot.insert(decl.clone());
        }
    }
    snapshot
}

pub(crate) fn parse(universe: &Snapshot, name: &str) -> AlgebraicDataType {
    let decl = universe.type_decl(&name.into()).unwrap();
    parse_adt(decl, universe, &DeriveConfig::default()).unwrap()
}

pub(crate) fn derive_with(
    universe: &Snapshot,
    name: &str,
    config: &DeriveConfig,
) -> Result<Derived, DeriveProblem> {
    let decl = universe.type_decl(&name.into()).unwrap();
    let adt = parse_adt(decl, universe, config)?;
    derive_adt(&Registry::builtin(), &adt, universe, config)
}

pub(crate) fn derive(universe: &Snapshot, name: &str) -> Derived {
    derive_with(universe, name, &DeriveConfig::default()).unwrap()
}
