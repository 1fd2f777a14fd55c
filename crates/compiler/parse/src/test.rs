use adt_config::{DeriveConfig, Flavour};
use adt_model::DataConstruction;
use adt_problem::{Problem, ProblemKind};
use adt_reflect::{Snapshot, Universe};
use adt_types::{Type, TypeVarName};
use indoc::indoc;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use super::*;

const FUNCTIONS: &str = indoc!(
    r#"
    [
      {
        "name": "java.util.function.Supplier",
        "kind": "interface",
        "type_params": [{ "name": "T" }],
        "methods": [
          { "name": "get", "return_type": "T", "modifiers": ["abstract"] }
        ]
      },
      {
        "name": "java.util.function.Function",
        "kind": "interface",
        "type_params": [{ "name": "T" }, { "name": "R" }],
        "methods": [
          {
            "name": "apply",
            "params": [{ "name": "t", "ty": "T" }],
            "return_type": "R",
            "modifiers": ["abstract"]
          },
          {
            "name": "identity",
            "type_params": [{ "name": "T" }],
            "return_type": "java.util.function.Function<T, T>",
            "modifiers": ["static"]
          }
        ]
      }
    ]
    "#
);

fn universe(json: &str) -> Snapshot {
    let mut snapshot: Snapshot = serde_json::from_str(FUNCTIONS).unwrap();
    let decls: Snapshot = serde_json::from_str(json).unwrap();
    for decl in decls.types() {
        snapshot.insert(decl.clone());
    }
    snapshot
}

fn parse(json: &str, name: &str) -> Result<AlgebraicDataType, ParseProblem> {
    let universe = universe(json);
    let decl = universe.type_decl(&name.into()).unwrap();
    parse_adt(decl, &universe, &DeriveConfig::default())
}

/// `match(Cases<T, R>)` on `Expr<T>`, with the constructors as the visitor's methods.
fn expr(cases: &str) -> String {
    format!(
        r#"[
          {{
            "name": "a.Expr",
            "kind": "abstract_class",
            "type_params": [{{ "name": "T" }}],
            "methods": [
              {{
                "name": "match",
                "type_params": [{{ "name": "R" }}],
                "params": [{{ "name": "cases", "ty": "a.Expr.Cases<T, R>" }}],
                "return_type": "R",
                "modifiers": ["abstract"]
              }},
              {{ "name": "toString", "return_type": "java.lang.String", "modifiers": ["abstract"] }}
            ]
          }},
          {{
            "name": "a.Expr.Cases",
            "kind": "interface",
            "type_params": [{{ "name": "T" }}, {{ "name": "R" }}],
            "methods": [{cases}]
          }}
        ]"#
    )
}

fn case(name: &str, params: &[(&str, &str)]) -> String {
    let params = params
        .iter()
        .map(|(name, ty)| format!(r#"{{ "name": "{name}", "ty": "{ty}" }}"#))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"{{ "name": "{name}", "params": [{params}], "return_type": "R", "modifiers": ["abstract"] }}"#
    )
}

const FN: &str = "java.util.function.Function";

fn gadt() -> String {
    expr(
        &[
            case("IConst", &[("value", "int"), ("id", &format!("{FN}<java.lang.Integer, T>"))]),
            case("BConst", &[("flag", "boolean"), ("id", &format!("{FN}<java.lang.Boolean, T>"))]),
            case(
                "Add",
                &[
                    ("left", "a.Expr<java.lang.Integer>"),
                    ("right", "a.Expr<java.lang.Integer>"),
                    ("id", &format!("{FN}<java.lang.Integer, T>")),
                ],
            ),
            case(
                "If",
                &[
                    ("cond", "a.Expr<java.lang.Boolean>"),
                    ("then", "a.Expr<T>"),
                    ("otherwise", "a.Expr<T>"),
                ],
            ),
        ]
        .join(", "),
    )
}

#[test]
fn visitor_dispatch_with_restrictions() {
    let adt = parse(&gadt(), "a.Expr").unwrap();

    assert_snapshot!(
        adt,
        @"Expr<T> = IConst(value: int; T = Integer) | BConst(flag: boolean; T = Boolean) | Add(left: Expr<Integer>, right: Expr<Integer>; T = Integer) | If(cond: Expr<Boolean>, then: Expr<T>, otherwise: Expr<T>)"
    );

    let constructors = adt.constructors();
    assert_eq!(constructors[0].returned_type, Type::parse("a.Expr<java.lang.Integer>").unwrap());
    assert!(constructors[0].type_variables.is_empty());
    assert_eq!(constructors[3].returned_type, Type::parse("a.Expr<T>").unwrap());
    assert_eq!(constructors[3].type_variables, vec!["T".into()]);
    assert_eq!(constructors[2].deconstructor.visitor_method, "Add");
    assert_eq!(adt.visitor(), Some(&Type::parse("a.Expr.Cases<T, R>").unwrap()));
    assert_eq!(adt.result_var().as_str(), "R");

    let fields: Vec<_> = adt.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, ["value", "flag", "left", "right", "cond", "then", "otherwise"]);
}

#[test]
fn restriction_must_trail() {
    let json = expr(&case(
        "IConst",
        &[("id", &format!("{FN}<java.lang.Integer, T>")), ("value", "int")],
    ));

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Constraint);
    assert_snapshot!(
        problem.reports()[0],
        @"error: a.Expr.Cases.IConst: type restrictions must come after every other parameter, but value follows one"
    );
}

#[test]
fn same_field_different_types() {
    let json = expr(
        &[
            case("IConst", &[("value", "int")]),
            case("BConst", &[("value", "boolean")]),
        ]
        .join(", "),
    );

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.bindings().len(), 2);
    assert_snapshot!(
        problem,
        @"field value has type int in a.Expr.Cases.IConst but type boolean in a.Expr.Cases.BConst; fields with the same name must have the same type in every constructor"
    );
}

#[test]
fn witness_name_may_repeat_across_constructors() {
    let json = expr(
        &[
            case("IConst", &[("id", &format!("{FN}<java.lang.Integer, T>"))]),
            case("Named", &[("id", "java.lang.String")]),
        ]
        .join(", "),
    );

    let adt = parse(&json, "a.Expr").unwrap();

    assert_eq!(adt.fields.len(), 1);
    assert_eq!(adt.fields[0].ty, Type::class("java.lang.String"));
}

#[test]
fn field_names_annotation() {
    let json = expr(indoc!(
        r#"
        {
          "name": "Pair",
          "params": [{ "name": "arg0", "ty": "T" }, { "name": "arg1", "ty": "T" }],
          "return_type": "R",
          "modifiers": ["abstract"],
          "annotations": [
            {
              "name": "org.derive4j.FieldNames",
              "values": [{ "name": "value", "value": { "array": [{ "string": "left" }, { "string": "right" }] } }]
            }
          ]
        }
        "#
    ));

    let adt = parse(&json, "a.Expr").unwrap();

    assert_snapshot!(adt, @"Expr<T> = Pair(left: T, right: T)");
}

#[test]
fn field_names_count_must_match() {
    let json = expr(indoc!(
        r#"
        {
          "name": "Pair",
          "params": [{ "name": "arg0", "ty": "T" }, { "name": "arg1", "ty": "T" }],
          "return_type": "R",
          "modifiers": ["abstract"],
          "annotations": [
            {
              "name": "org.derive4j.FieldNames",
              "values": [{ "name": "value", "value": { "string": "left" } }]
            }
          ]
        }
        "#
    ));

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Naming);
    assert_snapshot!(
        problem.reports()[0],
        @"error: a.Expr.Cases.Pair @FieldNames(value): wrong number of field names: expected 2, found 1"
    );
    assert!(problem.reports()[0]
        .to_string()
        .contains(&format!("@{FIELD_NAMES}(value)")));
}

#[test]
fn duplicate_field_names() {
    let json = expr(&case("Pair", &[("value", "T"), ("value", "T")]));

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Naming);
    assert_eq!(
        problem,
        ParseProblem::DuplicateFieldName {
            case: ElementRef::new("a.Expr.Cases.Pair", Default::default()),
            name: "value".into(),
        }
    );
}

#[test]
fn duplicate_constructor_names() {
    let json = expr(
        &[
            case("Const", &[("value", "int")]),
            case("Const", &[]),
        ]
        .join(", "),
    );

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Naming);
    assert_eq!(
        problem,
        ParseProblem::DuplicateConstructorName {
            case: ElementRef::new("a.Expr.Cases.Const", Default::default()),
            name: "Const".into(),
        }
    );
}

#[test]
fn case_methods_are_not_generic() {
    let json = expr(indoc!(
        r#"
        {
          "name": "Const",
          "type_params": [{ "name": "X" }],
          "params": [{ "name": "value", "ty": "X" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }
        "#
    ));

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Shape);
    assert_snapshot!(
        problem.reports()[0],
        @"error: a.Expr.Cases.Const: case methods must not declare type parameters"
    );
}

const OPTION: &str = indoc!(
    r#"
    [
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
      }
    ]
    "#
);

#[test]
fn functions_dispatch() {
    let adt = parse(OPTION, "a.Option").unwrap();

    assert!(matches!(
        adt.data_construction,
        DataConstruction::MultipleConstructors(MultipleConstructors::FunctionsDispatch { .. })
    ));
    assert_snapshot!(adt, @"Option<A> = none | some(t: A)");

    let some = &adt.constructors()[1];
    assert_eq!(some.deconstructor.visitor_param_index, 1);
    assert_eq!(some.deconstructor.visitor_method, "apply");
}

#[test]
fn missing_dependency_is_unresolved() {
    let universe: Snapshot = serde_json::from_str(OPTION).unwrap();
    let decl = universe.type_decl(&"a.Option".into()).unwrap();

    let problem = parse_adt(decl, &universe, &DeriveConfig::default()).unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::DependencyUnavailable);
    assert_eq!(
        problem,
        ParseProblem::Unresolved {
            element: ElementRef::new("a.Option.match(none)", Default::default()),
            name: "java.util.function.Supplier".into(),
        }
    );
}

#[test]
fn witness_type_follows_flavour() {
    let json = expr(&case(
        "IConst",
        &[("value", "int"), ("id", "fj.F<java.lang.Integer, T>")],
    ));
    let universe = universe(&json);
    let decl = universe.type_decl(&"a.Expr".into()).unwrap();
    let fj = DeriveConfig {
        flavour: Flavour::Fj,
        ..DeriveConfig::default()
    };

    let jdk = parse_adt(decl, &universe, &DeriveConfig::default()).unwrap();
    let fj = parse_adt(decl, &universe, &fj).unwrap();

    assert_eq!(jdk.constructors()[0].arguments.len(), 2);
    assert_eq!(fj.constructors()[0].arguments.len(), 1);
    assert_eq!(fj.constructors()[0].type_restrictions.len(), 1);
}

#[test]
fn no_cases_means_no_constructor() {
    let json = indoc!(
        r#"
        [
          {
            "name": "a.Void",
            "kind": "abstract_class",
            "methods": [
              { "name": "absurd", "type_params": [{ "name": "X" }], "return_type": "X", "modifiers": ["abstract"] }
            ]
          }
        ]
        "#
    );

    let adt = parse(json, "a.Void").unwrap();

    assert_eq!(adt.data_construction, DataConstruction::NoConstructor);
    assert_snapshot!(adt, @"Void = !");
}

#[test]
fn several_dispatch_candidates() {
    let json = indoc!(
        r#"
        [
          {
            "name": "a.Both",
            "kind": "interface",
            "methods": [
              { "name": "first", "type_params": [{ "name": "R" }], "return_type": "R", "modifiers": ["abstract"] },
              { "name": "second", "type_params": [{ "name": "R" }], "return_type": "R", "modifiers": ["abstract"] },
              { "name": "equals", "params": [{ "name": "o", "ty": "java.lang.Object" }], "return_type": "boolean", "modifiers": ["abstract"] }
            ]
          }
        ]
        "#
    );

    let problem = parse(json, "a.Both").unwrap_err();

    let bound: Vec<_> = problem.bindings().iter().map(|b| b.to_string()).collect();
    assert_eq!(bound, ["a.Both.first", "a.Both.second"]);
}

#[test]
fn case_must_return_result_type() {
    let json = expr(
        r#"{ "name": "Const", "params": [{ "name": "value", "ty": "int" }], "return_type": "int", "modifiers": ["abstract"] }"#,
    );

    let problem = parse(&json, "a.Expr").unwrap_err();

    assert_snapshot!(problem, @"case methods must return the dispatch result type R, found int");
}

#[test]
fn inherited_visitor_methods_come_first() {
    let json = indoc!(
        r#"
        [
          {
            "name": "a.Shape",
            "kind": "interface",
            "methods": [
              {
                "name": "match",
                "type_params": [{ "name": "R" }],
                "params": [{ "name": "cases", "ty": "a.Shape.Cases<R>" }],
                "return_type": "R",
                "modifiers": ["abstract"]
              }
            ]
          },
          {
            "name": "a.Round",
            "kind": "interface",
            "type_params": [{ "name": "X" }],
            "methods": [
              { "name": "Circle", "params": [{ "name": "radius", "ty": "double" }], "return_type": "X", "modifiers": ["abstract"] }
            ]
          },
          {
            "name": "a.Shape.Cases",
            "kind": "interface",
            "type_params": [{ "name": "R" }],
            "supertypes": ["a.Round<R>"],
            "methods": [
              { "name": "Square", "params": [{ "name": "side", "ty": "double" }], "return_type": "R", "modifiers": ["abstract"] }
            ]
          }
        ]
        "#
    );

    let adt = parse(json, "a.Shape").unwrap();

    assert_snapshot!(adt, @"Shape = Circle(radius: double) | Square(side: double)");
}

/// A single abstract class `a.Shape` with the given type parameters and dispatch method.
fn shape(type_params: &str, method: &str) -> String {
    format!(
        r#"[
          {{
            "name": "a.Shape",
            "kind": "abstract_class",
            "type_params": [{type_params}],
            "methods": [{method}]
          }}
        ]"#
    )
}

#[test]
fn data_type_parameters_are_unbounded() {
    let json = shape(
        r#"{ "name": "T", "bounds": ["java.lang.Comparable<T>"] }"#,
        r#"{
          "name": "match",
          "type_params": [{ "name": "R" }],
          "params": [{ "name": "value", "ty": "java.util.function.Function<T, R>" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }"#,
    );

    let problem = parse(&json, "a.Shape").unwrap_err();

    assert_eq!(
        problem,
        ParseProblem::BoundedTypeParameter {
            decl: ElementRef::new("a.Shape", Default::default()),
            var: TypeVarName::new("T"),
        }
    );
    assert_snapshot!(
        problem,
        @"type parameter T is bounded, but the type parameters of a data type must be unbounded"
    );
}

#[test]
fn dispatch_method_has_one_type_parameter() {
    let json = shape(
        "",
        r#"{
          "name": "match",
          "type_params": [{ "name": "R" }, { "name": "S" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }"#,
    );

    let problem = parse(&json, "a.Shape").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Shape);
    assert_eq!(
        problem,
        ParseProblem::DispatchTypeParameters {
            method: ElementRef::new("a.Shape.match", Default::default()),
            count: 2,
        }
    );
}

#[test]
fn dispatch_result_is_unbounded() {
    let json = shape(
        "",
        r#"{
          "name": "match",
          "type_params": [{ "name": "R", "bounds": ["java.lang.Number"] }],
          "params": [{ "name": "none", "ty": "java.util.function.Supplier<R>" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }"#,
    );

    let problem = parse(&json, "a.Shape").unwrap_err();

    assert_eq!(
        problem,
        ParseProblem::DispatchTypeParameterBounded {
            method: ElementRef::new("a.Shape.match", Default::default()),
            var: TypeVarName::new("R"),
        }
    );
}

#[test]
fn visitor_must_be_an_interface() {
    let json = shape(
        "",
        r#"{
          "name": "match",
          "type_params": [{ "name": "R" }],
          "params": [{ "name": "cases", "ty": "int" }],
          "return_type": "R",
          "modifiers": ["abstract"]
        }"#,
    );

    let problem = parse(&json, "a.Shape").unwrap_err();

    assert_eq!(problem.kind(), ProblemKind::Shape);
    assert_snapshot!(
        problem.reports()[0],
        @"error: a.Shape.match(cases): dispatch method parameter of type int is not an interface"
    );
}

#[test]
fn each_function_has_one_case() {
    let json = indoc!(
        r#"
        [
          {
            "name": "a.Pick",
            "kind": "abstract_class",
            "methods": [
              {
                "name": "match",
                "type_params": [{ "name": "R" }],
                "params": [
                  { "name": "none", "ty": "java.util.function.Supplier<R>" },
                  { "name": "both", "ty": "a.Both<R>" }
                ],
                "return_type": "R",
                "modifiers": ["abstract"]
              }
            ]
          },
          {
            "name": "a.Both",
            "kind": "interface",
            "type_params": [{ "name": "X" }],
            "methods": [
              { "name": "left", "return_type": "X", "modifiers": ["abstract"] },
              { "name": "right", "return_type": "X", "modifiers": ["abstract"] }
            ]
          }
        ]
        "#
    );

    let problem = parse(json, "a.Pick").unwrap_err();

    assert_eq!(
        problem,
        ParseProblem::CaseMethodCount {
            param: ElementRef::new("a.Pick.match(both)", Default::default()),
            count: 2,
        }
    );
}
