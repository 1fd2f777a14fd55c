//! `Expr = Const(int) | Add(Expr, Expr) | Mult(Expr, Expr) | Neg(Expr)`, from visitor to fold.
use adt_derive::cata;
use adt_reflect::Snapshot;
use adt_runtime::{fold, Data, Value};
use adt_types::Type;
use pretty_assertions::assert_eq;

use crate::util::{derive, parse, snapshot, visitor_adt};

fn expr() -> Snapshot {
    snapshot(&[&visitor_adt(
        "Expr",
        &[
            ("Const", &[("value", "int")]),
            ("Add", &[("left", "a.Expr"), ("right", "a.Expr")]),
            ("Mult", &[("left", "a.Expr"), ("right", "a.Expr")]),
            ("Neg", &[("expr", "a.Expr")]),
        ],
    )])
}

const CONST: usize = 0;
const ADD: usize = 1;
const MULT: usize = 2;
const NEG: usize = 3;

fn constant(n: i64) -> Value {
    Value::data(CONST, vec![Value::Int(n)])
}

fn eval(data: &Data, results: Vec<i64>) -> i64 {
    match data.constructor {
        CONST => data.fields[0].as_int().unwrap(),
        ADD => results[0] + results[1],
        MULT => results[0] * results[1],
        NEG => -results[0],
        other => panic!("no constructor {other}"),
    }
}

#[test]
fn constructors_in_declaration_order() {
    let adt = parse(&expr(), "a.Expr");

    let constructors: Vec<_> = adt
        .constructors()
        .iter()
        .map(|c| (c.index, c.name.as_str()))
        .collect();
    assert_eq!(constructors, [(0, "Const"), (1, "Add"), (2, "Mult"), (3, "Neg")]);

    let fields: Vec<_> = adt.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, ["value", "left", "right", "expr"]);
    assert_eq!(adt.field("value").unwrap().ty, Type::parse("int").unwrap());
    assert_eq!(adt.field("left").unwrap().ty, Type::class("a.Expr"));

    let owners = |field: &str| -> Vec<&str> {
        adt.constructors()
            .iter()
            .filter(|c| c.argument(field).is_some())
            .map(|c| c.name.as_str())
            .collect()
    };
    assert_eq!(owners("value"), ["Const"]);
    assert_eq!(owners("left"), ["Add", "Mult"]);
    assert_eq!(owners("right"), ["Add", "Mult"]);
    assert_eq!(owners("expr"), ["Neg"]);
}

#[test]
fn fold_computes_seven() {
    let adt = parse(&expr(), "a.Expr");
    let shape = cata::shape(&adt).unwrap();

    // Add(Const(1), Mult(Const(2), Const(3)))
    let value = Value::data(
        ADD,
        vec![
            constant(1),
            Value::data(MULT, vec![constant(2), constant(3)]),
        ],
    );

    assert_eq!(fold(&shape, value.as_data().unwrap(), eval), Ok(7));
}

#[test]
fn deep_values_fold_without_overflow() {
    let adt = parse(&expr(), "a.Expr");
    let shape = cata::shape(&adt).unwrap();

    let mut value = constant(1);
    for _ in 0..200_000 {
        value = Value::data(NEG, vec![value]);
    }

    assert_eq!(fold(&shape, value.as_data().unwrap(), eval), Ok(1));
}

#[test]
fn derived_fold_takes_one_mapper_per_constructor() {
    let derived = derive(&expr(), "a.Expr");
    let code = &derived.units[0].code;

    let cata = code.method("cata").unwrap();
    let params: Vec<_> = cata.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, ["const_", "add", "mult", "neg", "delay"]);

    let rendered = derived.units[0].render();
    assert!(rendered.contains("public static Expr Mult(Expr left, Expr right) {"));
    assert!(rendered.contains("this.delay.apply(() -> this.fold(expr))"));
}
