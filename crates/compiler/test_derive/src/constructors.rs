//! Fieldless constructors and the singletons standing in for them.
use std::sync::Arc;

use adt_emit::Modifier;
use adt_runtime::{Data, Singleton, Value};
use pretty_assertions::assert_eq;

use crate::util::{derive, snapshot, visitor_adt};

static RED: Singleton<Data> = Singleton::new();

fn red() -> Arc<Data> {
    RED.get_or_create(|| Data::new(0, Vec::new()))
}

#[test]
fn fieldless_factory_returns_the_same_instance() {
    let first = red();
    let again = red();
    assert!(Arc::ptr_eq(&first, &again));

    let from_threads: Vec<Arc<Data>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(red)).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(from_threads.iter().all(|data| Arc::ptr_eq(data, &first)));
}

#[test]
fn constructors_with_fields_allocate() {
    let one = Value::data(2, vec![Value::Int(1)]);
    let other = Value::data(2, vec![Value::Int(1)]);

    assert_eq!(one, other);
    match (&one, &other) {
        (Value::Data(a), Value::Data(b)) => assert!(!Arc::ptr_eq(a, b)),
        _ => unreachable!(),
    }
}

#[test]
fn derived_singletons_only_for_fieldless_constructors() {
    let universe = snapshot(&[&visitor_adt(
        "Signal",
        &[("Red", &[]), ("Green", &[]), ("Custom", &[("code", "int")])],
    )]);
    let derived = derive(&universe, "a.Signal");
    let code = &derived.units[0].code;

    let singletons: Vec<_> = code
        .fields
        .iter()
        .filter(|f| f.name.ends_with("Singleton"))
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(singletons, ["redSingleton", "greenSingleton"]);
    let red = code.fields.iter().find(|f| f.name == "redSingleton").unwrap();
    assert!(red.modifiers.contains(&Modifier::Volatile));

    let rendered = derived.units[0].render();
    assert!(rendered.contains("synchronized (Signals.class) {"));
    assert!(rendered.contains("return new Signals.Custom(code);"));
}
