//! Getters of fields declared by some constructors only.
use adt_derive::accessors;
use adt_reflect::Snapshot;
use adt_runtime::{AccessorKind, Data, Value};
use adt_types::Type;
use pretty_assertions::assert_eq;

use crate::util::{derive, parse, snapshot, visitor_adt};

/// Five constructors; `label` is declared by `Started` and `Tagged` only.
fn event() -> Snapshot {
    snapshot(&[&visitor_adt(
        "Event",
        &[
            ("Started", &[("id", "int"), ("label", "java.lang.String")]),
            ("Paused", &[("id", "int")]),
            ("Resumed", &[("id", "int")]),
            ("Tagged", &[("id", "int"), ("label", "java.lang.String")]),
            ("Stopped", &[("id", "int")]),
        ],
    )])
}

/// One instance of every constructor, each with its own id.
fn instances() -> Vec<Data> {
    let with_label = [0, 3];
    (0..5)
        .map(|constructor| {
            let mut fields = vec![Value::Int(constructor as i64 * 10)];
            if with_label.contains(&constructor) {
                fields.push(Value::str("release"));
            }
            Data::new(constructor, fields)
        })
        .collect()
}

#[test]
fn optional_getter_present_on_two_of_five() {
    let adt = parse(&event(), "a.Event");
    let plan = accessors::plan(&adt);
    let label = plan.field("label").unwrap();
    assert_eq!(label.kind, AccessorKind::Optional);

    let present: Vec<bool> = instances().iter().map(|data| label.get(data).is_some()).collect();
    assert_eq!(present, [true, false, false, true, false]);

    for data in instances().iter().filter(|data| label.get(data).is_some()) {
        assert_eq!(label.get(data), Some(&Value::str("release")));
    }
}

#[test]
fn shared_field_is_a_lens() {
    let adt = parse(&event(), "a.Event");
    let plan = accessors::plan(&adt);
    let id = plan.field("id").unwrap();
    assert_eq!(id.kind, AccessorKind::Lens);

    for data in instances().iter() {
        let updated = id.set(data, Value::Int(7)).unwrap();
        let updated = updated.as_data().unwrap();
        assert_eq!(updated.constructor, data.constructor);
        assert_eq!(id.get(updated), Some(&Value::Int(7)));
        assert_eq!(updated.fields[1..], data.fields[1..]);
    }

    // optional fields have no setter
    let label = plan.field("label").unwrap();
    assert!(label.set(&instances()[0], Value::str("other")).is_none());
}

#[test]
fn derived_getters_follow_the_plan() {
    let derived = derive(&event(), "a.Event");
    let code = &derived.units[0].code;

    assert_eq!(code.method("getId").unwrap().returns, Some(Type::parse("int").unwrap()));
    assert_eq!(
        code.method("getLabel").unwrap().returns,
        Some(Type::parse("java.util.Optional<java.lang.String>").unwrap())
    );
    assert!(code.method("setId").is_some());
    assert!(code.method("modLabel").is_none());
    assert!(code.method("setLabel").is_none());

    let rendered = derived.units[0].render();
    assert_eq!(rendered.matches("Optional.of(label)").count(), 2);
}
