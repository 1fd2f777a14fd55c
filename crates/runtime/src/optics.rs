//! Getters, modifiers and setters over dynamic values, following a per-field accessor plan.
use std::sync::Arc;

use crate::value::{Data, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    /// Declared by every constructor: always readable, and replaceable.
    Lens,
    /// Declared by some constructors only: readable where present.
    Optional,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: String,
    pub kind: AccessorKind,
    /// For each constructor, the position of the field in it, if it has the field.
    pub positions: Vec<Option<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessorPlan {
    pub fields: Vec<FieldPlan>,
}

impl AccessorPlan {
    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldPlan {
    fn position(&self, data: &Data) -> Option<usize> {
        self.positions.get(data.constructor).copied().flatten()
    }

    pub fn get<'v>(&self, data: &'v Data) -> Option<&'v Value> {
        self.position(data).and_then(|i| data.fields.get(i))
    }

    /// A copy of `data` with the field transformed; `None` unless this field is a lens.
    pub fn modify(&self, data: &Data, f: impl FnOnce(&Value) -> Value) -> Option<Value> {
        if self.kind != AccessorKind::Lens {
            return None;
        }
        let position = self.position(data)?;
        let mut fields = data.fields.clone();
        let slot = fields.get_mut(position)?;
        *slot = f(slot);
        Some(Value::Data(Arc::new(Data::new(data.constructor, fields))))
    }

    pub fn set(&self, data: &Data, value: Value) -> Option<Value> {
        self.modify(data, move |_| value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan() -> AccessorPlan {
        AccessorPlan {
            fields: vec![
                FieldPlan {
                    name: "x".into(),
                    kind: AccessorKind::Lens,
                    positions: vec![Some(0), Some(0)],
                },
                FieldPlan {
                    name: "radius".into(),
                    kind: AccessorKind::Optional,
                    positions: vec![Some(1), None],
                },
            ],
        }
    }

    #[test]
    fn lens_round_trip() {
        let circle = Data::new(0, vec![Value::Int(1), Value::Int(5)]);
        let plan = plan();
        let x = plan.field("x").unwrap();

        let moved = x.set(&circle, Value::Int(9)).unwrap();

        assert_eq!(x.get(moved.as_data().unwrap()), Some(&Value::Int(9)));
        assert_eq!(moved.as_data().unwrap().fields[1], Value::Int(5));
        assert_eq!(x.get(&circle), Some(&Value::Int(1)));
    }

    #[test]
    fn optional_fields_cannot_be_set() {
        let square = Data::new(1, vec![Value::Int(1)]);
        let plan = plan();
        let radius = plan.field("radius").unwrap();

        assert_eq!(radius.get(&square), None);
        assert_eq!(radius.set(&square, Value::Int(2)), None);
    }
}
