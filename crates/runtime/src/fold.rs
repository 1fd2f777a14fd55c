//! Catamorphisms over dynamic values, driven by an explicit work stack.
use std::fmt;

use adt_error_macros::internal_error;

use crate::value::Data;

/// Which fields of each constructor refer back to the data type itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecursionShape {
    pub constructors: Vec<ConstructorShape>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorShape {
    pub name: String,
    pub arity: usize,
    /// Positions of the recursive fields, ascending.
    pub recursive: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldError {
    UnknownConstructor {
        constructor: usize,
    },
    Arity {
        constructor: String,
        expected: usize,
        found: usize,
    },
    /// A recursive field holds something other than a constructor application.
    NotData {
        constructor: String,
        field: usize,
    },
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::UnknownConstructor { constructor } => {
                write!(f, "no constructor with index {constructor}")
            }
            FoldError::Arity {
                constructor,
                expected,
                found,
            } => write!(f, "{constructor} takes {expected} fields, found {found}"),
            FoldError::NotData { constructor, field } => {
                write!(f, "field {field} of {constructor} should hold a value of the data type")
            }
        }
    }
}

impl std::error::Error for FoldError {}

impl RecursionShape {
    fn check<'s>(&'s self, data: &Data) -> Result<&'s ConstructorShape, FoldError> {
        let shape = self
            .constructors
            .get(data.constructor)
            .ok_or(FoldError::UnknownConstructor {
                constructor: data.constructor,
            })?;
        if shape.arity != data.fields.len() {
            return Err(FoldError::Arity {
                constructor: shape.name.clone(),
                expected: shape.arity,
                found: data.fields.len(),
            });
        }
        Ok(shape)
    }
}

struct Frame<'v, R> {
    data: &'v Data,
    recursive: &'v [usize],
    results: Vec<R>,
}

/// Folds `root` bottom-up. `algebra` sees each node once, after all of its recursive fields,
/// together with their results in field order.
///
/// Nodes wait on an explicit stack rather than on the native one, so the depth of the value
/// is bounded by memory only.
pub fn fold<R>(
    shape: &RecursionShape,
    root: &Data,
    mut algebra: impl FnMut(&Data, Vec<R>) -> R,
) -> Result<R, FoldError> {
    let mut stack = vec![Frame {
        data: root,
        recursive: &shape.check(root)?.recursive,
        results: Vec::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        let done = frame.results.len();
        if let Some(&position) = frame.recursive.get(done) {
            let data = frame.data;
            let constructor = || shape.constructors[data.constructor].name.clone();
            let child = data
                .fields
                .get(position)
                .and_then(|field| field.as_data())
                .ok_or_else(|| FoldError::NotData {
                    constructor: constructor(),
                    field: position,
                })?;
            stack.push(Frame {
                data: child,
                recursive: &shape.check(child)?.recursive,
                results: Vec::with_capacity(2),
            });
            continue;
        }

        let Some(Frame { data, results, .. }) = stack.pop() else {
            break;
        };
        let result = algebra(data, results);
        match stack.last_mut() {
            Some(parent) => parent.results.push(result),
            None => return Ok(result),
        }
    }

    internal_error!("the root frame of a fold always returns")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    /// `Const(int) | Add(Expr, Expr) | Mul(Expr, Expr) | Neg(Expr)`
    fn expr_shape() -> RecursionShape {
        let shape = |name: &str, arity, recursive: &[usize]| ConstructorShape {
            name: name.into(),
            arity,
            recursive: recursive.to_vec(),
        };
        RecursionShape {
            constructors: vec![
                shape("Const", 1, &[]),
                shape("Add", 2, &[0, 1]),
                shape("Mul", 2, &[0, 1]),
                shape("Neg", 1, &[0]),
            ],
        }
    }

    fn eval(node: &Data, results: Vec<i64>) -> i64 {
        match node.constructor {
            0 => node.fields[0].as_int().unwrap_or(0),
            1 => results[0] + results[1],
            2 => results[0] * results[1],
            _ => -results[0],
        }
    }

    #[test]
    fn evaluates_bottom_up() {
        let c = |n| Value::data(0, vec![Value::Int(n)]);
        // 1 + 2 * 3
        let expr = Value::data(1, vec![c(1), Value::data(2, vec![c(2), c(3)])]);

        let result = fold(&expr_shape(), expr.as_data().unwrap(), eval);

        assert_eq!(result, Ok(7));
    }

    #[test]
    fn deep_values_do_not_overflow() {
        let mut expr = Value::data(0, vec![Value::Int(1)]);
        for _ in 0..200_000 {
            expr = Value::data(3, vec![expr]);
        }

        let result = fold(&expr_shape(), expr.as_data().unwrap(), eval);

        assert_eq!(result, Ok(1));
    }

    #[test]
    fn malformed_values_are_reported() {
        let bad = Value::data(1, vec![Value::Int(1), Value::Int(2)]);

        let result = fold(&expr_shape(), bad.as_data().unwrap(), eval);

        assert_eq!(
            result,
            Err(FoldError::NotData {
                constructor: "Add".into(),
                field: 0
            })
        );
        assert_eq!(
            fold(&expr_shape(), &Data::new(7, Vec::new()), eval),
            Err(FoldError::UnknownConstructor { constructor: 7 })
        );
    }
}
