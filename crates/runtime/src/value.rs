use std::fmt;
use std::sync::Arc;

/// A dynamically typed value of a derived data type, or of one of its field types.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    Data(Arc<Data>),
}

/// One constructor application: which constructor, and its fields in declaration order.
#[derive(Clone, PartialEq)]
pub struct Data {
    pub constructor: usize,
    pub fields: Vec<Value>,
}

impl Data {
    pub fn new(constructor: usize, fields: Vec<Value>) -> Self {
        Self {
            constructor,
            fields,
        }
    }
}

/// Deep values are released with an explicit stack rather than by recursion.
impl Drop for Data {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.fields);
        while let Some(value) = pending.pop() {
            if let Value::Data(data) = value {
                if let Ok(mut data) = Arc::try_unwrap(data) {
                    pending.append(&mut data.fields);
                }
            }
        }
    }
}

impl Value {
    pub fn data(constructor: usize, fields: Vec<Value>) -> Value {
        Value::Data(Arc::new(Data::new(constructor, fields)))
    }

    pub fn str(s: &str) -> Value {
        Value::Str(Arc::from(s))
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Data(data) => write!(f, "{data:?}"),
        }
    }
}

impl fmt::Debug for Data {
    /// `#1(3, #0)`: constructor index, then fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.constructor)?;
        if !self.fields.is_empty() {
            let mut tuple = f.debug_tuple("");
            for field in self.fields.iter() {
                tuple.field(field);
            }
            tuple.finish()?;
        }
        Ok(())
    }
}
