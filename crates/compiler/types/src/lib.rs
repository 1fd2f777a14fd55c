#![warn(clippy::dbg_macro)]
pub mod pretty_print;
mod syntax;
pub mod types;

pub use syntax::TypeSyntaxError;
pub use types::{Primitive, QualifiedName, Type, TypeVarName};
