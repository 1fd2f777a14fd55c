//! Runtime support for derived algebraic data types.
//!
//! Derived code relies on a handful of runtime behaviours: memoized lazy values, singletons
//! created once, folds that do not grow the native stack, and accessors classified per field.
//! This crate gives each of them a Rust implementation with the same contract, working on
//! [`Value`]s whose shape is described by the synthesizers.
#![warn(clippy::dbg_macro)]

pub mod fold;
pub mod lazy;
pub mod optics;
pub mod singleton;
pub mod trampoline;
pub mod value;

pub use fold::{fold, ConstructorShape, FoldError, RecursionShape};
pub use lazy::{Forced, Lazy};
pub use optics::{AccessorKind, AccessorPlan, FieldPlan};
pub use singleton::Singleton;
pub use trampoline::Trampoline;
pub use value::{Data, Value};
