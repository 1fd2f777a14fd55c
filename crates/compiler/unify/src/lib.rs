//! Implements the narrow, one-sided unification the derivation pipeline needs: solving the type
//! restrictions of a constructor, specializing an interface's methods to the way it is applied,
//! and matching instance providers against a required instance type.
#![warn(clippy::dbg_macro)]

mod env;
pub mod instances;
pub mod unify;

pub use instances::{
    InstanceError, InstanceExpr, InstanceSearch, LocalInstance, MemberKind, ProviderMember,
    ProviderSite,
};
pub use unify::{resolve, unify, unify_in, Mismatch, Substitution};
