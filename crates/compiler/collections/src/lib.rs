//! Small insertion-ordered collections.
//!
//! Declarations, constructors and fields are always small, and the order in which they were
//! declared is observable in everything we derive. These collections are plain vectors with
//! set/map semantics layered on top, so iteration order is always insertion order.
#![warn(clippy::dbg_macro)]

mod vec_map;
mod vec_set;

pub use vec_map::VecMap;
pub use vec_set::VecSet;
