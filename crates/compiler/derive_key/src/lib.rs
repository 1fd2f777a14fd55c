//! To derive something for an algebraic data type, we first determine what is being asked for.
//! A [DeriveKey] names one artifact family, either one of the [Make] artifacts built from the
//! data type's own structure, or one of the [DeriveBuiltin] instances resolved per field type.
//!
//! Deriver implementations are registered under these keys, so two requests with the same key
//! are always served by the same deriver.
#![warn(clippy::dbg_macro)]

mod make;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

pub use make::{Make, MakeSet};

/// Instances of cross-cutting type classes that can be derived structurally.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr, Serialize,
    Deserialize,
)]
pub enum DeriveBuiltin {
    Equal,
    Order,
    Hash,
    Show,
}

impl DeriveBuiltin {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeriveKey {
    Make(Make),
    Instance(DeriveBuiltin),
}

impl DeriveKey {
    pub fn debug_name(&self) -> String {
        match self {
            DeriveKey::Make(make) => format!("make:{}", make.name()),
            DeriveKey::Instance(builtin) => format!("instance:{}", builtin.name()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn debug_names() {
        assert_eq!(
            DeriveKey::Make(Make::LazyConstructor).debug_name(),
            "make:lazyConstructor"
        );
        assert_eq!(
            DeriveKey::Instance(DeriveBuiltin::Order).debug_name(),
            "instance:Order"
        );
    }
}
