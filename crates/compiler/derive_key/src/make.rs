use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// The artifacts derived from the structure of the data type itself.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Make {
    Constructors,
    LazyConstructor,
    PatternMatching,
    Getters,
    Modifiers,
    Catamorphism,
    Factory,
}

impl Make {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Artifacts whose generated code calls into the code of this one.
    pub fn dependencies(self) -> &'static [Make] {
        use Make::*;
        match self {
            Constructors | LazyConstructor | PatternMatching => &[],
            Getters => &[PatternMatching],
            Modifiers => &[Constructors, PatternMatching, Getters],
            Catamorphism => &[PatternMatching],
            Factory => &[Constructors],
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of [Make]s, iterated in declaration order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MakeSet {
    bits: u8,
}

impl MakeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Make::iter().collect()
    }

    pub fn contains(&self, make: Make) -> bool {
        self.bits & make.bit() != 0
    }

    pub fn insert(&mut self, make: Make) {
        self.bits |= make.bit();
    }

    pub fn remove(&mut self, make: Make) {
        self.bits &= !make.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Make> + '_ {
        Make::iter().filter(|make| self.contains(*make))
    }

    /// The set together with everything its members depend on, transitively.
    pub fn closure(&self) -> MakeSet {
        let mut closed = *self;
        loop {
            let before = closed;
            for make in before.iter() {
                for dep in make.dependencies() {
                    closed.insert(*dep);
                }
            }
            if closed == before {
                return closed;
            }
        }
    }
}

impl FromIterator<Make> for MakeSet {
    fn from_iter<I: IntoIterator<Item = Make>>(iter: I) -> Self {
        let mut set = MakeSet::empty();
        for make in iter {
            set.insert(make);
        }
        set
    }
}

impl fmt::Debug for MakeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for MakeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for MakeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let makes = Vec::<Make>::deserialize(deserializer)?;
        Ok(makes.into_iter().collect())
    }
}
