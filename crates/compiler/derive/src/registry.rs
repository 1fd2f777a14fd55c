use adt_collections::VecMap;
use adt_config::Flavour;
use adt_derive_key::{DeriveBuiltin, DeriveKey, Make};
use adt_emit::DerivedCode;
use adt_problem::DeriveProblem;
use strum::IntoEnumIterator;

use crate::util::DeriveEnv;

/// Produces the code of one artifact family for the data type of `env`.
pub type Deriver = fn(&mut DeriveEnv<'_>, DeriveKey) -> Result<DerivedCode, DeriveProblem>;

/// Derivers by key, optionally specialized per flavour.
///
/// A deriver registered for a specific flavour wins over one registered for every flavour.
#[derive(Clone, Default)]
pub struct Registry {
    derivers: VecMap<(DeriveKey, Option<Flavour>), Deriver>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in deriver, registered for every flavour.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for make in Make::iter() {
            let deriver: Deriver = match make {
                Make::Constructors => crate::constructors::derive_constructors,
                Make::LazyConstructor => crate::lazy::derive_lazy,
                Make::PatternMatching => crate::pattern_match::derive_pattern_matching,
                Make::Getters | Make::Modifiers => crate::accessors::derive_accessors,
                Make::Catamorphism => crate::cata::derive_cata,
                Make::Factory => crate::factory::derive_factory,
            };
            registry.register(DeriveKey::Make(make), None, deriver);
        }
        for builtin in DeriveBuiltin::iter() {
            registry.register(
                DeriveKey::Instance(builtin),
                None,
                crate::instances::derive_instance,
            );
        }
        registry
    }

    /// Registers `deriver`, replacing the one previously registered under the same key.
    pub fn register(&mut self, key: DeriveKey, flavour: Option<Flavour>, deriver: Deriver) {
        self.derivers.insert((key, flavour), deriver);
    }

    pub fn get(&self, key: DeriveKey, flavour: Flavour) -> Option<Deriver> {
        self.derivers
            .get(&(key, Some(flavour)))
            .or_else(|| self.derivers.get(&(key, None)))
            .copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use adt_emit::MethodSpec;
    use adt_reflect::Visibility;

    fn marker(_: &mut DeriveEnv<'_>, _: DeriveKey) -> Result<DerivedCode, DeriveProblem> {
        Ok(DerivedCode {
            methods: vec![MethodSpec::function("marker", Visibility::Public)],
            ..DerivedCode::default()
        })
    }

    #[test]
    fn every_key_has_a_builtin() {
        let registry = Registry::builtin();

        for make in Make::iter() {
            assert!(registry.get(DeriveKey::Make(make), Flavour::Jdk).is_some());
        }
        for builtin in DeriveBuiltin::iter() {
            assert!(registry.get(DeriveKey::Instance(builtin), Flavour::Fj).is_some());
        }
    }

    #[test]
    fn flavour_specific_deriver_wins() {
        let key = DeriveKey::Make(Make::Factory);
        let mut registry = Registry::builtin();
        registry.register(key, Some(Flavour::Vavr), marker);

        let address = |deriver: Option<Deriver>| deriver.map(|d| d as usize);
        assert_eq!(address(registry.get(key, Flavour::Vavr)), Some(marker as Deriver as usize));
        assert_ne!(address(registry.get(key, Flavour::Jdk)), Some(marker as Deriver as usize));
        assert!(Registry::empty().get(key, Flavour::Jdk).is_none());
    }
}
