//! Derivation of the code that makes an algebraic data type usable: constructors, matchers,
//! folds, accessors and instances.
//!
//! Each artifact family is produced by a [Deriver] looked up in a [Registry] by its
//! [DeriveKey]. Derivers never see each other's output; [derive_adt] appends their fragments
//! in a fixed order, so the derived code of a type depends on nothing but its model and
//! configuration.
#![warn(clippy::dbg_macro)]

pub mod accessors;
pub mod cata;
mod constructors;
mod factory;
mod instances;
mod lazy;
mod pattern_match;
mod registry;
mod util;


use adt_config::{DeriveConfig, TargetClass};
use adt_derive_key::{DeriveKey, Make};
use adt_emit::{CompilationUnit, DerivedCode, OutputTarget};
use adt_model::AlgebraicDataType;
use adt_problem::DeriveProblem;
use adt_reflect::{Universe, Visibility};
use adt_types::QualifiedName;

pub use registry::{Deriver, Registry};
pub use util::{DeriveEnv, Handler};

/// Everything derived for one data type.
#[derive(Debug)]
pub struct Derived {
    /// The companion class first, then classes of their own for instances requested there.
    pub units: Vec<CompilationUnit>,
    pub warnings: Vec<DeriveProblem>,
}

pub fn derive_adt(
    registry: &Registry,
    adt: &AlgebraicDataType,
    universe: &dyn Universe,
    config: &DeriveConfig,
) -> Result<Derived, DeriveProblem> {
    let mut env = DeriveEnv::new(adt, config, universe);
    let companion = env.target.clone();

    let mut makes = config.make.closure();
    if !config.instances.is_empty() {
        // instances dispatch through the matchers
        makes.insert(Make::PatternMatching);
    }

    let mut code = DerivedCode::default();
    for make in makes.iter() {
        code.append(run(registry, &mut env, DeriveKey::Make(make))?);
    }
    let mut units = vec![unit(adt, config, companion.clone(), code)];

    for request in config.instances.iter() {
        let class = match &request.in_class {
            Some(in_class) => TargetClass {
                in_class: in_class.clone(),
                extend: None,
            }
            .class_name(adt.name()),
            None => companion.clone(),
        };
        env.unit = class.clone();

        let mut code = DerivedCode::default();
        for builtin in request.builtins.iter() {
            code.append(run(registry, &mut env, DeriveKey::Instance(*builtin))?);
        }
        match units.iter_mut().find(|unit| unit.target.name == class) {
            Some(existing) => existing.code.append(code),
            None => {
                let mut separate = unit(adt, config, class, code);
                separate.target.extends = None;
                units.push(separate);
            }
        }
    }

    for unit in units.iter() {
        adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_DERIVED, {
            eprintln!("{}", unit.render());
        });
        tracing::debug!(
            adt = %adt.name(),
            unit = %unit.target.name,
            types = unit.code.types.len(),
            methods = unit.code.methods.len(),
            "derived"
        );
    }

    Ok(Derived {
        units,
        warnings: env.warnings,
    })
}

fn run(
    registry: &Registry,
    env: &mut DeriveEnv<'_>,
    key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    match registry.get(key, env.config.flavour) {
        Some(deriver) => {
            let _span = tracing::trace_span!("derive", key = %key.debug_name()).entered();
            deriver(env, key)
        }
        None => {
            tracing::debug!(key = %key.debug_name(), "no deriver registered");
            Ok(DerivedCode::default())
        }
    }
}

/// Generated classes are never more visible than the data type, and never private.
fn unit(
    adt: &AlgebraicDataType,
    config: &DeriveConfig,
    name: QualifiedName,
    code: DerivedCode,
) -> CompilationUnit {
    let visibility = match adt.type_constructor.visibility {
        Visibility::Public => Visibility::Public,
        Visibility::Protected | Visibility::Package | Visibility::Private => Visibility::Package,
    };
    CompilationUnit {
        origin: adt.name().clone(),
        target: OutputTarget {
            name,
            visibility,
            extends: config.target.extend.clone(),
        },
        code,
    }
}
