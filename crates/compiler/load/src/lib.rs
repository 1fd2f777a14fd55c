//! Drives the derivation of many data types.
//!
//! Derivation goes in rounds. Each round parses and derives every pending type against the
//! declarations available in that round. A type whose dependencies are missing, or whose
//! derivation faulted, is kept for the next round; any other outcome is final. Problems of
//! deferred types are only reported once no further round will run.
#![warn(clippy::dbg_macro)]

mod work;

#[cfg(test)]
mod test;

use std::panic::{self, AssertUnwindSafe};

use adt_config::{ConfigLayer, DeriveConfig};
use adt_derive::{derive_adt, Derived, Registry};
use adt_emit::CompilationUnit;
use adt_parse::parse_adt;
use adt_problem::{DeriveProblem, ElementRef, Problem, Report, Severity};
use adt_reflect::Universe;
use adt_region::Region;
use adt_types::QualifiedName;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Threading {
    Single,
    AllAvailable,
    AtMost(usize),
}

/// A data type to derive, with the configuration declared on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRequest {
    pub name: QualifiedName,
    #[serde(default)]
    pub config: ConfigLayer,
}

/// Everything one run derives: package-wide defaults, then the types themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveJob {
    #[serde(default)]
    pub defaults: ConfigLayer,
    pub types: Vec<TypeRequest>,
}

impl DeriveJob {
    /// A job deriving `names` with the default configuration.
    pub fn of_types<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<QualifiedName>,
    {
        Self {
            defaults: ConfigLayer::default(),
            types: names
                .into_iter()
                .map(|name| TypeRequest {
                    name: name.into(),
                    config: ConfigLayer::default(),
                })
                .collect(),
        }
    }
}

struct Pending {
    name: QualifiedName,
    config: DeriveConfig,
    /// Why the previous round deferred the type.
    deferred_by: Option<DeriveProblem>,
}

/// What became of the types of one round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub derived: usize,
    pub failed: usize,
    pub deferred: usize,
}

impl RoundSummary {
    /// Whether some type left the retry queue.
    pub fn made_progress(&self) -> bool {
        self.derived + self.failed > 0
    }
}

/// The outcome of a whole run.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Generated classes, types in request order (per round), each type's classes in order.
    pub units: Vec<CompilationUnit>,
    /// Errors and warnings, in the order they were found.
    pub problems: Vec<DeriveProblem>,
}

impl LoadResult {
    pub fn has_errors(&self) -> bool {
        self.problems
            .iter()
            .any(|problem| problem.severity() == Severity::Error)
    }

    pub fn reports(&self) -> Vec<Report> {
        self.problems.iter().flat_map(|problem| problem.reports()).collect()
    }
}

/// The retry queue and the diagnostics accumulated so far.
pub struct Loader<'r> {
    registry: &'r Registry,
    threading: Threading,
    pending: Vec<Pending>,
    round: usize,
    result: LoadResult,
}

impl<'r> Loader<'r> {
    pub fn new(registry: &'r Registry, threading: Threading) -> Self {
        Self {
            registry,
            threading,
            pending: Vec::new(),
            round: 0,
            result: LoadResult::default(),
        }
    }

    /// Queues the types of `job` for the next round.
    pub fn request(&mut self, job: &DeriveJob) {
        for request in job.types.iter() {
            self.pending.push(Pending {
                name: request.name.clone(),
                config: DeriveConfig::from_layers([&job.defaults, &request.config]),
                deferred_by: None,
            });
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &QualifiedName> {
        self.pending.iter().map(|pending| &pending.name)
    }

    /// Derives every pending type against `universe`. Deferred types stay pending.
    pub fn round(&mut self, universe: &dyn Universe) -> RoundSummary {
        self.run_round(universe, false)
    }

    /// Runs a last round, in which deferred types fail for good.
    pub fn finish(mut self, universe: &dyn Universe) -> LoadResult {
        if !self.pending.is_empty() {
            self.run_round(universe, true);
        }
        debug_assert!(self.pending.is_empty());
        self.result
    }

    fn run_round(&mut self, universe: &dyn Universe, last: bool) -> RoundSummary {
        self.round += 1;
        let _span = tracing::debug_span!("round", round = self.round, last).entered();

        let pending = std::mem::take(&mut self.pending);
        let outcomes = work::run(self.threading, &pending, |pending| {
            derive_guarded(self.registry, universe, &pending.name, &pending.config)
        });

        let mut summary = RoundSummary::default();
        for (mut pending, outcome) in pending.into_iter().zip(outcomes) {
            match outcome {
                Ok(derived) => {
                    tracing::debug!(adt = %pending.name, units = derived.units.len(), "derived");
                    summary.derived += 1;
                    self.result.units.extend(derived.units);
                    self.result.problems.extend(derived.warnings);
                }
                Err(problem) if problem.is_deferrable() && !last => {
                    tracing::debug!(adt = %pending.name, %problem, "deferred");
                    summary.deferred += 1;
                    pending.deferred_by = Some(problem);
                    self.pending.push(pending);
                }
                Err(problem) => {
                    tracing::debug!(adt = %pending.name, %problem, "failed");
                    summary.failed += 1;
                    self.result.problems.push(problem);
                }
            }
        }

        adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_LOAD_LOG, {
            eprintln!(
                "round {}{}: {} derived, {} failed, {} deferred",
                self.round,
                if last { " (last)" } else { "" },
                summary.derived,
                summary.failed,
                summary.deferred
            );
            for pending in self.pending.iter() {
                if let Some(problem) = &pending.deferred_by {
                    eprintln!("    {}: {}", pending.name, problem);
                }
            }
        });

        summary
    }
}

/// Derives every type of `job` against one set of declarations: rounds run while they make
/// progress, then a last round settles the remaining types.
pub fn load(
    job: &DeriveJob,
    universe: &dyn Universe,
    registry: &Registry,
    threading: Threading,
) -> LoadResult {
    let mut loader = Loader::new(registry, threading);
    loader.request(job);
    while loader.pending().next().is_some() {
        if !loader.round(universe).made_progress() {
            break;
        }
    }
    loader.finish(universe)
}

fn derive_one(
    registry: &Registry,
    universe: &dyn Universe,
    name: &QualifiedName,
    config: &DeriveConfig,
) -> Result<Derived, DeriveProblem> {
    let decl = universe
        .type_decl(name)
        .ok_or_else(|| DeriveProblem::DependencyUnavailable {
            element: ElementRef::of_type(name, Region::zero()),
            name: name.clone(),
        })?;
    let adt = parse_adt(decl, universe, config)?;
    derive_adt(registry, &adt, universe, config)
}

/// A panic while deriving one type is a problem of that type only.
fn derive_guarded(
    registry: &Registry,
    universe: &dyn Universe,
    name: &QualifiedName,
    config: &DeriveConfig,
) -> Result<Derived, DeriveProblem> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        derive_one(registry, universe, name, config)
    })) {
        Ok(outcome) => outcome,
        Err(payload) => Err(DeriveProblem::Internal {
            decl: ElementRef::of_type(name, Region::zero()),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "derivation panicked".to_string()
    }
}
