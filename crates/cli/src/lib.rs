//! Provides the core CLI functionality for the adt binary.
#![warn(clippy::dbg_macro)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use adt_config::Flavour;
use adt_derive::Registry;
use adt_error_macros::user_error;
use adt_load::{load, DeriveJob, LoadResult, Threading, TypeRequest};
use adt_problem::{Problem, Severity};
use adt_reflect::Snapshot;
use adt_types::QualifiedName;
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use strum::IntoEnumIterator;

pub const CMD_DERIVE: &str = "derive";
pub const CMD_CHECK: &str = "check";

pub const FLAG_JOB: &str = "job";
pub const FLAG_OUT: &str = "out";
pub const FLAG_FLAVOUR: &str = "flavour";
pub const FLAG_MAX_THREADS: &str = "max-threads";
pub const SNAPSHOT_FILE: &str = "SNAPSHOT_FILE";
pub const TYPES: &str = "TYPES";

const GENERATED_EXTENSION: &str = "java";

pub fn build_app() -> Command {
    let snapshot_file = Arg::new(SNAPSHOT_FILE)
        .help("A JSON file holding the declarations of the data types and everything they refer to")
        .value_parser(value_parser!(PathBuf))
        .required(true);

    let types = Arg::new(TYPES)
        .help("The fully qualified names of the data types to derive\n(Appended to the types of --job.)")
        .action(ArgAction::Append)
        .num_args(1..)
        .required(false);

    let flag_job = Arg::new(FLAG_JOB)
        .long(FLAG_JOB)
        .help("A JSON file with the default configuration and the types to derive")
        .value_parser(value_parser!(PathBuf))
        .required(false);

    let flag_flavour = Arg::new(FLAG_FLAVOUR)
        .long(FLAG_FLAVOUR)
        .help("The library family the derived code refers to\n(Overrides the defaults of --job; configuration on a type still wins.)")
        .value_parser(PossibleValuesParser::new(
            Flavour::iter().map(<&'static str>::from),
        ))
        .required(false);

    let flag_max_threads = Arg::new(FLAG_MAX_THREADS)
        .long(FLAG_MAX_THREADS)
        .help("Limit the number of threads (and hence cores) used during derivation")
        .value_parser(value_parser!(usize))
        .required(false);

    Command::new("adt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Derives constructors, matchers, folds, accessors and instances of algebraic data types")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_DERIVE)
                .about("Derive code for the given types and write one source file per generated class")
                .arg(
                    Arg::new(FLAG_OUT)
                        .long(FLAG_OUT)
                        .help("The directory to write the generated sources into\n(Sources are printed to stdout when this is omitted.)")
                        .value_parser(value_parser!(PathBuf))
                        .required(false),
                )
                .arg(flag_job.clone())
                .arg(flag_flavour.clone())
                .arg(flag_max_threads.clone())
                .arg(snapshot_file.clone())
                .arg(types.clone()),
        )
        .subcommand(
            Command::new(CMD_CHECK)
                .about("Report the problems of the given types without writing anything")
                .arg(flag_job)
                .arg(flag_flavour)
                .arg(flag_max_threads)
                .arg(snapshot_file)
                .arg(types),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveMode {
    /// Print the generated sources.
    Print,
    /// Write the generated sources under a directory.
    Write,
    /// Only report problems.
    Check,
}

/// Runs `derive` or `check`, returning the process exit code.
pub fn derive(matches: &ArgMatches, mode: DeriveMode) -> io::Result<i32> {
    let start_time = Instant::now();

    let threading = match matches.get_one::<usize>(FLAG_MAX_THREADS) {
        None => Threading::AllAvailable,
        Some(0) => user_error!("cannot derive with at most 0 threads"),
        Some(1) => Threading::Single,
        Some(n) => Threading::AtMost(*n),
    };

    let snapshot_path = required_path(matches, SNAPSHOT_FILE);
    let snapshot: Snapshot = read_json(snapshot_path)?;
    let job = job(matches)?;
    if job.types.is_empty() {
        eprintln!(
            "\nNo data types to derive. Name them after {} or list them in a --{} file.\n",
            snapshot_path.display(),
            FLAG_JOB
        );
        return Ok(1);
    }

    let result = load(&job, &snapshot, &Registry::builtin(), threading);

    match mode {
        DeriveMode::Check => {}
        DeriveMode::Print => {
            for unit in result.units.iter() {
                println!("{}", unit.render());
            }
        }
        DeriveMode::Write => {
            let out_dir = required_path(matches, FLAG_OUT);
            for path in write_units(&result, out_dir)? {
                tracing::debug!(path = %path.display(), "written");
            }
        }
    }

    let problems = print_problems(&result, start_time.elapsed());
    Ok(if problems.errors > 0 { 1 } else { 0 })
}

fn required_path<'m>(matches: &'m ArgMatches, id: &str) -> &'m Path {
    match matches.get_one::<PathBuf>(id) {
        Some(path) => path,
        None => user_error!("the argument {} is required", id),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<T> {
    let text = fs::read_to_string(path).map_err(|error| {
        io::Error::new(
            error.kind(),
            format!("cannot read {}: {}", path.display(), error),
        )
    })?;
    serde_json::from_str(&text).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is not a valid declaration file: {}", path.display(), error),
        )
    })
}

/// The job file, if any, extended with the types named on the command line.
fn job(matches: &ArgMatches) -> io::Result<DeriveJob> {
    let mut job = match matches.get_one::<PathBuf>(FLAG_JOB) {
        Some(path) => read_json(path)?,
        None => DeriveJob::default(),
    };

    if let Some(flavour) = matches.get_one::<String>(FLAG_FLAVOUR) {
        job.defaults.flavour = Flavour::iter().find(|f| <&str>::from(*f) == flavour.as_str());
    }

    if let Some(types) = matches.get_many::<String>(TYPES) {
        job.types.extend(types.map(|name| TypeRequest {
            name: QualifiedName::from(name.as_str()),
            config: Default::default(),
        }));
    }

    Ok(job)
}

/// Where a generated class goes under `out_dir`: one directory per package segment.
pub fn unit_path(out_dir: &Path, name: &QualifiedName) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    let package = name.package();
    if !package.is_empty() {
        path.extend(package.split('.'));
    }
    path.push(format!("{}.{}", name.simple_name(), GENERATED_EXTENSION));
    path
}

/// Writes every generated class to its own file, returning the paths written.
pub fn write_units(result: &LoadResult, out_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(result.units.len());
    for unit in result.units.iter() {
        let path = unit_path(out_dir, &unit.target.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, unit.render())?;
        written.push(path);
    }
    Ok(written)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Problems {
    pub errors: usize,
    pub warnings: usize,
}

impl Problems {
    pub fn of(result: &LoadResult) -> Self {
        let mut problems = Problems::default();
        for problem in result.problems.iter() {
            match problem.severity() {
                Severity::Error => problems.errors += 1,
                Severity::Warning => problems.warnings += 1,
            }
        }
        problems
    }
}

fn print_problems(result: &LoadResult, total_time: Duration) -> Problems {
    const GREEN: usize = 32;
    const YELLOW: usize = 33;

    for report in result.reports() {
        eprintln!("{report}");
    }

    let problems = Problems::of(result);
    eprintln!(
        "\x1B[{}m{}\x1B[39m {} and \x1B[{}m{}\x1B[39m {} found in {} ms",
        match problems.errors {
            0 => GREEN,
            _ => YELLOW,
        },
        problems.errors,
        match problems.errors {
            1 => "error",
            _ => "errors",
        },
        match problems.warnings {
            0 => GREEN,
            _ => YELLOW,
        },
        problems.warnings,
        match problems.warnings {
            1 => "warning",
            _ => "warnings",
        },
        total_time.as_millis(),
    );

    problems
}

#[cfg(test)]
mod test;
