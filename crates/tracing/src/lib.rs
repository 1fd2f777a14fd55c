//! Utilities for turning on tracing in user-facing or test executables of adt.
//!
//! Tracing is controlled with the ADT_LOG environment variable.
//! If ADT_LOG is specified, logs are written to stderr. If ADT_LOGTO=<filepath> is also specified,
//! logs are instead written to <filepath>.
//!
//! See [directive-syntax] for the filtering directive syntax, e.g.
//! `ADT_LOG=adt_parse=debug,adt_unify=trace`.
//!
//! Library crates use the `tracing` macros directly; only executables depend on this crate.
//!
//! Tracing is only turned on in debug builds. Use the provided [setup_tracing] macro to turn on
//! tracing at an executable's entry point.
//!
//! [directive-syntax]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives

/// Sets up tracing of an adt executable. The value of this macro must be bound to a variable that
/// is not dropped until tracing has completed.
///
/// This macro should only be invoked at an executable's entry point.
/// Tracing will only be enabled in debug builds.
#[macro_export]
macro_rules! setup_tracing {
    () => {
        if cfg!(debug_assertions) {
            $crate::setup_tracing()
        } else {
            $crate::TracingGuards::NONE
        }
    };
}

pub use tracing::debug;
pub use tracing::info;
pub use tracing::warn;

const ENV_FILTER: &str = "ADT_LOG";
const LOGTO_VAR: &str = "ADT_LOGTO";

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Guards issued by the underlying library used for tracing.
/// Must not be dropped until all tracing is complete.
pub struct TracingGuards {
    _file_appender_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl TracingGuards {
    pub const NONE: TracingGuards = TracingGuards {
        _file_appender_guard: None,
    };
}

/// Where trace output goes, decided from the environment.
enum Sink {
    Stderr,
    File(String),
}

impl Sink {
    fn from_env() -> Self {
        match std::env::var(LOGTO_VAR) {
            Ok(file) if !file.is_empty() => Sink::File(file),
            _ => Sink::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_FILTER).unwrap_or_else(|_| EnvFilter::new("off"))
}

#[must_use]
pub fn setup_tracing() -> TracingGuards {
    match Sink::from_env() {
        Sink::File(file) => {
            let _ = std::fs::remove_file(&file);
            let file_appender = tracing_appender::rolling::never(".", file);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::Layer::default()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter());

            Registry::default().with(file_layer).init();

            TracingGuards {
                _file_appender_guard: Some(guard),
            }
        }
        Sink::Stderr => {
            let stderr_layer = fmt::Layer::default()
                .with_writer(std::io::stderr)
                .without_time()
                .with_filter(env_filter());

            Registry::default().with(stderr_layer).init();

            TracingGuards::NONE
        }
    }
}

/// Routes trace output through the test harness' captured output. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn setup_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .without_time()
        .try_init();
}
