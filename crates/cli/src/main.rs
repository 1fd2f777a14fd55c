//! The `adt` binary that derives the code of algebraic data types.
use adt_cli::{build_app, derive, DeriveMode, CMD_CHECK, CMD_DERIVE, FLAG_OUT};
use std::io;

fn main() -> io::Result<()> {
    let _tracing_guards = adt_tracing::setup_tracing!();

    let matches = build_app().get_matches();

    let exit_code = match matches.subcommand() {
        Some((CMD_DERIVE, matches)) => {
            let mode = if matches.contains_id(FLAG_OUT) {
                DeriveMode::Write
            } else {
                DeriveMode::Print
            };
            derive(matches, mode)?
        }
        Some((CMD_CHECK, matches)) => derive(matches, DeriveMode::Check)?,
        _ => unreachable!(),
    };

    std::process::exit(exit_code);
}
