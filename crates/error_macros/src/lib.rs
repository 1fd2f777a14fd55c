//! Provides macros for consistent reporting of errors in the adt workspace.

/// `internal_error!` should be used whenever an invariant of the derivation pipeline is broken.
/// The driver catches the resulting panic at the boundary of the type being derived and defers
/// that type to a later round, so it must never be used for problems in user declarations.
#[macro_export]
macro_rules! internal_error {
    () => ({
        panic!("An internal expectation of the adt derivation pipeline was broken.");
    });
    ($($arg:tt)*) => ({
        panic!(
            "An internal expectation of the adt derivation pipeline was broken.\n\
             This is definitely a bug in adt.\n\
             {}",
            format_args!($($arg)*)
        );
    })
}

/// `user_error!` should only be used in extreme cases where no other error handling is possible
/// (the CLI entry point, mostly). Everything else reports a `Problem`.
#[macro_export]
macro_rules! user_error {
    ($($arg:tt)*) => ({
        eprintln!("{}", format_args!($($arg)*));
        std::process::exit(1);
    })
}

#[cfg(test)]
mod test {
    #[test]
    #[should_panic(expected = "broken")]
    fn internal_error_panics_with_context() {
        internal_error!("invariant {} is broken", 1);
    }
}
