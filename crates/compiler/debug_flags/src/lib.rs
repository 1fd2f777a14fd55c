//! Flags for debugging the derivation pipeline.
//!
//! Each flag is an environment variable read in debug builds only. To watch the constraint
//! solving behind the GADT tests:
//!
//! ```bash
//! ADT_PRINT_UNIFICATIONS=1 cargo test -p test_derive
//! ```
//!
//! `0` counts as unset. Release builds never read the environment, and the body of `dbg_do!`
//! is compiled out of them.

/// Whether `flag` is set to anything but `0`. Always false in release builds.
#[doc(hidden)]
pub fn is_set(flag: &str) -> bool {
    if cfg!(debug_assertions) {
        matches!(std::env::var(flag), Ok(value) if value != "0")
    } else {
        false
    }
}

#[macro_export]
macro_rules! dbg_set {
    ($flag:path) => {
        $crate::is_set($flag)
    };
}

#[macro_export]
macro_rules! dbg_do {
    ($flag:path, $expr:expr) => {
        #[cfg(debug_assertions)]
        {
            if $crate::is_set($flag) {
                $expr
            }
        }
    };
}

macro_rules! flags {
    ($(#[doc = $doc:expr] $flag:ident)*) => {
        $(
            #[doc = $doc]
            pub static $flag: &str = stringify!($flag);
        )*

        /// Every flag, in pipeline order.
        pub static ALL_FLAGS: &[&str] = &[$(stringify!($flag)),*];
    };
}

flags! {
    /// Prints both sides of every unification and the substitution it produced.
    ADT_PRINT_UNIFICATIONS

    /// Prints the provider sites and members tried while looking for an instance.
    ADT_PRINT_INSTANCE_SEARCH

    /// Prints the model recovered from each visitor-encoded declaration.
    ADT_PRINT_PARSED_ADT

    /// Prints the rendered source of every derived compilation unit.
    ADT_PRINT_DERIVED

    /// Prints what each round derived, failed and deferred, with the reasons for deferral.
    ADT_PRINT_LOAD_LOG
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_name_their_env_vars() {
        assert_eq!(ADT_PRINT_PARSED_ADT, "ADT_PRINT_PARSED_ADT");
        assert_eq!(ALL_FLAGS.len(), 5);
        assert!(ALL_FLAGS.iter().all(|flag| flag.starts_with("ADT_PRINT_")));
    }

    #[test]
    fn zero_means_unset() {
        let flag = "ADT_TEST_ONLY_ZERO_MEANS_UNSET";
        assert!(!dbg_set!(flag));

        std::env::set_var(flag, "0");
        assert!(!dbg_set!(flag));

        std::env::set_var(flag, "1");
        assert_eq!(dbg_set!(flag), cfg!(debug_assertions));
        std::env::remove_var(flag);
    }
}
