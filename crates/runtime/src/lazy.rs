use std::fmt;
use std::sync::OnceLock;

use adt_error_macros::internal_error;
use parking_lot::Mutex;

type Thunk<T> = Box<dyn FnOnce() -> Forced<T> + Send>;

/// What a lazy computation yields: a value, or another lazy value to keep unwrapping.
pub enum Forced<T> {
    Now(T),
    Later(Lazy<T>),
}

/// A value computed at most once, on first read, by whichever thread reads it first.
///
/// Reads after initialization take no lock. A computation that yields another unevaluated
/// [`Lazy`] is unwrapped in a loop until a value comes out, so long chains of lazy values do
/// not grow the stack.
pub struct Lazy<T> {
    value: OnceLock<T>,
    thunk: Mutex<Option<Thunk<T>>>,
}

impl<T> Lazy<T> {
    pub fn new(f: impl FnOnce() -> T + Send + 'static) -> Self {
        Self::deferred(move || Forced::Now(f()))
    }

    pub fn deferred(f: impl FnOnce() -> Forced<T> + Send + 'static) -> Self {
        Self {
            value: OnceLock::new(),
            thunk: Mutex::new(Some(Box::new(f))),
        }
    }

    pub fn evaluated(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
            thunk: Mutex::new(None),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn force(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }

        let mut thunk = self.thunk.lock();
        // Another thread may have evaluated it while this one waited for the lock.
        if let Some(value) = self.value.get() {
            return value;
        }
        let Some(f) = thunk.take() else {
            internal_error!("a lazy value has neither a value nor a thunk; its evaluation must have panicked");
        };
        let value = unwrap_chain(f());
        self.value.get_or_init(move || value)
    }

    /// Takes the value out, evaluating only as far as needed to get it.
    fn into_forced(self) -> Forced<T> {
        if let Some(value) = self.value.into_inner() {
            return Forced::Now(value);
        }
        match self.thunk.into_inner() {
            Some(f) => f(),
            None => internal_error!("a lazy value has neither a value nor a thunk"),
        }
    }
}

fn unwrap_chain<T>(mut forced: Forced<T>) -> T {
    loop {
        match forced {
            Forced::Now(value) => return value,
            Forced::Later(lazy) => forced = lazy.into_forced(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Lazy").field(value).finish(),
            None => f.write_str("Lazy(<unevaluated>)"),
        }
    }
}
