use std::any::Any;
use std::marker::PhantomData;

use adt_error_macros::internal_error;

type Value = Box<dyn Any>;
type Continuation = Box<dyn FnOnce(Value) -> Step>;

enum Step {
    Done(Value),
    More(Box<dyn FnOnce() -> Step>),
    Then(Box<Step>, Continuation),
}

/// A computation that runs in constant stack space: each step either finishes or hands back
/// the next step to run.
///
/// This is what a fold's `delay` argument is for in derived code: recursive results are
/// suspended, and the caller's loop resumes them one bounce at a time. Continuations added
/// with [`map`](Trampoline::map) and [`flat_map`](Trampoline::flat_map) wait on the heap
/// while `run` works through the step they follow, so neither deep suspension nor long
/// chains of continuations grow the native stack.
pub struct Trampoline<T> {
    step: Step,
    result: PhantomData<fn() -> T>,
}

impl<T: 'static> Trampoline<T> {
    fn from_step(step: Step) -> Self {
        Trampoline {
            step,
            result: PhantomData,
        }
    }

    pub fn done(value: T) -> Self {
        Self::from_step(Step::Done(Box::new(value)))
    }

    pub fn suspend(next: impl FnOnce() -> Trampoline<T> + 'static) -> Self {
        Self::from_step(Step::More(Box::new(move || next().step)))
    }

    /// Continues with `f` once the computation is done, without forcing it now.
    pub fn flat_map<U: 'static>(
        self,
        f: impl FnOnce(T) -> Trampoline<U> + 'static,
    ) -> Trampoline<U> {
        let continuation: Continuation = Box::new(move |value| f(take::<T>(value)).step);
        Trampoline::from_step(Step::Then(Box::new(self.step), continuation))
    }

    /// Applies `f` once the computation is done, without forcing it now.
    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Trampoline<U> {
        self.flat_map(move |value| Trampoline::done(f(value)))
    }

    pub fn run(self) -> T {
        let mut continuations: Vec<Continuation> = Vec::new();
        let mut current = self.step;
        loop {
            current = match current {
                Step::Done(value) => match continuations.pop() {
                    Some(continuation) => continuation(value),
                    None => return take::<T>(value),
                },
                Step::More(next) => next(),
                Step::Then(step, continuation) => {
                    continuations.push(continuation);
                    *step
                }
            };
        }
    }
}

fn take<T: 'static>(value: Value) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => internal_error!(
            "a trampoline step produced a value of another type than {}",
            std::any::type_name::<T>()
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn is_even(n: u64) -> Trampoline<bool> {
        if n == 0 {
            Trampoline::done(true)
        } else {
            Trampoline::suspend(move || is_odd(n - 1))
        }
    }

    fn is_odd(n: u64) -> Trampoline<bool> {
        if n == 0 {
            Trampoline::done(false)
        } else {
            Trampoline::suspend(move || is_even(n - 1))
        }
    }

    #[test]
    fn deep_mutual_recursion() {
        assert!(is_even(1_000_000).run());
        assert!(is_odd(999_999).run());
    }

    #[test]
    fn map_is_lazy() {
        let counted = Trampoline::suspend(|| Trampoline::done(20)).map(|n| n + 1);

        assert_eq!(counted.run(), 21);
    }

    #[test]
    fn long_map_chains() {
        let mut sum = Trampoline::suspend(|| Trampoline::done(0u64));
        for _ in 0..500_000 {
            sum = sum.map(|n| n + 2);
        }

        assert_eq!(sum.run(), 1_000_000);
    }

    /// Like a fold: each level suspends its child and finishes once the child is done.
    fn depth(n: u64) -> Trampoline<u64> {
        if n == 0 {
            Trampoline::done(0)
        } else {
            Trampoline::suspend(move || depth(n - 1)).map(|d| d + 1)
        }
    }

    #[test]
    fn continuations_of_deep_suspensions() {
        assert_eq!(depth(300_000).run(), 300_000);
    }

    #[test]
    fn flat_map_changes_the_result_type() {
        let shown = is_even(10).flat_map(|even| {
            Trampoline::suspend(move || Trampoline::done(if even { "even" } else { "odd" }))
        });

        assert_eq!(shown.run(), "even");
    }
}
