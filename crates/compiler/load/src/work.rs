//! Runs the jobs of one round, on the calling thread or on a pool of scoped workers.
use crossbeam::deque::{Injector, Steal};
use crossbeam::thread;
use parking_lot::Mutex;

use crate::Threading;

enum Threads {
    Single,
    Many(usize),
}

fn threads(threading: Threading, jobs: usize) -> Threads {
    let available = match std::thread::available_parallelism() {
        Ok(available) => available.get(),
        Err(_) => return Threads::Single,
    };
    let wanted = match threading {
        Threading::Single => 1,
        Threading::AllAvailable => available,
        Threading::AtMost(at_most) => Ord::min(available, at_most),
    };
    match Ord::min(wanted, jobs) {
        0 | 1 => Threads::Single,
        many => Threads::Many(many),
    }
}

/// `f` applied to every job. Results are in the order of `jobs`, whichever worker ran them.
pub(crate) fn run<T, R, F>(threading: Threading, jobs: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    match threads(threading, jobs.len()) {
        Threads::Single => jobs.iter().map(f).collect(),
        Threads::Many(workers) => run_parallel(workers, jobs, &f),
    }
}

fn run_parallel<T, R, F>(workers: usize, jobs: &[T], f: &F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let injector = Injector::new();
    for index in 0..jobs.len() {
        injector.push(index);
    }
    let results: Mutex<Vec<Option<R>>> = Mutex::new((0..jobs.len()).map(|_| None).collect());

    let scope = thread::scope(|scope| {
        for _ in 0..workers {
            let injector = &injector;
            let results = &results;
            scope.spawn(move |_| loop {
                match injector.steal() {
                    Steal::Success(index) => {
                        let result = f(&jobs[index]);
                        results.lock()[index] = Some(result);
                    }
                    Steal::Retry => continue,
                    Steal::Empty => break,
                }
            });
        }
    });
    if scope.is_err() {
        adt_error_macros::internal_error!("a derivation worker panicked outside of a job");
    }

    results
        .into_inner()
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.unwrap_or_else(|| adt_error_macros::internal_error!("job {index} never ran"))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn results_keep_job_order() {
        let jobs: Vec<u64> = (0..100).collect();

        let squares = run(Threading::AtMost(4), &jobs, |n| n * n);

        assert_eq!(squares, jobs.iter().map(|n| n * n).collect::<Vec<_>>());
    }

    #[test]
    fn no_jobs() {
        let squares = run(Threading::AllAvailable, &[] as &[u64], |n| n * n);

        assert!(squares.is_empty());
    }
}
