//! Completion counter and signal.
//!
//! Counts retired workers and wakes the monitor when the last one retires.
//!
//! | Operation          | Cost                    |
//! |--------------------|-------------------------|
//! | retire()           | Lock + notify_all       |
//! | retired()          | Lock                    |
//! | wait_for_all(t)    | Condvar wait, at most t |
//!
//! Workers hold a [`Retirement`] guard for their whole loop, so a worker
//! that panics still retires and the monitor cannot wait forever.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
pub struct CompletionCounter {
    total: usize,
    retired: Mutex<usize>,
    all_retired: Condvar,
}

impl CompletionCounter {
    /// Creates a counter expecting `total` workers.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            retired: Mutex::new(0),
            all_retired: Condvar::new(),
        }
    }

    /// Lock with poison recovery.
    ///
    /// Retirement runs from a drop guard during unwinding; panicking here
    /// would abort the process.
    fn lock_or_recover(&self) -> MutexGuard<'_, usize> {
        match self.retired.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Records one retired worker. Saturates at the field size.
    pub fn retire(&self) {
        let mut retired = self.lock_or_recover();
        if *retired >= self.total {
            warn!(total = self.total, "retirement beyond field size ignored");
            return;
        }
        *retired += 1;
        drop(retired);
        self.all_retired.notify_all();
    }

    /// Current number of retired workers.
    pub fn retired(&self) -> usize {
        *self.lock_or_recover()
    }

    /// Waits up to `timeout` for every worker to retire.
    ///
    /// Returns `true` as soon as all workers have retired.
    pub fn wait_for_all(&self, timeout: Duration) -> bool {
        let guard = self.lock_or_recover();
        let (guard, _) = match self
            .all_retired
            .wait_timeout_while(guard, timeout, |retired| *retired < self.total)
        {
            Ok(result) => result,
            Err(poison) => poison.into_inner(),
        };
        *guard >= self.total
    }

    /// Guard that retires one worker when dropped.
    pub fn enlist(&self) -> Retirement<'_> {
        Retirement { counter: self }
    }
}

/// Retires its worker exactly once, on drop.
#[must_use = "dropping the guard retires the worker immediately"]
pub struct Retirement<'a> {
    counter: &'a CompletionCounter,
}

impl Drop for Retirement<'_> {
    fn drop(&mut self) {
        self.counter.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_counts_retirements() {
        let counter = CompletionCounter::new(2);
        assert_eq!(counter.retired(), 0);

        counter.retire();
        counter.retire();

        assert_eq!(counter.retired(), 2);
    }

    #[test]
    fn test_extra_retirement_saturates() {
        let counter = CompletionCounter::new(1);
        counter.retire();
        counter.retire();

        assert_eq!(counter.retired(), 1);
        assert!(counter.wait_for_all(Duration::ZERO));
    }

    #[test]
    fn test_extra_retirement_while_unwinding_does_not_abort() {
        let counter = Arc::new(CompletionCounter::new(1));
        counter.retire();
        let worker = {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let _retirement = counter.enlist();
                panic!("worker blew up after the field was complete");
            })
        };

        assert!(worker.join().is_err());
        assert_eq!(counter.retired(), 1);
    }

    #[test]
    fn test_wait_times_out_when_incomplete() {
        let counter = CompletionCounter::new(1);
        let start = Instant::now();

        assert!(!counter.wait_for_all(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_returns_immediately_when_complete() {
        let counter = CompletionCounter::new(1);
        counter.retire();
        assert!(counter.wait_for_all(Duration::from_secs(60)));
    }

    #[test]
    fn test_guard_retires_on_panic() {
        let counter = Arc::new(CompletionCounter::new(1));
        let worker = {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let _retirement = counter.enlist();
                panic!("worker blew up");
            })
        };

        assert!(worker.join().is_err());
        assert!(counter.wait_for_all(Duration::from_secs(5)));
    }

    #[test]
    fn test_wakes_waiter_from_many_threads() {
        let counter = Arc::new(CompletionCounter::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let _retirement = counter.enlist();
                    thread::sleep(Duration::from_millis(2));
                })
            })
            .collect();

        assert!(counter.wait_for_all(Duration::from_secs(10)));
        assert_eq!(counter.retired(), 16);
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
