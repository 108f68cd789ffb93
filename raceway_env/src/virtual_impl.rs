//! Virtual environment for fast, deterministic tests.

use crate::RaceEnv;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Environment with a manually advanced clock.
///
/// - `now()` only moves when [`VirtualEnv::advance_time`] is called
/// - `sleep()` never blocks; it yields the thread and records the pause
///
/// Worker threads share one instance, so the recorded pause total is the sum
/// over every racer.
#[derive(Debug, Default)]
pub struct VirtualEnv {
    /// Master seed (reported for logging only)
    seed: u64,

    /// Current virtual time in nanoseconds
    virtual_time_ns: AtomicU64,

    /// Total requested sleep in nanoseconds
    slept_ns: AtomicU64,

    /// Number of sleep calls
    sleeps: AtomicU64,
}

impl VirtualEnv {
    /// Creates a new VirtualEnv with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Creates an Arc-wrapped environment for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Total pause requested through `sleep()` by all callers.
    pub fn total_slept(&self) -> Duration {
        Duration::from_nanos(self.slept_ns.load(Ordering::SeqCst))
    }

    /// Number of `sleep()` calls made so far.
    pub fn sleep_calls(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl RaceEnv for VirtualEnv {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.virtual_time_ns.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.slept_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        std::thread::yield_now();
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_env_time() {
        let env = VirtualEnv::new(42);
        assert_eq!(env.now(), Duration::ZERO);

        env.advance_time(Duration::from_secs(1));
        assert_eq!(env.now(), Duration::from_secs(1));

        env.advance_time(Duration::from_millis(500));
        assert_eq!(env.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_sleep_does_not_move_clock() {
        let env = VirtualEnv::new(1);
        env.sleep(Duration::from_secs(60));
        env.sleep(Duration::from_secs(60));

        assert_eq!(env.now(), Duration::ZERO);
        assert_eq!(env.total_slept(), Duration::from_secs(120));
        assert_eq!(env.sleep_calls(), 2);
    }

    #[test]
    fn test_virtual_env_seed() {
        let env = VirtualEnv::new(12345);
        assert_eq!(env.seed(), 12345);
    }

    #[test]
    fn test_shared_env_across_threads() {
        let env = VirtualEnv::shared(0);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let env = Arc::clone(&env);
                std::thread::spawn(move || env.sleep(Duration::from_millis(5)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(env.sleep_calls(), 4);
        assert_eq!(env.total_slept(), Duration::from_millis(20));
    }
}
