//! Production implementation of RaceEnv using the system clock.

use crate::RaceEnv;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Production environment backed by the OS clock and scheduler.
///
/// Time comes from `Instant`, pacing from `thread::sleep`.
#[derive(Debug)]
pub struct SystemEnv {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl SystemEnv {
    /// Creates a new SystemEnv.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped environment for sharing across workers.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceEnv for SystemEnv {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_env_time() {
        let env = SystemEnv::new();
        let t1 = env.now();
        env.sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_system_env_seed() {
        let env = SystemEnv::new();
        assert_eq!(env.seed(), 0);
    }
}
