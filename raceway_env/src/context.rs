//! Core environment trait for race workers.

use std::time::Duration;

/// The interface between the race core and the real world.
///
/// Every worker thread paces itself through [`RaceEnv::sleep`] and the
/// completion monitor stamps its snapshots with [`RaceEnv::now`].
///
/// # Implementations
///
/// - **Production**: `SystemEnv` - wraps `Instant` and `thread::sleep`
/// - **Testing**: `VirtualEnv` - manually advanced clock, sleep never blocks
pub trait RaceEnv: Send + Sync + 'static {
    /// Returns the monotonic time elapsed since the environment was created.
    fn now(&self) -> Duration;

    /// Blocks the calling worker for the given duration.
    ///
    /// Called once per tick by every racer thread.
    fn sleep(&self, duration: Duration);

    /// Returns the environment's seed (for logging/debugging).
    ///
    /// Unseeded environments return 0.
    fn seed(&self) -> u64;
}
