//! Completion monitor: the race's only observer.
//!
//! The monitor never touches racer state. Once per cadence period it takes
//! a snapshot of the board for the frame callback (usually the renderer)
//! and checks whether every worker has retired. Instead of sleeping and
//! re-checking, it blocks on the completion counter's condvar with the
//! cadence as timeout, so the last frame follows the last retirement
//! immediately.

use crate::board::RaceSnapshot;
use crate::context::RaceContext;
use raceway_env::RaceEnv;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Floor on the cadence so a zero cadence cannot spin.
const MIN_CADENCE: Duration = Duration::from_millis(1);

/// What the monitor saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    /// Frames handed to the callback (at least one)
    pub frames: usize,

    /// Environment time between race start and the final frame
    pub observed: Duration,
}

pub struct CompletionMonitor<E: RaceEnv> {
    env: Arc<E>,
    cadence: Duration,
}

impl<E: RaceEnv> CompletionMonitor<E> {
    pub fn new(env: Arc<E>, cadence: Duration) -> Self {
        Self {
            env,
            cadence: cadence.max(MIN_CADENCE),
        }
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Observes the race until every worker has retired.
    ///
    /// `started` is the environment time at which the workers were released;
    /// snapshot times are relative to it. The final frame is always taken
    /// after the counter reached the field size.
    pub fn watch<F>(&self, context: &RaceContext, started: Duration, on_frame: &mut F) -> MonitorReport
    where
        F: FnMut(&RaceSnapshot),
    {
        let counter = context.counter();
        let mut frames = 0;

        loop {
            let complete = counter.wait_for_all(self.cadence);
            let elapsed = self.env.now().saturating_sub(started);
            let snapshot = context.board().snapshot(elapsed, counter.retired());
            on_frame(&snapshot);
            frames += 1;

            if complete {
                debug!(frames, retired = snapshot.retired, "all racers retired");
                return MonitorReport {
                    frames,
                    observed: elapsed,
                };
            }
        }
    }
}
