//! Finish ledger: arrival order at the finish line.

use crate::entity::RacerId;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Append-only record of racers in the order they crossed the line.
///
/// Order is the order in which appenders acquire the lock. Two racers that
/// cross on the same tick land in whichever order the scheduler lets them
/// in; nothing here tries to break that tie.
#[derive(Debug)]
pub struct FinishLedger {
    order: Mutex<Vec<RacerId>>,
    capacity: usize,
}

impl FinishLedger {
    /// Creates an empty ledger for a field of `capacity` racers.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, Vec<RacerId>> {
        match self.order.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Records a finisher and returns its 1-based placement.
    ///
    /// Returns `None` (and leaves the ledger untouched) if the racer is
    /// already recorded or the field is full.
    pub fn append(&self, id: RacerId) -> Option<usize> {
        let mut order = self.lock_or_recover();
        if order.contains(&id) {
            warn!(racer = %id, "duplicate finish ignored");
            return None;
        }
        if order.len() >= self.capacity {
            warn!(racer = %id, capacity = self.capacity, "finish ledger full");
            return None;
        }
        order.push(id);
        Some(order.len())
    }

    pub fn len(&self) -> usize {
        self.lock_or_recover().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the arrival order.
    ///
    /// Only final once every worker has been joined; the runner reads it
    /// after the join and exposes it through `RaceOutcome::podium`.
    pub fn entries(&self) -> Vec<RacerId> {
        self.lock_or_recover().clone()
    }
}
