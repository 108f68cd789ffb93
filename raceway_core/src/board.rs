//! Race board: live position and status of every lane.
//!
//! Each lane has exactly one writer, the worker thread that owns the racer.
//! That rule is carried by the types: [`RaceBoard::with_writers`] hands out
//! one [`SlotWriter`] per lane, a `SlotWriter` cannot be cloned, and there is
//! no other way to write a lane. Readers never block writers; they may see a
//! position from one tick and a status from the next, which only matters to
//! the renderer.

use crate::entity::RacerId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Visual status of a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LaneStatus {
    Advancing = 0,
    Stalled = 1,
    Eliminated = 2,
    Finished = 3,
}

impl LaneStatus {
    /// Avatar glyph drawn at the head of the lane.
    pub fn glyph(self) -> char {
        match self {
            LaneStatus::Advancing => '>',
            LaneStatus::Stalled => 'X',
            LaneStatus::Eliminated => '#',
            LaneStatus::Finished => 'F',
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            1 => LaneStatus::Stalled,
            2 => LaneStatus::Eliminated,
            3 => LaneStatus::Finished,
            _ => LaneStatus::Advancing,
        }
    }
}

struct Lane {
    id: RacerId,
    position: AtomicU32,
    status: AtomicU8,
}

/// Shared board of all lanes.
pub struct RaceBoard {
    lanes: Vec<Lane>,
}

/// Exclusive write handle for one lane.
pub struct SlotWriter {
    board: Arc<RaceBoard>,
    index: usize,
}

/// Point-in-time copy of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneView {
    pub id: RacerId,
    pub position: u32,
    pub status: LaneStatus,
}

/// Point-in-time copy of the whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    /// Time since the race started, from the environment clock
    pub elapsed: Duration,

    /// Workers retired when the snapshot was taken
    pub retired: usize,

    /// One view per lane, in roster order
    pub lanes: Vec<LaneView>,
}

impl RaceSnapshot {
    pub fn lane(&self, id: RacerId) -> Option<&LaneView> {
        self.lanes.iter().find(|lane| lane.id == id)
    }

    /// Racers currently shown as stalled.
    pub fn stalled(&self) -> impl Iterator<Item = RacerId> + '_ {
        self.with_status(LaneStatus::Stalled)
    }

    /// Racers currently shown as eliminated.
    pub fn eliminated(&self) -> impl Iterator<Item = RacerId> + '_ {
        self.with_status(LaneStatus::Eliminated)
    }

    fn with_status(&self, status: LaneStatus) -> impl Iterator<Item = RacerId> + '_ {
        self.lanes
            .iter()
            .filter(move |lane| lane.status == status)
            .map(|lane| lane.id)
    }
}

impl RaceBoard {
    /// Creates a board with one lane per id, at position 0 and `Advancing`,
    /// together with the only writers that will ever exist for it.
    pub fn with_writers(ids: &[RacerId]) -> (Arc<Self>, Vec<SlotWriter>) {
        let board = Arc::new(Self {
            lanes: ids
                .iter()
                .map(|&id| Lane {
                    id,
                    position: AtomicU32::new(0),
                    status: AtomicU8::new(LaneStatus::Advancing as u8),
                })
                .collect(),
        });
        let writers = (0..ids.len())
            .map(|index| SlotWriter {
                board: Arc::clone(&board),
                index,
            })
            .collect();
        (board, writers)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Reads one lane.
    pub fn view(&self, id: RacerId) -> Option<LaneView> {
        self.lanes.iter().find(|lane| lane.id == id).map(Self::read)
    }

    /// Reads every lane. Never blocks.
    pub fn lanes(&self) -> Vec<LaneView> {
        self.lanes.iter().map(Self::read).collect()
    }

    /// Builds a full snapshot stamped with the given time and retired count.
    pub fn snapshot(&self, elapsed: Duration, retired: usize) -> RaceSnapshot {
        RaceSnapshot {
            elapsed,
            retired,
            lanes: self.lanes(),
        }
    }

    fn read(lane: &Lane) -> LaneView {
        LaneView {
            id: lane.id,
            position: lane.position.load(Ordering::Acquire),
            status: LaneStatus::from_code(lane.status.load(Ordering::Acquire)),
        }
    }
}

impl std::fmt::Debug for RaceBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceBoard").field("lanes", &self.lanes()).finish()
    }
}

impl SlotWriter {
    /// The racer this writer belongs to.
    pub fn racer(&self) -> RacerId {
        self.board.lanes[self.index].id
    }

    /// Publishes this tick's position and status.
    pub fn publish(&self, position: u32, status: LaneStatus) {
        let lane = &self.board.lanes[self.index];
        lane.position.store(position, Ordering::Release);
        lane.status.store(status as u8, Ordering::Release);
    }
}
