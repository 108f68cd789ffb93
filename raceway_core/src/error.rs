//! Error types for race setup and execution.
//!
//! Eliminations and stalls are race outcomes, not errors. These enums only
//! cover invalid setup and broken worker threads.

use crate::entity::RacerId;
use thiserror::Error;

/// Invalid race configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Track length must be positive")]
    TrackLength,

    #[error("Racer count {count} outside 1..={max}")]
    RacerCount { count: usize, max: usize },

    #[error("Invalid speed range [{low}, {high}]: bounds must satisfy 1 <= low <= high")]
    SpeedRange { low: u32, high: u32 },

    #[error("Invalid resistance range [{low}, {high}]: bounds must satisfy 0 <= low <= high <= 1")]
    ResistanceRange { low: f64, high: f64 },

    #[error("Hazard threshold {value} exceeds 10000")]
    HazardThreshold { value: u32 },

    #[error("Racer {id} has invalid speed range [{min}, {max}]: bounds must satisfy 1 <= min <= max")]
    RacerSpeed { id: RacerId, min: u32, max: u32 },

    #[error("Racer {id} has resistance {resistance} outside [0, 1]")]
    RacerResistance { id: RacerId, resistance: f64 },

    #[error("Racer {id} appears more than once in the roster")]
    DuplicateRacer { id: RacerId },

    #[error("Bet on racer {bet} but only racers 1..={count} are running")]
    Bet { bet: u32, count: usize },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while running a race.
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker for racer {id}: {source}")]
    Spawn {
        id: RacerId,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker for racer {id} panicked")]
    WorkerPanicked { id: RacerId },

    #[error("Race needs at least one racer")]
    EmptyRoster,
}

pub type RaceResult<T> = Result<T, RaceError>;
