//! Raceway Core - Concurrent Race Simulation
//!
//! A field of racers runs down a linear track, one OS thread per racer.
//! This crate owns the parts that have to be right under concurrency:
//! 1. **Stepping model**: elimination, stumble, fatigue and speed rolls in a fixed order
//! 2. **Shared race state**: single-writer lanes, a finish ledger, a completion counter
//! 3. **Runner + monitor**: spawn, observe at a fixed cadence, join, report
//!
//! # Usage
//!
//! ```ignore
//! use raceway_core::{generate_roster, RaceConfig, RaceRunner, Randomness};
//! use raceway_env::{SeededSource, SystemEnv};
//!
//! let config = RaceConfig::default();
//! let roster = generate_roster(&config, &mut SeededSource::seeded(42));
//! let runner = RaceRunner::from_config(SystemEnv::shared(), &config)?;
//! let outcome = runner.run(roster, Randomness::shared(SeededSource::seeded(43)), |snapshot| {
//!     // render
//! })?;
//! println!("winner: {:?}", outcome.winner());
//! ```

pub mod board;
pub mod completion;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod monitor;
pub mod roster;
pub mod runner;

// Re-export key types for convenience
pub use board::{LaneStatus, LaneView, RaceBoard, RaceSnapshot, SlotWriter};
pub use completion::{CompletionCounter, Retirement};
pub use config::{IntRange, RaceConfig, UnitRange, MAX_RACERS};
pub use context::{RaceContext, Randomness};
pub use entity::{Condition, Entity, Hazards, RacerId, RacerProfile, Stride, ROLL_RANGE};
pub use error::{ConfigError, RaceError, RaceResult};
pub use ledger::FinishLedger;
pub use monitor::{CompletionMonitor, MonitorReport};
pub use roster::generate_roster;
pub use runner::{LaneReport, RaceOutcome, RaceRunner, TickRecord};
