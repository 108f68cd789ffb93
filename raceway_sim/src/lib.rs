//! Raceway Simulator
//!
//! Terminal front end for the race core: draws a roster, takes a bet,
//! renders the live track from monitor snapshots, then prints the podium,
//! the medical report and the bet result.
//!
//! # Usage
//!
//! ```ignore
//! use raceway_sim::{Session, TrackRenderer};
//! use raceway_core::RaceConfig;
//! use raceway_env::SystemEnv;
//!
//! let session = Session::new(RaceConfig::default(), 42, Some(3))?;
//! let renderer = TrackRenderer::new(session.config().track_length);
//! let report = session.run(SystemEnv::shared(), |snapshot| {
//!     print!("{}", renderer.render(snapshot));
//! })?;
//! ```

pub mod error;
pub mod exporter;
pub mod render;
pub mod report;
pub mod session;

pub use error::SimError;
pub use exporter::{RaceExport, RaceFrame};
pub use render::{TrackRenderer, TRACK_WIDTH};
pub use report::BetOutcome;
pub use session::{Session, SessionReport};
