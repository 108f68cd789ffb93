//! JSON exporter for race replays.
//!
//! Records every monitor snapshot plus the final results so a race can be
//! replayed or plotted offline.

use raceway_core::{LaneView, RaceOutcome, RaceSnapshot, RacerId, RacerProfile};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single monitor frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceFrame {
    /// Time since the start, in seconds
    pub time_sec: f64,

    /// Workers retired at this frame
    pub retired: usize,

    pub lanes: Vec<LaneView>,
}

impl From<&RaceSnapshot> for RaceFrame {
    fn from(snapshot: &RaceSnapshot) -> Self {
        Self {
            time_sec: snapshot.elapsed.as_secs_f64(),
            retired: snapshot.retired,
            lanes: snapshot.lanes.clone(),
        }
    }
}

/// Complete race export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceExport {
    /// Seed used
    pub seed: u64,

    pub track_length: u32,

    /// Roster as generated
    pub racers: Vec<RacerProfile>,

    /// Duration in seconds, up to the last frame
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<RaceFrame>,

    /// Finishers in arrival order
    pub podium: Vec<RacerId>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub eliminated: Vec<RacerId>,

    /// Racer the player bet on, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bet: Option<u32>,
}

impl RaceExport {
    /// Creates a new export container.
    pub fn new(seed: u64, track_length: u32, racers: Vec<RacerProfile>) -> Self {
        Self {
            seed,
            track_length,
            racers,
            duration_sec: 0.0,
            frames: Vec::new(),
            podium: Vec::new(),
            eliminated: Vec::new(),
            bet: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, snapshot: &RaceSnapshot) {
        let frame = RaceFrame::from(snapshot);
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Records the final results.
    pub fn finalize(&mut self, outcome: &RaceOutcome, bet: Option<u32>) {
        self.podium = outcome.podium().to_vec();
        self.eliminated = outcome.eliminated();
        self.bet = bet;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raceway_core::LaneStatus;
    use std::time::Duration;

    fn snapshot(millis: u64, position: u32) -> RaceSnapshot {
        RaceSnapshot {
            elapsed: Duration::from_millis(millis),
            retired: 0,
            lanes: vec![LaneView {
                id: RacerId(1),
                position,
                status: LaneStatus::Advancing,
            }],
        }
    }

    #[test]
    fn test_frames_track_duration() {
        let mut export = RaceExport::new(42, 100, Vec::new());
        export.add_frame(&snapshot(50, 3));
        export.add_frame(&snapshot(150, 7));

        assert_eq!(export.frames.len(), 2);
        assert!((export.duration_sec - 0.15).abs() < 1e-9);
        assert_eq!(export.frames[1].lanes[0].position, 7);
    }

    #[test]
    fn test_write_to_file() {
        let mut export = RaceExport::new(7, 10, Vec::new());
        export.add_frame(&snapshot(50, 10));
        let path = std::env::temp_dir().join(format!("raceway-export-{}.json", std::process::id()));

        export.write_to_file(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let parsed: RaceExport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.frames.len(), 1);
        assert!(!raw.contains("\"eliminated\""));
        assert!(!raw.contains("\"bet\""));
    }
}
