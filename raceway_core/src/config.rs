//! Race configuration.
//!
//! Defaults reproduce the classic game: a 500 m track, racers with a minimum
//! speed in [1, 3] and a top speed 2 to 5 above it, resistance between 50%
//! and 95%, and a 50 ms tick.

use crate::entity::Hazards;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest field a race supports.
pub const MAX_RACERS: usize = 20;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub low: u32,
    pub high: u32,
}

impl IntRange {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }
}

/// Half-open real range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRange {
    pub low: f64,
    pub high: f64,
}

impl UnitRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Everything needed to set up and pace a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Distance to the finish line
    pub track_length: u32,

    /// Number of racers (1..=MAX_RACERS)
    pub racer_count: usize,

    /// Range the minimum speed is drawn from
    pub min_speed: IntRange,

    /// Range of the bonus added to the minimum speed to get the maximum
    pub speed_bonus: IntRange,

    /// Range the resistance is drawn from
    pub resistance: UnitRange,

    /// Pause between two ticks of a racer, in milliseconds
    pub tick_delay_ms: u64,

    /// Pause between two monitor frames, in milliseconds
    pub monitor_cadence_ms: u64,

    /// Incident probabilities
    pub hazards: Hazards,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track_length: 500,
            racer_count: 8,
            min_speed: IntRange::new(1, 3),
            speed_bonus: IntRange::new(2, 5),
            resistance: UnitRange::new(0.5, 0.95),
            tick_delay_ms: 50,
            monitor_cadence_ms: 50,
            hazards: Hazards::default(),
        }
    }
}

impl RaceConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    pub fn monitor_cadence(&self) -> Duration {
        Duration::from_millis(self.monitor_cadence_ms)
    }

    /// Checks every bound the race core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_length == 0 {
            return Err(ConfigError::TrackLength);
        }
        if self.racer_count == 0 || self.racer_count > MAX_RACERS {
            return Err(ConfigError::RacerCount {
                count: self.racer_count,
                max: MAX_RACERS,
            });
        }
        if self.min_speed.low == 0 || self.min_speed.low > self.min_speed.high {
            return Err(ConfigError::SpeedRange {
                low: self.min_speed.low,
                high: self.min_speed.high,
            });
        }
        if self.speed_bonus.low > self.speed_bonus.high
            || self.min_speed.high.checked_add(self.speed_bonus.high).is_none()
        {
            return Err(ConfigError::SpeedRange {
                low: self.speed_bonus.low,
                high: self.speed_bonus.high,
            });
        }
        let UnitRange { low, high } = self.resistance;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(ConfigError::ResistanceRange { low, high });
        }
        for value in [self.hazards.elimination_per_10k, self.hazards.stumble_per_10k] {
            if value > 10_000 {
                return Err(ConfigError::HazardThreshold { value });
            }
        }
        Ok(())
    }

    /// Checks that a bet names a racer in this field.
    pub fn validate_bet(&self, bet: u32) -> Result<(), ConfigError> {
        if bet == 0 || bet as usize > self.racer_count {
            return Err(ConfigError::Bet {
                bet,
                count: self.racer_count,
            });
        }
        Ok(())
    }
}
