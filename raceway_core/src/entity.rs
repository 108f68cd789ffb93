//! Racer stepping model.
//!
//! A racer is a tiny probabilistic state machine evaluated once per tick:
//!
//! ```text
//!             stumble roll            remaining hits 0
//!   Running ───────────────► Stalled ─────────────────► Running
//!      │
//!      │ elimination roll
//!      ▼
//!   Eliminated (terminal)
//! ```
//!
//! Draw order is part of the contract. A running racer rolls for
//! elimination, then for a stumble, then for fatigue, then for speed, and
//! stops drawing as soon as the outcome is decided. Stalled and eliminated
//! racers draw nothing.

use crate::error::ConfigError;
use raceway_env::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound (exclusive) of the elimination and stumble rolls.
pub const ROLL_RANGE: u32 = 10_000;

/// Stable racer identifier, `1..=N` for a race of N racers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RacerId(pub u32);

impl fmt::Display for RacerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Low-probability incidents rolled on every running tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hazards {
    /// Elimination threshold out of `ROLL_RANGE` (default 2)
    pub elimination_per_10k: u32,

    /// Stumble threshold out of `ROLL_RANGE` (default 5)
    pub stumble_per_10k: u32,

    /// Extra zero ticks after the stumbling tick (default 14)
    pub stall_ticks: u32,
}

impl Default for Hazards {
    fn default() -> Self {
        Self {
            elimination_per_10k: 2,
            stumble_per_10k: 5,
            stall_ticks: 14,
        }
    }
}

impl Hazards {
    /// Hazards that never fire. Rolls are still drawn.
    pub fn none() -> Self {
        Self {
            elimination_per_10k: 0,
            stumble_per_10k: 0,
            ..Self::default()
        }
    }
}

/// Fixed attributes of a racer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacerProfile {
    pub id: RacerId,
    pub min_speed: u32,
    pub max_speed: u32,
    /// Probability of not tiring on a given tick
    pub resistance: f64,
}

impl RacerProfile {
    /// Checks the bounds a racer needs to finish in finite time:
    /// `1 <= min_speed <= max_speed` and a resistance in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_speed == 0 || self.min_speed > self.max_speed {
            return Err(ConfigError::RacerSpeed {
                id: self.id,
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if !(0.0..=1.0).contains(&self.resistance) {
            return Err(ConfigError::RacerResistance {
                id: self.id,
                resistance: self.resistance,
            });
        }
        Ok(())
    }
}

impl fmt::Display for RacerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Racer {} | Speed: [{}-{}] | Resistance: {}%",
            self.id,
            self.min_speed,
            self.max_speed,
            (self.resistance * 100.0) as u32
        )
    }
}

/// Mutable race condition of a racer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Running,
    /// Forced zero ticks still owed
    Stalled { remaining: u32 },
    Eliminated,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// Normal tick at a speed drawn from `[min, max]`
    Run(u32),
    /// Fatigued tick at exactly the minimum speed
    Tired(u32),
    /// Stumbled this tick; a stall follows
    Stumble,
    /// Serving a stall from an earlier stumble
    Stalled,
    /// Eliminated (this tick or earlier)
    Eliminated,
}

impl Stride {
    /// Distance covered on this tick.
    pub fn distance(self) -> u32 {
        match self {
            Stride::Run(d) | Stride::Tired(d) => d,
            Stride::Stumble | Stride::Stalled | Stride::Eliminated => 0,
        }
    }
}

/// A racer: profile, condition and position.
///
/// Owned by exactly one worker thread for the whole race.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    profile: RacerProfile,
    condition: Condition,
    position: u32,
}

impl Entity {
    /// Creates a racer at the start line.
    ///
    /// Bounds are not checked here; [`RaceRunner::run`](crate::RaceRunner::run)
    /// rejects profiles that fail [`RacerProfile::validate`].
    pub fn new(id: RacerId, min_speed: u32, max_speed: u32, resistance: f64) -> Self {
        Self::from_profile(RacerProfile {
            id,
            min_speed,
            max_speed,
            resistance,
        })
    }

    pub fn from_profile(profile: RacerProfile) -> Self {
        Self {
            profile,
            condition: Condition::Running,
            position: 0,
        }
    }

    pub fn id(&self) -> RacerId {
        self.profile.id
    }

    pub fn profile(&self) -> &RacerProfile {
        &self.profile
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn is_eliminated(&self) -> bool {
        self.condition == Condition::Eliminated
    }

    /// Forced zero ticks still owed (0 when not stalled).
    pub fn stall_counter(&self) -> u32 {
        match self.condition {
            Condition::Stalled { remaining } => remaining,
            _ => 0,
        }
    }

    /// Computes this tick's stride.
    ///
    /// Only the condition changes here; position is applied separately with
    /// [`Entity::advance`] so the caller can keep the randomness lock for the
    /// draws alone.
    pub fn step(&mut self, hazards: &Hazards, rng: &mut dyn RandomSource) -> Stride {
        match self.condition {
            Condition::Eliminated => return Stride::Eliminated,
            Condition::Stalled { remaining } => {
                self.condition = if remaining > 1 {
                    Condition::Stalled { remaining: remaining - 1 }
                } else {
                    Condition::Running
                };
                return Stride::Stalled;
            }
            Condition::Running => {}
        }

        if rng.int_in(0, ROLL_RANGE - 1) < hazards.elimination_per_10k {
            self.condition = Condition::Eliminated;
            return Stride::Eliminated;
        }

        if rng.int_in(0, ROLL_RANGE - 1) < hazards.stumble_per_10k {
            if hazards.stall_ticks > 0 {
                self.condition = Condition::Stalled {
                    remaining: hazards.stall_ticks,
                };
            }
            return Stride::Stumble;
        }

        if rng.unit() > self.profile.resistance {
            return Stride::Tired(self.profile.min_speed);
        }

        Stride::Run(rng.int_in(self.profile.min_speed, self.profile.max_speed))
    }

    /// Moves the racer forward, clamped to the finish line.
    ///
    /// Eliminated and finished racers do not move. Returns the new position.
    pub fn advance(&mut self, distance: u32, track_length: u32) -> u32 {
        if !self.is_eliminated() && self.position < track_length {
            self.position = self.position.saturating_add(distance).min(track_length);
        }
        self.position
    }

    /// True once the racer has reached the finish line.
    pub fn has_finished(&self, track_length: u32) -> bool {
        self.position >= track_length
    }
}
