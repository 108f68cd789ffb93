//! One race session: roster, bet, race, results.
//!
//! The master seed drives everything random. The roster is drawn from a
//! ChaCha8 stream seeded with it; race draws come from a second seed
//! derived from it, either as one shared stream or one stream per racer.

use crate::error::SimError;
use crate::report::BetOutcome;
use raceway_core::{generate_roster, Entity, RaceConfig, RaceOutcome, RaceRunner, RaceSnapshot, RacerId, Randomness};
use raceway_env::{RaceEnv, SeededSource};
use std::sync::Arc;
use tracing::{debug, info};

/// Results of a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub seed: u64,
    pub outcome: RaceOutcome,
    pub bet: Option<(RacerId, BetOutcome)>,
}

/// A configured race, ready to run.
#[derive(Debug, Clone)]
pub struct Session {
    config: RaceConfig,
    seed: u64,
    bet: Option<u32>,
    per_racer_streams: bool,
    roster: Vec<Entity>,
}

impl Session {
    /// Validates the setup and draws the roster.
    pub fn new(config: RaceConfig, seed: u64, bet: Option<u32>) -> Result<Self, SimError> {
        config.validate()?;
        if let Some(bet) = bet {
            config.validate_bet(bet)?;
        }

        let roster = generate_roster(&config, &mut SeededSource::seeded(seed));
        debug!(seed, racers = roster.len(), "roster drawn");

        Ok(Self {
            config,
            seed,
            bet,
            per_racer_streams: false,
            roster,
        })
    }

    /// Gives each racer its own stream instead of sharing one.
    pub fn with_per_racer_streams(mut self, enabled: bool) -> Self {
        self.per_racer_streams = enabled;
        self
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bet(&self) -> Option<u32> {
        self.bet
    }

    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    /// Seed of the race draws, kept apart from the roster stream.
    pub fn race_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x9e3779b97f4a7c15)
    }

    /// Runs the race, handing every monitor frame to `on_frame`.
    pub fn run<E, F>(&self, env: Arc<E>, on_frame: F) -> Result<SessionReport, SimError>
    where
        E: RaceEnv,
        F: FnMut(&RaceSnapshot),
    {
        let randomness = if self.per_racer_streams {
            Randomness::per_racer(self.race_seed())
        } else {
            Randomness::shared(SeededSource::seeded(self.race_seed()))
        };

        let runner = RaceRunner::from_config(env, &self.config)?;
        let outcome = runner.run(self.roster.clone(), randomness, on_frame)?;

        let bet = self.bet.map(|raw| {
            let id = RacerId(raw);
            (id, BetOutcome::resolve(id, outcome.podium()))
        });
        if let Some((id, result)) = bet {
            info!(racer = %id, %result, "bet resolved");
        }

        Ok(SessionReport {
            seed: self.seed,
            outcome,
            bet,
        })
    }
}
