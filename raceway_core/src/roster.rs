//! Random roster generation.

use crate::config::RaceConfig;
use crate::entity::{Entity, RacerId};
use raceway_env::RandomSource;

/// Generates `config.racer_count` racers with ids `1..=N`.
///
/// Per racer, in order: minimum speed from `config.min_speed`, a bonus from
/// `config.speed_bonus` (maximum = minimum + bonus), then a resistance
/// uniform in `config.resistance`.
pub fn generate_roster(config: &RaceConfig, rng: &mut dyn RandomSource) -> Vec<Entity> {
    (1..=config.racer_count as u32)
        .map(|n| {
            let min_speed = rng.int_in(config.min_speed.low, config.min_speed.high);
            let bonus = rng.int_in(config.speed_bonus.low, config.speed_bonus.high);
            let span = config.resistance.high - config.resistance.low;
            let resistance = config.resistance.low + rng.unit() * span;
            Entity::new(RacerId(n), min_speed, min_speed + bonus, resistance)
        })
        .collect()
}
