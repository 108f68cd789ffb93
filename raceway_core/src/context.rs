//! Race context: every piece of state the workers share.
//!
//! One `RaceContext` is built per race and handed to each worker behind an
//! `Arc`. Nothing race-related lives in a global, so tests can build as many
//! independent races as they like.

use crate::board::{RaceBoard, SlotWriter};
use crate::completion::CompletionCounter;
use crate::entity::{Entity, Hazards, RacerId, Stride};
use crate::ledger::FinishLedger;
use raceway_env::{RandomSource, SeededSource};
use std::sync::{Arc, Mutex};

/// Where the workers get their draws from.
pub enum Randomness {
    /// One stream for the whole field, locked for the duration of a step.
    ///
    /// Draw interleaving between racers follows lock acquisition order, so
    /// a seeded shared stream makes rosters reproducible but not races.
    Shared(Mutex<Box<dyn RandomSource>>),

    /// One ChaCha8 stream per racer, derived from the master seed and the
    /// racer id. Each racer's trajectory is reproducible on its own.
    PerRacer { seed: u64 },
}

impl Randomness {
    pub fn shared(source: impl RandomSource + 'static) -> Self {
        Randomness::Shared(Mutex::new(Box::new(source)))
    }

    pub fn per_racer(seed: u64) -> Self {
        Randomness::PerRacer { seed }
    }

    /// Draw handle for one worker.
    pub(crate) fn draws_for(&self, id: RacerId) -> Draws<'_> {
        match self {
            Randomness::Shared(source) => Draws::Shared(source),
            Randomness::PerRacer { seed } => {
                Draws::Own(SeededSource::for_stream(*seed, u64::from(id.0)))
            }
        }
    }
}

impl std::fmt::Debug for Randomness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Randomness::Shared(_) => f.write_str("Randomness::Shared"),
            Randomness::PerRacer { seed } => write!(f, "Randomness::PerRacer {{ seed: {} }}", seed),
        }
    }
}

pub(crate) enum Draws<'a> {
    Shared(&'a Mutex<Box<dyn RandomSource>>),
    Own(SeededSource),
}

impl Draws<'_> {
    /// Runs one step of `entity`.
    ///
    /// With a shared stream the lock covers the draws and the outcome
    /// decision only.
    pub(crate) fn step(&mut self, entity: &mut Entity, hazards: &Hazards) -> Stride {
        match self {
            Draws::Shared(source) => {
                let mut guard = match source.lock() {
                    Ok(guard) => guard,
                    Err(poison) => poison.into_inner(),
                };
                entity.step(hazards, &mut **guard)
            }
            Draws::Own(source) => entity.step(hazards, source),
        }
    }
}

/// Shared state of one race.
#[derive(Debug)]
pub struct RaceContext {
    track_length: u32,
    hazards: Hazards,
    randomness: Randomness,
    board: Arc<RaceBoard>,
    ledger: FinishLedger,
    counter: CompletionCounter,
}

impl RaceContext {
    /// Builds the context for a field of `ids`, plus one lane writer per id
    /// in the same order.
    pub fn new(
        track_length: u32,
        hazards: Hazards,
        randomness: Randomness,
        ids: &[RacerId],
    ) -> (Arc<Self>, Vec<SlotWriter>) {
        let (board, writers) = RaceBoard::with_writers(ids);
        let context = Arc::new(Self {
            track_length,
            hazards,
            randomness,
            board,
            ledger: FinishLedger::new(ids.len()),
            counter: CompletionCounter::new(ids.len()),
        });
        (context, writers)
    }

    pub fn track_length(&self) -> u32 {
        self.track_length
    }

    pub fn hazards(&self) -> &Hazards {
        &self.hazards
    }

    pub fn randomness(&self) -> &Randomness {
        &self.randomness
    }

    pub fn board(&self) -> &RaceBoard {
        &self.board
    }

    pub fn ledger(&self) -> &FinishLedger {
        &self.ledger
    }

    pub fn counter(&self) -> &CompletionCounter {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raceway_env::{Draw, ScriptedSource};

    #[test]
    fn test_context_sizes_everything_from_ids() {
        let ids = [RacerId(1), RacerId(2), RacerId(3)];
        let (context, writers) =
            RaceContext::new(100, Hazards::default(), Randomness::per_racer(1), &ids);

        assert_eq!(writers.len(), 3);
        assert_eq!(context.board().len(), 3);
        assert_eq!(context.ledger().capacity(), 3);
        assert_eq!(context.counter().total(), 3);
        assert_eq!(context.track_length(), 100);
    }

    #[test]
    fn test_shared_draws_consume_one_stream() {
        let script = ScriptedSource::new([
            Draw::Int(9_999),
            Draw::Int(9_999),
            Draw::Unit(0.0),
            Draw::Int(1),
            Draw::Int(9_999),
            Draw::Int(9_999),
            Draw::Unit(0.0),
            Draw::Int(2),
        ]);
        let randomness = Randomness::shared(script);
        let mut a = Entity::new(RacerId(1), 1, 3, 1.0);
        let mut b = Entity::new(RacerId(2), 1, 3, 1.0);

        let first = randomness.draws_for(a.id()).step(&mut a, &Hazards::default());
        let second = randomness.draws_for(b.id()).step(&mut b, &Hazards::default());

        assert_eq!(first, Stride::Run(1));
        assert_eq!(second, Stride::Run(2));
    }

    #[test]
    fn test_per_racer_streams_are_reproducible() {
        let randomness = Randomness::per_racer(77);
        let run = |id: u32| {
            let mut entity = Entity::new(RacerId(id), 1, 6, 0.7);
            let mut draws = randomness.draws_for(RacerId(id));
            (0..50)
                .map(|_| draws.step(&mut entity, &Hazards::default()))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(1), run(1));
        assert_ne!(run(1), run(2));
    }
}
