//! Randomness sources for the race core.
//!
//! All randomness consumed by a race flows through [`RandomSource`]. The
//! stepping model only ever asks for two kinds of draws, so the trait stays
//! small enough to be scripted draw-by-draw in tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A stream of uniform draws.
pub trait RandomSource: Send {
    /// Draws a real uniformly from `[0.0, 1.0)`.
    fn unit(&mut self) -> f64;

    /// Draws an integer uniformly from `[low, high]` (inclusive).
    fn int_in(&mut self, low: u32, high: u32) -> u32;
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }

    fn int_in(&mut self, low: u32, high: u32) -> u32 {
        (**self).int_in(low, high)
    }
}

/// A [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    /// Seed the generator was built from
    seed: u64,

    /// Underlying generator
    rng: R,
}

/// Reproducible source: same seed, same draws.
pub type SeededSource = RngSource<ChaCha8Rng>;

impl<R> RngSource<R> {
    /// Returns the seed this source was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngSource<ChaCha8Rng> {
    /// Creates a ChaCha8 source from a 64-bit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Derives an independent stream from a master seed.
    ///
    /// The stream seed is `master * golden + stream * prime`, so adding a
    /// stream never shifts the draws of the others.
    pub fn for_stream(master_seed: u64, stream: u64) -> Self {
        let derived = master_seed
            .wrapping_mul(0x9e3779b97f4a7c15)
            .wrapping_add(stream.wrapping_mul(0x517cc1b727220a95));
        Self::seeded(derived)
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn int_in(&mut self, low: u32, high: u32) -> u32 {
        self.rng.gen_range(low..=high)
    }
}

/// One pre-recorded draw for a [`ScriptedSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    /// Answer to the next `unit()` call
    Unit(f64),

    /// Answer to the next `int_in()` call
    Int(u32),
}

/// Replays a fixed list of draws, in order.
///
/// Used to force exact outcomes (an elimination on a given tick, a stumble,
/// a tired tick) and to count how many draws a step consumed.
///
/// # Panics
///
/// Panics when the script runs dry, when a draw of the wrong kind is
/// requested, or when a scripted integer falls outside the requested range.
/// A script that does not match the consumer is a broken test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<Draw>,
    consumed: usize,
}

impl ScriptedSource {
    /// Creates a source that will answer with `draws` in order.
    pub fn new(draws: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            script: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Appends more draws to the end of the script.
    pub fn extend(&mut self, draws: impl IntoIterator<Item = Draw>) {
        self.script.extend(draws);
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of draws still queued.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next_draw(&mut self) -> Draw {
        let draw = self
            .script
            .pop_front()
            .unwrap_or_else(|| panic!("scripted source exhausted after {} draws", self.consumed));
        self.consumed += 1;
        draw
    }
}

impl RandomSource for ScriptedSource {
    fn unit(&mut self) -> f64 {
        match self.next_draw() {
            Draw::Unit(value) => value,
            other => panic!("draw #{} expected a unit draw, script has {:?}", self.consumed, other),
        }
    }

    fn int_in(&mut self, low: u32, high: u32) -> u32 {
        match self.next_draw() {
            Draw::Int(value) => {
                assert!(
                    (low..=high).contains(&value),
                    "scripted draw {} outside [{}, {}]",
                    value,
                    low,
                    high
                );
                value
            }
            other => panic!("draw #{} expected an int draw, script has {:?}", self.consumed, other),
        }
    }
}
