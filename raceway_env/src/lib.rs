//! Raceway Environment Abstraction Layer
//!
//! This crate isolates everything the race core takes from the outside world:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`unit()`, `int_in()`)
//!
//! The core never touches `std::thread::sleep`, `Instant::now` or a platform
//! RNG directly. Production runs plug in [`SystemEnv`] and a
//! [`SeededSource`]; tests plug in [`VirtualEnv`] together with a
//! [`SeededSource`] or a [`ScriptedSource`], so any roster can be replayed
//! from its seed.
//!
//! # Example
//!
//! ```ignore
//! use raceway_env::{RaceEnv, RandomSource, SeededSource, SystemEnv};
//!
//! let env = SystemEnv::shared();
//! let mut rng = SeededSource::seeded(42);
//! let roll = rng.int_in(0, 9_999);
//! env.sleep(Duration::from_millis(50));
//! ```

mod context;
mod random;
mod system_impl;
mod virtual_impl;

pub use context::RaceEnv;
pub use random::{Draw, RandomSource, RngSource, ScriptedSource, SeededSource};
pub use system_impl::SystemEnv;
pub use virtual_impl::VirtualEnv;
