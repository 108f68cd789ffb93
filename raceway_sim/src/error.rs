//! Errors surfaced by the simulator binary.

use raceway_core::{ConfigError, RaceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Race(#[from] RaceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
