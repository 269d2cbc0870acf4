//! Construction-time errors.
//!
//! Stepping itself never fails; every failure there is a death.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("field dimensions must be positive, got {depth}x{width}")]
    InvalidDimensions { depth: usize, width: usize },

    #[error("day cycle length must be at least 2, got {0}")]
    InvalidCycleLength(u64),

    #[error("{owner}: {field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        owner: String,
        field: &'static str,
        value: f64,
    },

    #[error("disease steps till death must be positive")]
    InvalidDiseaseDuration,

    #[error("species {species}: {reason}")]
    InvalidSpecies {
        species: String,
        reason: &'static str,
    },

    #[error("species {0} is defined more than once")]
    DuplicateSpecies(String),

    #[error("species {species} eats unknown species {prey}")]
    UnknownPrey { species: String, prey: String },

    #[error("no species configured")]
    NoSpecies,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
