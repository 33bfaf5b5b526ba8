use thiserror::Error;

/// A firing profile that cannot be run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("phase {index} has zero duration")]
    ZeroDuration { index: usize },
    #[error("phase {index} target temperature is not finite")]
    NonFiniteTarget { index: usize },
    #[error("profile has {len} phases, capacity is {max}")]
    TooManyPhases { len: usize, max: usize },
    #[error("profile columns differ in length: {durations} durations, {targets} targets")]
    MismatchedColumns { durations: usize, targets: usize },
}

#[derive(Debug, Error, Clone)]
pub enum KilnError {
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing temperature sensor")]
    MissingSensor,
    #[error("missing heater")]
    MissingHeater,
    #[error("missing profile")]
    MissingProfile,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
