//! Error types for configuration loading and simulation runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::CarId;

/// Problems with the simulation parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Parameter file could not be read.
    #[error("cannot read parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input ended before a required value.
    #[error("missing value for {field}")]
    MissingValue { field: String },

    /// A value is not a non-negative integer.
    #[error("invalid value for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("zone capacity must be > 0")]
    ZeroCapacity,

    #[error("at least one car is required")]
    NoCars,

    #[error("car {car} must make at least one crossing")]
    ZeroCrossings { car: CarId },
}

/// Failures while running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name} thread panicked")]
    WorkerPanicked { name: String },

    /// The audit caught at least one safety violation.
    #[error("{count} safety violation(s) detected")]
    Violations { count: usize },
}
