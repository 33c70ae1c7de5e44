use std::time::Duration;
use thiserror::Error;

use crate::domain::log_sink::LogSink;
use crate::domain::validate::SolveInputError;
use crate::models::{Model, SolveOutcome};

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(300);

/// Resource limits and output routing handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub time_limit: Duration,
    pub log_sink: LogSink,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            time_limit: DEFAULT_TIME_LIMIT,
            log_sink: LogSink::Discard,
        }
    }
}

impl SolverSettings {
    pub fn new(time_limit: Duration, log_sink: LogSink) -> Self {
        SolverSettings {
            time_limit,
            log_sink,
        }
    }
}

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("invalid model: {0}")]
    InvalidModel(#[from] SolveInputError),

    #[error("{solver} cannot solve this model: {details}")]
    Unsupported { solver: String, details: String },

    #[error("{solver} failed: {details}")]
    Backend { solver: String, details: String },

    #[error("{solver} panicked: {details}")]
    BackendPanicked { solver: String, details: String },

    #[error("cannot open solver log: {0}")]
    LogSink(#[source] std::io::Error),
}

/// Common interface for MILP backends
pub trait Solver {
    /// Solve `model` synchronously
    ///
    /// # Returns
    /// The termination status and, when the backend has one, a value per model column.
    /// Hitting the time limit is reported through the status, not as an error.
    fn solve(&self, model: &Model) -> Result<SolveOutcome, SolveError>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;

    fn settings(&self) -> &SolverSettings;
}
