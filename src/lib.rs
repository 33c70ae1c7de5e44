//! Capacitated facility location: MILP formulations, pluggable solver backends
//! and decision reports.

pub mod config;
pub mod convert;
pub mod domain;
pub mod instance;
pub mod models;
pub mod report;

use thiserror::Error;

pub use domain::formulation::{build, CapacityLinking, FacilityLocationModel, Formulation, ObjectiveKind};
pub use domain::log_sink::LogSink;
pub use domain::solve::solve;
pub use domain::solver::{SolveError, SolverSettings};
pub use domain::solver_factory::SolverType;
pub use domain::validate::BuildError;
pub use instance::{Instance, InstanceError};
pub use models::{SolveOutcome, SolveStatus, VariableDomain};
pub use report::SolutionReport;

/// Any failure on the way from an instance file to a report.
#[derive(Error, Debug)]
pub enum CflpError {
    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}
