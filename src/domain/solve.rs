use log::info;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::domain::log_sink::LogSink;
use crate::domain::solver::{SolveError, Solver, SolverSettings};
use crate::domain::solver_factory::{create_solver, SolverType};
use crate::models::{Model, SolveOutcome, SolveStatus};

/// Solve `model` with the backend named `solver_name`.
///
/// Unknown names fall back to the default backend. The log sink is acquired
/// before the backend starts and released when this function returns, whatever
/// the backend did.
pub fn solve(
    model: &Model,
    solver_name: Option<&str>,
    time_limit: Duration,
    log_sink: LogSink,
) -> Result<SolveOutcome, SolveError> {
    let solver_type = SolverType::resolve(solver_name);
    let solver = create_solver(solver_type, SolverSettings::new(time_limit, log_sink));
    solve_with(solver.as_ref(), model)
}

pub fn solve_with(solver: &dyn Solver, model: &Model) -> Result<SolveOutcome, SolveError> {
    if model.variables.is_empty() {
        return Ok(SolveOutcome::new(model, SolveStatus::Optimal, Some(Vec::new()), solver.name()));
    }

    let started = Instant::now();
    let outcome = {
        let _capture = solver
            .settings()
            .log_sink
            .capture()
            .map_err(SolveError::LogSink)?;

        panic::catch_unwind(AssertUnwindSafe(|| solver.solve(model))).unwrap_or_else(|payload| {
            Err(SolveError::BackendPanicked {
                solver: solver.name().to_string(),
                details: panic_message(payload.as_ref()),
            })
        })
    };

    if let Ok(o) = &outcome {
        info!(
            "{} finished in {:.2}s with status {} (objective {})",
            solver.name(),
            started.elapsed().as_secs_f64(),
            o.status,
            o.objective_or_zero(),
        );
    }
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
