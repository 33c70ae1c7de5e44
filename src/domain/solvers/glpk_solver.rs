use log::{debug, warn};

use crate::convert::{to_borrowed_objective, to_glpk_polyhedron};
use crate::domain::solver::{SolveError, Solver, SolverSettings};
use crate::domain::validate::validate_model;
use crate::models::{Model, ObjectiveSense, SolveOutcome, SolveStatus};

use glpk_rust::{solve_ilps as glpk_solve_ilps, Solution, Status as GlpkStatus};

const PRESOLVE: bool = true;

// glp_intopt return codes; glpk-rust only surfaces them in the error text.
const GLP_ENOPFS: i32 = 0x0A;
const GLP_ENODFS: i32 = 0x0B;

/// GLPK solver implementation, the bundled default backend
pub struct GlpkSolver {
    settings: SolverSettings,
}

impl GlpkSolver {
    pub fn new(settings: SolverSettings) -> Self {
        GlpkSolver { settings }
    }
}

impl Solver for GlpkSolver {
    fn solve(&self, model: &Model) -> Result<SolveOutcome, SolveError> {
        validate_model(model)?;

        // The glpk-rust binding has no time limit parameter.
        warn!(
            "GLPK does not enforce the {}s time limit",
            self.settings.time_limit.as_secs()
        );

        let polyhedron = to_glpk_polyhedron(model)?;
        let objective = to_borrowed_objective(model);
        let maximize = model.sense() == Some(ObjectiveSense::Maximize);
        let terminal_output = self.settings.log_sink.captures();

        // Solver expects &mut
        let mut mut_polyhedron = polyhedron;

        let mut lib_solutions: Vec<Solution> = glpk_solve_ilps(
            &mut mut_polyhedron,
            vec![objective],
            maximize,
            PRESOLVE,
            terminal_output,
        );

        let solution = lib_solutions.pop().ok_or_else(|| SolveError::Backend {
            solver: self.name().to_string(),
            details: "no solution returned".to_string(),
        })?;
        let status = match presolve_verdict(&solution) {
            Some(status) => status,
            None => SolveStatus::from(solution.status),
        };
        if let Some(error) = &solution.error {
            if status == SolveStatus::Undefined {
                return Err(SolveError::Backend {
                    solver: self.name().to_string(),
                    details: error.clone(),
                });
            }
            debug!("GLPK reported: {}", error);
        }
        let values = status.has_solution().then(|| {
            model
                .variables
                .iter()
                .map(|v| {
                    solution
                        .solution
                        .get(v.id.as_str())
                        .map(|&x| x as f64)
                        .unwrap_or(0.0)
                })
                .collect()
        });

        Ok(SolveOutcome::new(model, status, values, self.name()))
    }

    fn name(&self) -> &str {
        "GLPK"
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

/// The MIP presolver stops with a failure code when it proves the problem has
/// no feasible (or no bounded) solution. Recover that as a status.
fn presolve_verdict(solution: &Solution) -> Option<SolveStatus> {
    if solution.status != GlpkStatus::MIPFailed {
        return None;
    }
    let code = solution
        .error
        .as_deref()?
        .rsplit(' ')
        .next()?
        .parse::<i32>()
        .ok()?;
    match code {
        GLP_ENOPFS => Some(SolveStatus::Infeasible),
        GLP_ENODFS => Some(SolveStatus::Unbounded),
        _ => None,
    }
}
