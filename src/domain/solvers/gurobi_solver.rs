use crate::domain::solver::{SolveError, Solver, SolverSettings};
use crate::domain::validate::validate_model;
use crate::models::{Comparison, Model, ObjectiveSense, SolveOutcome, SolveStatus, VariableDomain};

use grb::prelude::*;

/// Gurobi solver implementation
pub struct GurobiSolver {
    settings: SolverSettings,
}

impl GurobiSolver {
    pub fn new(settings: SolverSettings) -> Self {
        GurobiSolver { settings }
    }

    /// Convert Gurobi status to our status
    fn convert_status(status: grb::Status) -> SolveStatus {
        match status {
            grb::Status::Optimal => SolveStatus::Optimal,
            grb::Status::TimeLimit
            | grb::Status::NodeLimit
            | grb::Status::IterationLimit
            | grb::Status::SolutionLimit
            | grb::Status::Interrupted
            | grb::Status::SubOptimal => SolveStatus::NotSolved,
            grb::Status::Infeasible => SolveStatus::Infeasible,
            grb::Status::InfOrUnbd | grb::Status::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::Undefined,
        }
    }

    fn backend_error(&self, what: &str, e: grb::Error) -> SolveError {
        SolveError::Backend {
            solver: self.name().to_string(),
            details: format!("{}: {}", what, e),
        }
    }
}

impl Solver for GurobiSolver {
    fn solve(&self, model: &Model) -> std::result::Result<SolveOutcome, SolveError> {
        validate_model(model)?;

        let sense = match model.sense() {
            Some(ObjectiveSense::Maximize) => ModelSense::Maximize,
            _ => ModelSense::Minimize,
        };

        let mut env = Env::new("").map_err(|e| self.backend_error("Failed to create Gurobi environment", e))?;

        // Console output only when it is being captured into a log sink
        let output_flag = if self.settings.log_sink.captures() { 1 } else { 0 };
        env.set(param::OutputFlag, output_flag)
            .map_err(|e| self.backend_error("Failed to set Gurobi output flag", e))?;

        let mut grb_model = grb::Model::with_env(&model.name, &env)
            .map_err(|e| self.backend_error("Failed to create Gurobi model", e))?;
        grb_model
            .set_param(param::TimeLimit, self.settings.time_limit.as_secs_f64())
            .map_err(|e| self.backend_error("Failed to set Gurobi time limit", e))?;

        // Add variables
        let mut vars: Vec<Var> = Vec::with_capacity(model.variables.len());
        for var in &model.variables {
            let lower = var.lower;
            let upper = var.upper;
            let gurobi_var = match var.domain {
                VariableDomain::Binary => add_binvar!(grb_model, name: &var.id),
                VariableDomain::Integer => {
                    add_intvar!(grb_model, name: &var.id, bounds: lower..upper)
                }
                VariableDomain::Continuous => {
                    add_ctsvar!(grb_model, name: &var.id, bounds: lower..upper)
                }
            }
            .map_err(|e| self.backend_error("Failed to add variable", e))?;
            vars.push(gurobi_var);
        }

        grb_model
            .update()
            .map_err(|e| self.backend_error("Failed to update model after adding variables", e))?;

        // Add constraints
        for constraint in model.constraints.iter().filter(|c| !c.terms.is_empty()) {
            let expr = constraint.terms.iter().fold(Expr::Constant(0.0), |acc, t| {
                acc + t.coefficient * vars[t.column]
            });
            let rhs = constraint.rhs;
            let added = match constraint.comparison {
                Comparison::LessEqual => grb_model.add_constr(&constraint.label, c!(expr <= rhs)),
                Comparison::Equal => grb_model.add_constr(&constraint.label, c!(expr == rhs)),
                Comparison::GreaterEqual => grb_model.add_constr(&constraint.label, c!(expr >= rhs)),
            };
            added.map_err(|e| self.backend_error("Failed to add constraint", e))?;
        }

        // Build objective expression
        let obj_expr = match &model.objective {
            Some(obj) => obj.terms.iter().fold(Expr::Constant(0.0), |acc, t| {
                acc + t.coefficient * vars[t.column]
            }),
            None => Expr::Constant(0.0),
        };
        grb_model
            .set_objective(obj_expr, sense)
            .map_err(|e| self.backend_error("Failed to set objective", e))?;

        grb_model
            .optimize()
            .map_err(|e| self.backend_error("Failed to optimize", e))?;

        let model_status = grb_model
            .status()
            .map_err(|e| self.backend_error("Failed to get model status", e))?;
        let status = Self::convert_status(model_status);

        // A time-limited run may end without any incumbent
        let values = if status.has_solution() {
            grb_model.get_obj_attr_batch(attr::X, vars.iter()).ok()
        } else {
            None
        };

        Ok(SolveOutcome::new(model, status, values, self.name()))
    }

    fn name(&self) -> &str {
        "Gurobi"
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}
