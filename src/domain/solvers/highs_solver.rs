use crate::domain::solver::{SolveError, Solver, SolverSettings};
use crate::domain::validate::validate_model;
use crate::models::{Comparison, Model, ObjectiveSense, SolveOutcome, SolveStatus, VariableDomain};

use ::highs::{Col, HighsModelStatus, RowProblem, Sense};

/// HiGHS solver implementation
pub struct HighsSolver {
    settings: SolverSettings,
}

impl HighsSolver {
    pub fn new(settings: SolverSettings) -> Self {
        HighsSolver { settings }
    }

    /// Convert HiGHS status to our status
    fn convert_status(model_status: HighsModelStatus) -> SolveStatus {
        match model_status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => SolveStatus::Optimal,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                SolveStatus::NotSolved
            }
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::UnboundedOrInfeasible => SolveStatus::Unbounded,
            HighsModelStatus::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::Undefined,
        }
    }
}

impl Solver for HighsSolver {
    fn solve(&self, model: &Model) -> Result<SolveOutcome, SolveError> {
        validate_model(model)?;

        let sense = match model.sense() {
            Some(ObjectiveSense::Maximize) => Sense::Maximise,
            _ => Sense::Minimise,
        };

        let mut objective = vec![0.0; model.variables.len()];
        if let Some(obj) = &model.objective {
            for term in &obj.terms {
                objective[term.column] += term.coefficient;
            }
        }

        let mut problem = RowProblem::new();

        // Add variables (columns) first, rows reference them
        let cols: Vec<Col> = model
            .variables
            .iter()
            .zip(&objective)
            .map(|(var, &obj_coeff)| match var.domain {
                VariableDomain::Continuous => problem.add_column(obj_coeff, var.lower..=var.upper),
                VariableDomain::Binary | VariableDomain::Integer => {
                    problem.add_integer_column(obj_coeff, var.lower..=var.upper)
                }
            })
            .collect();

        for constraint in model.constraints.iter().filter(|c| !c.terms.is_empty()) {
            let row_factors: Vec<(Col, f64)> = constraint
                .terms
                .iter()
                .map(|t| (cols[t.column], t.coefficient))
                .collect();
            let rhs = constraint.rhs;
            match constraint.comparison {
                Comparison::LessEqual => problem.add_row(..=rhs, row_factors),
                Comparison::Equal => problem.add_row(rhs..=rhs, row_factors),
                Comparison::GreaterEqual => problem.add_row(rhs.., row_factors),
            }
        }

        let mut highs_model = problem.optimise(sense);
        highs_model.set_option("time_limit", self.settings.time_limit.as_secs_f64());
        highs_model.set_option("output_flag", self.settings.log_sink.captures());

        let solved = highs_model.try_solve().map_err(|status| SolveError::Backend {
            solver: self.name().to_string(),
            details: format!("{:?}", status),
        })?;

        let status = Self::convert_status(solved.status());
        let values = status.has_solution().then(|| {
            let solution = solved.get_solution();
            (0..model.variables.len())
                .map(|idx| solution.columns().get(idx).copied().unwrap_or(0.0))
                .collect()
        });

        Ok(SolveOutcome::new(model, status, values, self.name()))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}
