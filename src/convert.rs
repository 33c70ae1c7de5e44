use crate::domain::solver::SolveError;
use crate::models::{Comparison, Model, SolveStatus, VariableDomain};
use std::collections::HashMap;

use glpk_rust::{
    Bound, IntegerSparseMatrix as GlpkMatrix, SparseLEIntegerPolyhedron as GlpkPoly,
    Status as GlpkStatus, Variable as GlpkVar,
};

const GLPK: &str = "GLPK";

/// Objective coefficients keyed by variable id, borrowed from the model.
pub fn to_borrowed_objective(model: &Model) -> HashMap<&str, f64> {
    let mut objective: HashMap<&str, f64> = HashMap::new();
    if let Some(obj) = &model.objective {
        for term in &obj.terms {
            *objective
                .entry(model.variables[term.column].id.as_str())
                .or_insert(0.0) += term.coefficient;
        }
    }
    objective
}

/// Convert a model to a GLPK LE polyhedron.
///
/// GLPK only takes integer rows of the form `A x <= b`: equalities become two
/// rows and `>=` rows are negated. Empty rows are dropped.
pub fn to_glpk_polyhedron(model: &Model) -> Result<GlpkPoly<'_>, SolveError> {
    let variables: Vec<GlpkVar<'_>> = model
        .variables
        .iter()
        .map(|v| {
            let bound: Bound = match v.domain {
                VariableDomain::Binary => (0, 1),
                VariableDomain::Integer => (to_int(v.lower, &v.id)?, upper_to_int(v.upper, &v.id)?),
                VariableDomain::Continuous => {
                    return Err(SolveError::Unsupported {
                        solver: GLPK.to_string(),
                        details: format!("variable {} is continuous", v.id),
                    })
                }
            };
            Ok(GlpkVar {
                id: v.id.as_str(), // borrow directly from the model
                bound,
            })
        })
        .collect::<Result<_, _>>()?;

    let mut rows: Vec<i32> = Vec::new();
    let mut cols: Vec<i32> = Vec::new();
    let mut vals: Vec<i32> = Vec::new();
    let mut b: Vec<Bound> = Vec::new();

    for constraint in model.constraints.iter().filter(|c| !c.terms.is_empty()) {
        let coefficients = constraint
            .terms
            .iter()
            .map(|t| Ok((t.column as i32, to_int(t.coefficient, &constraint.label)?)))
            .collect::<Result<Vec<(i32, i32)>, SolveError>>()?;
        let rhs = to_int(constraint.rhs, &constraint.label)?;

        let signs: &[i32] = match constraint.comparison {
            Comparison::LessEqual => &[1],
            Comparison::GreaterEqual => &[-1],
            Comparison::Equal => &[1, -1],
        };
        for &sign in signs {
            let row = b.len() as i32;
            for &(col, val) in &coefficients {
                rows.push(row);
                cols.push(col);
                vals.push(sign * val);
            }
            b.push((0, sign * rhs));
        }
    }

    // glpk-rust refuses an empty constraint matrix. Restating the first
    // column's upper bound as a row leaves the feasible set unchanged.
    if b.is_empty() {
        if let Some(first) = variables.first() {
            rows.push(0);
            cols.push(0);
            vals.push(1);
            b.push((0, first.bound.1));
        }
    }

    Ok(GlpkPoly {
        a: GlpkMatrix { rows, cols, vals },
        b,
        variables,
        double_bound: false,
    })
}

fn to_int(value: f64, context: &str) -> Result<i32, SolveError> {
    if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
        return Err(SolveError::Unsupported {
            solver: GLPK.to_string(),
            details: format!("{} has non-integral coefficient {}", context, value),
        });
    }
    Ok(value as i32)
}

fn upper_to_int(value: f64, context: &str) -> Result<i32, SolveError> {
    if value.is_infinite() || value >= i32::MAX as f64 {
        Ok(i32::MAX)
    } else {
        to_int(value, context)
    }
}

impl From<GlpkStatus> for SolveStatus {
    fn from(s: GlpkStatus) -> Self {
        match s {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Feasible => SolveStatus::NotSolved,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible => SolveStatus::Infeasible,
            GlpkStatus::Unbounded => SolveStatus::Unbounded,
            GlpkStatus::Undefined
            | GlpkStatus::SimplexFailed
            | GlpkStatus::MIPFailed
            | GlpkStatus::EmptySpace => SolveStatus::Undefined,
        }
    }
}
