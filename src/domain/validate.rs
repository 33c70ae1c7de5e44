use thiserror::Error;

use crate::domain::formulation::{Formulation, ObjectiveKind};
use crate::instance::Instance;
use crate::models::Model;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("cost matrix is {rows}x{cols} but the instance has {facilities} facilities and {customers} customers")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        facilities: usize,
        customers: usize,
    },

    #[error("{facility} has negative capacity {capacity}")]
    NegativeCapacity { facility: String, capacity: i64 },

    #[error("{customer} has negative demand {demand}")]
    NegativeDemand { customer: String, demand: i64 },

    #[error("{facility} has negative fixed cost {cost}")]
    NegativeFixedCost { facility: String, cost: f64 },

    #[error("transport cost from {facility} to {customer} is negative ({cost})")]
    NegativeCost {
        facility: String,
        customer: String,
        cost: f64,
    },

    #[error("non-finite coefficient for {what}")]
    NonFinite { what: String },
}

/// Check an instance before any variable is created for it.
pub fn validate_instance(instance: &Instance, formulation: &Formulation) -> Result<(), BuildError> {
    let n_fac = instance.facilities.len();
    let n_cus = instance.customers.len();
    if instance.costs.n_facilities() != n_fac || instance.costs.n_customers() != n_cus {
        return Err(BuildError::DimensionMismatch {
            rows: instance.costs.n_facilities(),
            cols: instance.costs.n_customers(),
            facilities: n_fac,
            customers: n_cus,
        });
    }

    for facility in &instance.facilities {
        if facility.capacity < 0 {
            return Err(BuildError::NegativeCapacity {
                facility: facility.id.clone(),
                capacity: facility.capacity,
            });
        }
        if !facility.fixed_cost.is_finite() {
            return Err(BuildError::NonFinite {
                what: format!("fixed cost of {}", facility.id),
            });
        }
        if facility.fixed_cost < 0.0 {
            return Err(BuildError::NegativeFixedCost {
                facility: facility.id.clone(),
                cost: facility.fixed_cost,
            });
        }
    }

    for customer in &instance.customers {
        if customer.demand < 0 {
            return Err(BuildError::NegativeDemand {
                customer: customer.id.clone(),
                demand: customer.demand,
            });
        }
    }

    for (f, c, value) in instance.costs.iter() {
        let facility = &instance.facilities[f].id;
        let customer = &instance.customers[c].id;
        if !value.is_finite() {
            return Err(BuildError::NonFinite {
                what: format!("{} -> {}", facility, customer),
            });
        }
        // Profits may be negative; transport costs may not.
        if formulation.objective() == ObjectiveKind::MinimizeCost && value < 0.0 {
            return Err(BuildError::NegativeCost {
                facility: facility.clone(),
                customer: customer.clone(),
                cost: value,
            });
        }
    }

    Ok(())
}

/// Error raised when a model handed to a backend references columns it does not own.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{details}")]
pub struct SolveInputError {
    pub details: String,
}

pub fn validate_model(model: &Model) -> Result<(), SolveInputError> {
    let n = model.variables.len();
    for variable in &model.variables {
        if variable.lower > variable.upper {
            return Err(SolveInputError {
                details: format!("Variable {} has lower bound above upper bound", variable.id),
            });
        }
    }
    for constraint in &model.constraints {
        if let Some(term) = constraint.terms.iter().find(|t| t.column >= n) {
            return Err(SolveInputError {
                details: format!(
                    "Constraint {} references missing column {}",
                    constraint.label, term.column,
                ),
            });
        }
    }
    if let Some(objective) = &model.objective {
        if let Some(term) = objective.terms.iter().find(|t| t.column >= n) {
            return Err(SolveInputError {
                details: format!("Objective contains missing column {}", term.column),
            });
        }
    }
    Ok(())
}
