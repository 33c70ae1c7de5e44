//! Decision reports built from a solved facility location model.

use serde::Serialize;
use std::fmt;

use crate::domain::formulation::{FacilityLocationModel, ObjectiveKind};
use crate::models::{SolveOutcome, SolveStatus};

const OPEN_THRESHOLD: f64 = 0.5;
const ASSIGNMENT_EPSILON: f64 = 1e-6;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AssignmentLine {
    pub customer: String,
    /// Share of the customer's demand, in [0, 1]
    pub fraction: f64,
    pub quantity: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FacilityReport {
    pub facility: String,
    pub capacity: i64,
    pub load: f64,
    pub assignments: Vec<AssignmentLine>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SolutionReport {
    pub solver: String,
    pub status: SolveStatus,
    pub objective: ObjectiveKind,
    pub objective_value: f64,
    /// Open facilities only
    pub facilities: Vec<FacilityReport>,
    pub opened: usize,
    pub total_facilities: usize,
}

impl SolutionReport {
    pub fn new(model: &FacilityLocationModel, outcome: &SolveOutcome) -> Self {
        let mut facilities = Vec::new();
        if outcome.values.is_some() {
            for (i, facility) in model.facility_ids.iter().enumerate() {
                if outcome.value(model.open_column(i)) <= OPEN_THRESHOLD {
                    continue;
                }
                let assignments: Vec<AssignmentLine> = model
                    .customer_ids
                    .iter()
                    .enumerate()
                    .filter_map(|(j, customer)| {
                        let fraction = outcome.value(model.serve_column(i, j));
                        (fraction > ASSIGNMENT_EPSILON).then(|| AssignmentLine {
                            customer: customer.clone(),
                            fraction,
                            quantity: fraction * model.demands[j] as f64,
                        })
                    })
                    .collect();
                facilities.push(FacilityReport {
                    facility: facility.clone(),
                    capacity: model.capacities[i],
                    load: assignments.iter().map(|a| a.quantity).sum(),
                    assignments,
                });
            }
        }

        SolutionReport {
            solver: outcome.solver.clone(),
            status: outcome.status,
            objective: model.formulation.objective(),
            objective_value: outcome.objective_or_zero(),
            opened: facilities.len(),
            facilities,
            total_facilities: model.n_facilities(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        let label = match self.objective {
            ObjectiveKind::MaximizeProfit => "Total Profit",
            ObjectiveKind::MinimizeCost => "Total Cost",
        };
        writeln!(f, "{}: {}", label, self.objective_value)?;
        for facility in &self.facilities {
            writeln!(
                f,
                "{} open (load {} / {})",
                facility.facility, facility.load, facility.capacity
            )?;
            for a in &facility.assignments {
                writeln!(f, "  Serve {}: {} (quantity {})", a.customer, a.fraction, a.quantity)?;
            }
        }
        write!(
            f,
            "Opened facilities: {} of {} (solver: {})",
            self.opened, self.total_facilities, self.solver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formulation::{build, CapacityLinking, Formulation};
    use crate::instance::{CostMatrix, Instance};

    fn built() -> FacilityLocationModel {
        let instance = Instance::from_parts(
            &[(10, 5.0), (10, 5.0), (4, 1.0)],
            &[5, 5],
            CostMatrix::filled(3, 2, 1.0),
        );
        build(&instance, Formulation::minimize_cost(CapacityLinking::Disaggregated)).unwrap()
    }

    fn outcome_with(model: &FacilityLocationModel, set: &[(usize, f64)]) -> SolveOutcome {
        let mut values = vec![0.0; model.model.variables.len()];
        for &(col, v) in set {
            values[col] = v;
        }
        SolveOutcome::new(&model.model, SolveStatus::Optimal, Some(values), "GLPK")
    }

    #[test]
    fn test_report_lists_only_open_facilities_and_nonzero_assignments() {
        let model = built();
        let outcome = outcome_with(
            &model,
            &[
                (model.open_column(1), 1.0),
                (model.serve_column(1, 0), 1.0),
                (model.serve_column(1, 1), 1.0),
            ],
        );
        let report = SolutionReport::new(&model, &outcome);
        assert_eq!(report.opened, 1);
        assert_eq!(report.total_facilities, 3);
        assert_eq!(report.facilities[0].facility, "Facility2");
        assert_eq!(report.facilities[0].assignments.len(), 2);
        assert_eq!(report.facilities[0].load, 10.0);
        assert_eq!(report.objective_value, 15.0);

        let text = report.to_string();
        assert!(text.starts_with("Status: Optimal\nTotal Cost: 15\n"));
        assert!(text.contains("Facility2 open (load 10 / 10)"));
        assert!(text.contains("  Serve Customer1: 1 (quantity 5)"));
        assert!(!text.contains("Facility1"));
        assert!(text.ends_with("Opened facilities: 1 of 3 (solver: GLPK)"));
    }

    #[test]
    fn test_fractional_assignments_are_reported_with_quantity() {
        let model = built();
        let outcome = outcome_with(
            &model,
            &[
                (model.open_column(0), 1.0),
                (model.open_column(2), 1.0),
                (model.serve_column(0, 0), 0.2),
                (model.serve_column(2, 0), 0.8),
                (model.serve_column(0, 1), 1.0),
            ],
        );
        let report = SolutionReport::new(&model, &outcome);
        assert_eq!(report.opened, 2);
        let third = &report.facilities[1];
        assert_eq!(third.facility, "Facility3");
        assert!((third.assignments[0].quantity - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_outcome_reports_zero_objective_and_no_facilities() {
        let model = built();
        let outcome = SolveOutcome::new(&model.model, SolveStatus::Infeasible, None, "GLPK");
        let report = SolutionReport::new(&model, &outcome);
        assert_eq!(report.objective_value, 0.0);
        assert!(report.facilities.is_empty());
        assert!(report.to_string().contains("Status: Infeasible\nTotal Cost: 0\n"));
    }

    #[test]
    fn test_json_rendering_contains_structured_fields() {
        let model = built();
        let outcome = outcome_with(&model, &[(model.open_column(0), 1.0)]);
        let json: serde_json::Value =
            serde_json::from_str(&SolutionReport::new(&model, &outcome).to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "Optimal");
        assert_eq!(json["objective"], "minimize_cost");
        assert_eq!(json["opened"], 1);
        assert_eq!(json["facilities"][0]["facility"], "Facility1");
    }
}
