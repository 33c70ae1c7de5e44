//! MILP formulations of the capacitated facility location problem.
//!
//! A [`Formulation`] fixes the objective (profit or cost), how facility capacity
//! is linked to the open flags, and the domain of the assignment variables.
//! [`build`] turns an [`Instance`] into a [`FacilityLocationModel`] for it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::validate::{validate_instance, BuildError};
use crate::instance::Instance;
use crate::models::{Comparison, Model, ObjectiveSense, Term, Variable, VariableDomain};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// profit·serve − fixed·open, maximized
    MaximizeProfit,
    /// cost·demand·serve + fixed·open, minimized
    MinimizeCost,
}

impl ObjectiveKind {
    pub fn sense(&self) -> ObjectiveSense {
        match self {
            ObjectiveKind::MaximizeProfit => ObjectiveSense::Maximize,
            ObjectiveKind::MinimizeCost => ObjectiveSense::Minimize,
        }
    }
}

/// How the per-facility capacity is tied to `open[f]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapacityLinking {
    /// One row per facility: load ≤ capacity·open.
    Aggregate,
    /// load ≤ capacity per facility, plus serve[f,c] ≤ open[f] per pair.
    Disaggregated,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formulation {
    objective: ObjectiveKind,
    linking: CapacityLinking,
    assignment: VariableDomain,
}

impl Formulation {
    /// Profit maximization with binary single-sourcing.
    pub fn maximize_profit(linking: CapacityLinking) -> Self {
        Formulation {
            objective: ObjectiveKind::MaximizeProfit,
            linking,
            assignment: VariableDomain::Binary,
        }
    }

    /// Cost minimization with binary assignments.
    pub fn minimize_cost(linking: CapacityLinking) -> Self {
        Formulation {
            objective: ObjectiveKind::MinimizeCost,
            linking,
            assignment: VariableDomain::Binary,
        }
    }

    /// Change the domain of `serve`. Profit maximization keeps binary assignments.
    pub fn with_assignment(mut self, domain: VariableDomain) -> Self {
        if self.objective == ObjectiveKind::MinimizeCost {
            self.assignment = domain;
        }
        self
    }

    pub fn objective(&self) -> ObjectiveKind {
        self.objective
    }

    pub fn linking(&self) -> CapacityLinking {
        self.linking
    }

    pub fn assignment(&self) -> VariableDomain {
        self.assignment
    }
}

/// A built model together with the column layout of its decision variables.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityLocationModel {
    pub model: Model,
    pub formulation: Formulation,
    pub facility_ids: Vec<String>,
    pub customer_ids: Vec<String>,
    pub capacities: Vec<i64>,
    pub demands: Vec<i64>,
    open: Vec<usize>,
    serve: Vec<Vec<usize>>,
}

impl FacilityLocationModel {
    pub fn n_facilities(&self) -> usize {
        self.open.len()
    }

    pub fn n_customers(&self) -> usize {
        self.customer_ids.len()
    }

    /// Column of `open[f]`.
    pub fn open_column(&self, facility: usize) -> usize {
        self.open[facility]
    }

    /// Column of `serve[f,c]`.
    pub fn serve_column(&self, facility: usize, customer: usize) -> usize {
        self.serve[facility][customer]
    }
}

pub fn build(instance: &Instance, formulation: Formulation) -> Result<FacilityLocationModel, BuildError> {
    validate_instance(instance, &formulation)?;

    let facilities = &instance.facilities;
    let customers = &instance.customers;
    let mut model = Model::new("FacilityLocationProblem");

    let open: Vec<usize> = facilities
        .iter()
        .map(|f| model.add_variable(Variable::binary(format!("Open_{}", f.id))))
        .collect();

    let serve: Vec<Vec<usize>> = facilities
        .iter()
        .map(|f| {
            customers
                .iter()
                .map(|c| {
                    model.add_variable(Variable::non_negative(
                        format!("Serve_{}_{}", f.id, c.id),
                        formulation.assignment,
                    ))
                })
                .collect()
        })
        .collect();

    // Objective
    let mut objective = Vec::with_capacity(facilities.len() * (customers.len() + 1));
    for (i, facility) in facilities.iter().enumerate() {
        for (j, customer) in customers.iter().enumerate() {
            let coef = instance.costs.get(i, j);
            let coefficient = match formulation.objective {
                ObjectiveKind::MaximizeProfit => coef,
                ObjectiveKind::MinimizeCost => coef * customer.demand as f64,
            };
            objective.push(Term::new(serve[i][j], coefficient));
        }
        let fixed = match formulation.objective {
            ObjectiveKind::MaximizeProfit => -facility.fixed_cost,
            ObjectiveKind::MinimizeCost => facility.fixed_cost,
        };
        objective.push(Term::new(open[i], fixed));
    }
    model.set_objective(formulation.objective.sense(), objective);

    // Single-sourcing
    for (j, customer) in customers.iter().enumerate() {
        let terms = (0..facilities.len())
            .map(|i| Term::new(serve[i][j], 1.0))
            .collect();
        model.add_constraint(format!("Demand_{}", customer.id), terms, Comparison::Equal, 1.0);
    }

    // Capacity
    for (i, facility) in facilities.iter().enumerate() {
        let mut terms: Vec<Term> = customers
            .iter()
            .enumerate()
            .map(|(j, c)| Term::new(serve[i][j], c.demand as f64))
            .collect();
        let capacity = facility.capacity as f64;
        match formulation.linking {
            CapacityLinking::Aggregate => {
                terms.push(Term::new(open[i], -capacity));
                model.add_constraint(
                    format!("Capacity_{}", facility.id),
                    terms,
                    Comparison::LessEqual,
                    0.0,
                );
            }
            CapacityLinking::Disaggregated => {
                model.add_constraint(
                    format!("Capacity_{}", facility.id),
                    terms,
                    Comparison::LessEqual,
                    capacity,
                );
            }
        }

        // A zero-demand customer carries no weight in the capacity row, so it
        // needs its own link to the open flag and is barred from a facility
        // without capacity.
        for (j, customer) in customers.iter().enumerate() {
            if formulation.linking == CapacityLinking::Disaggregated || customer.demand == 0 {
                model.add_constraint(
                    format!("Link_{}_{}", facility.id, customer.id),
                    vec![Term::new(serve[i][j], 1.0), Term::new(open[i], -1.0)],
                    Comparison::LessEqual,
                    0.0,
                );
            }
            if facility.capacity == 0 && customer.demand == 0 {
                model.add_constraint(
                    format!("NoCapacity_{}_{}", facility.id, customer.id),
                    vec![Term::new(serve[i][j], 1.0)],
                    Comparison::LessEqual,
                    0.0,
                );
            }
        }
    }

    debug!(
        "Built {:?}/{:?} model: {} variables, {} constraints",
        formulation.objective,
        formulation.linking,
        model.variables.len(),
        model.constraints.len(),
    );

    Ok(FacilityLocationModel {
        model,
        formulation,
        facility_ids: facilities.iter().map(|f| f.id.clone()).collect(),
        customer_ids: customers.iter().map(|c| c.id.clone()).collect(),
        capacities: facilities.iter().map(|f| f.capacity).collect(),
        demands: customers.iter().map(|c| c.demand).collect(),
        open,
        serve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::CostMatrix;

    fn two_by_two() -> Instance {
        Instance::from_parts(&[(10, 5.0), (10, 5.0)], &[5, 5], CostMatrix::filled(2, 2, 1.0))
    }

    fn coefficient_of(model: &FacilityLocationModel, column: usize) -> f64 {
        model
            .model
            .objective
            .as_ref()
            .unwrap()
            .terms
            .iter()
            .find(|t| t.column == column)
            .map(|t| t.coefficient)
            .unwrap()
    }

    #[test]
    fn test_aggregate_linking_has_one_capacity_row_per_facility() {
        let built = build(&two_by_two(), Formulation::minimize_cost(CapacityLinking::Aggregate)).unwrap();
        // 2 demand rows + 2 capacity rows
        assert_eq!(built.model.constraints.len(), 4);
        let row = built.model.constraint("Capacity_Facility1").unwrap();
        assert_eq!(row.rhs, 0.0);
        assert!(row.terms.contains(&Term::new(built.open_column(0), -10.0)));
        assert!(row.terms.contains(&Term::new(built.serve_column(0, 1), 5.0)));
    }

    #[test]
    fn test_disaggregated_linking_adds_one_row_per_pair() {
        let built =
            build(&two_by_two(), Formulation::minimize_cost(CapacityLinking::Disaggregated)).unwrap();
        // 2 demand + 2 capacity + 4 link rows
        assert_eq!(built.model.constraints.len(), 8);
        let cap = built.model.constraint("Capacity_Facility2").unwrap();
        assert_eq!(cap.rhs, 10.0);
        assert!(cap.terms.iter().all(|t| t.column != built.open_column(1)));
        let link = built.model.constraint("Link_Facility2_Customer1").unwrap();
        assert_eq!(
            link.terms,
            vec![Term::new(built.serve_column(1, 0), 1.0), Term::new(built.open_column(1), -1.0)]
        );
    }

    #[test]
    fn test_demand_rows_sum_serve_to_one() {
        let built = build(&two_by_two(), Formulation::maximize_profit(CapacityLinking::Aggregate)).unwrap();
        let row = built.model.constraint("Demand_Customer2").unwrap();
        assert_eq!(row.comparison, Comparison::Equal);
        assert_eq!(row.rhs, 1.0);
        assert_eq!(row.terms.len(), 2);
    }

    #[test]
    fn test_cost_objective_adds_fixed_cost_and_weights_by_demand() {
        let built = build(&two_by_two(), Formulation::minimize_cost(CapacityLinking::Aggregate)).unwrap();
        assert_eq!(built.model.sense(), Some(ObjectiveSense::Minimize));
        assert_eq!(coefficient_of(&built, built.open_column(0)), 5.0);
        assert_eq!(coefficient_of(&built, built.serve_column(0, 0)), 5.0);
    }

    #[test]
    fn test_profit_objective_subtracts_fixed_cost() {
        let built = build(&two_by_two(), Formulation::maximize_profit(CapacityLinking::Aggregate)).unwrap();
        assert_eq!(built.model.sense(), Some(ObjectiveSense::Maximize));
        assert_eq!(coefficient_of(&built, built.open_column(1)), -5.0);
        assert_eq!(coefficient_of(&built, built.serve_column(1, 1)), 1.0);
    }

    #[test]
    fn test_assignment_domain_follows_formulation() {
        let relaxed = Formulation::minimize_cost(CapacityLinking::Disaggregated)
            .with_assignment(VariableDomain::Continuous);
        let built = build(&two_by_two(), relaxed).unwrap();
        let serve = &built.model.variables[built.serve_column(0, 0)];
        assert_eq!(serve.domain, VariableDomain::Continuous);
        assert_eq!(serve.id, "Serve_Facility1_Customer1");
        let open = &built.model.variables[built.open_column(0)];
        assert_eq!(open.domain, VariableDomain::Binary);
    }

    #[test]
    fn test_profit_formulation_stays_binary() {
        let f = Formulation::maximize_profit(CapacityLinking::Aggregate)
            .with_assignment(VariableDomain::Continuous);
        assert_eq!(f.assignment(), VariableDomain::Binary);
    }

    #[test]
    fn test_build_is_idempotent() {
        let instance = two_by_two();
        for formulation in [
            Formulation::maximize_profit(CapacityLinking::Aggregate),
            Formulation::minimize_cost(CapacityLinking::Aggregate),
            Formulation::minimize_cost(CapacityLinking::Disaggregated),
        ] {
            let first = build(&instance, formulation).unwrap();
            let second = build(&instance, formulation).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_zero_customers_builds_open_variables_only() {
        let instance = Instance::from_parts(&[(4, 2.0)], &[], CostMatrix::filled(1, 0, 0.0));
        let built = build(&instance, Formulation::minimize_cost(CapacityLinking::Disaggregated)).unwrap();
        assert_eq!(built.model.variables.len(), 1);
        assert_eq!(built.n_customers(), 0);
        assert_eq!(built.model.constraints.len(), 1);
    }

    #[test]
    fn test_zero_demand_customer_is_linked_under_aggregate() {
        let instance = Instance::from_parts(&[(10, 5.0), (10, 5.0)], &[0, 5], CostMatrix::filled(2, 2, 1.0));
        let built = build(&instance, Formulation::maximize_profit(CapacityLinking::Aggregate)).unwrap();
        // 2 demand + 2 capacity + 2 links for the zero-demand customer
        assert_eq!(built.model.constraints.len(), 6);
        let link = built.model.constraint("Link_Facility1_Customer1").unwrap();
        assert_eq!(
            link.terms,
            vec![Term::new(built.serve_column(0, 0), 1.0), Term::new(built.open_column(0), -1.0)]
        );
        assert!(built.model.constraint("Link_Facility1_Customer2").is_none());

        // Serving the zero-demand customer from a closed facility is cut off.
        let mut values = vec![0.0; built.model.variables.len()];
        values[built.serve_column(0, 0)] = 1.0;
        values[built.serve_column(1, 1)] = 1.0;
        values[built.open_column(1)] = 1.0;
        assert!(!link.is_satisfied(&values, 1e-9));
    }

    #[test]
    fn test_zero_capacity_facility_cannot_serve_zero_demand_customer() {
        let instance = Instance::from_parts(
            &[(0, 10.0), (10, 10.0)],
            &[0],
            CostMatrix::from_rows(vec![vec![100.0], vec![1.0]], 1).unwrap(),
        );
        for linking in [CapacityLinking::Aggregate, CapacityLinking::Disaggregated] {
            let built = build(&instance, Formulation::maximize_profit(linking)).unwrap();
            let row = built.model.constraint("NoCapacity_Facility1_Customer1").unwrap();
            assert_eq!(row.terms, vec![Term::new(built.serve_column(0, 0), 1.0)]);
            assert_eq!(row.rhs, 0.0);
            assert!(built.model.constraint("NoCapacity_Facility2_Customer1").is_none());

            let mut values = vec![0.0; built.model.variables.len()];
            values[built.open_column(0)] = 1.0;
            values[built.serve_column(0, 0)] = 1.0;
            assert!(built.model.constraints.iter().any(|c| !c.is_satisfied(&values, 1e-9)));
        }
    }

    #[test]
    fn test_build_rejects_negative_capacity() {
        let instance = Instance::from_parts(&[(-4, 2.0)], &[1], CostMatrix::filled(1, 1, 1.0));
        assert!(build(&instance, Formulation::minimize_cost(CapacityLinking::Aggregate)).is_err());
    }
}
