//! Random instance generation.
//!
//! Demands are drawn so that total demand never exceeds total capacity.

use rand::Rng;
use std::ops::RangeInclusive;

use crate::instance::{CostMatrix, Instance};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub facilities: RangeInclusive<usize>,
    pub customers: RangeInclusive<usize>,
    pub capacity: RangeInclusive<i64>,
    pub fixed_cost: RangeInclusive<i64>,
    pub max_demand: i64,
    pub coefficient: RangeInclusive<i64>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        GeneratorParams {
            facilities: 3..=7,
            customers: 3..=7,
            capacity: 1..=100,
            fixed_cost: 1..=100,
            max_demand: 100,
            coefficient: 1..=100,
        }
    }
}

pub fn generate<R: Rng>(rng: &mut R, params: &GeneratorParams) -> Instance {
    let n = rng.random_range(params.facilities.clone());
    let m = rng.random_range(params.customers.clone());

    let facilities: Vec<(i64, f64)> = (0..n)
        .map(|_| {
            (
                rng.random_range(params.capacity.clone()),
                rng.random_range(params.fixed_cost.clone()) as f64,
            )
        })
        .collect();
    let total_capacity: i64 = facilities.iter().map(|&(cap, _)| cap).sum();

    let mut remaining = total_capacity;
    let mut demands = Vec::with_capacity(m);
    let mut per_customer: Vec<Vec<f64>> = Vec::with_capacity(m);
    for _ in 0..m {
        let limit = params.max_demand.min(remaining).max(0);
        let demand = rng.random_range(0..=limit);
        remaining -= demand;
        demands.push(demand);
        per_customer.push(
            (0..n)
                .map(|_| rng.random_range(params.coefficient.clone()) as f64)
                .collect(),
        );
    }

    let costs = CostMatrix::from_fn(n, m, |f, c| per_customer[c][f]);
    Instance::from_parts(&facilities, &demands, costs)
}
