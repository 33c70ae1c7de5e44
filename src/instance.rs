//! Problem instances: facilities, customers and the facility × customer cost matrix.
//!
//! Instances are read from the whitespace-delimited text format
//!
//! ```text
//! F C
//! capacity_1 fixedCost_1
//! ...
//! demand_1 coef_1_1 coef_2_1 ... coef_F_1
//! ...
//! ```
//!
//! and are never mutated after construction.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("failed to read instance file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message} (`{content}`)")]
    Parse {
        line: usize,
        content: String,
        message: String,
    },

    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("cost matrix row {row} has {found} entries, expected {expected}")]
    IncompleteCostMatrix {
        row: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: String,
    pub capacity: i64,
    pub fixed_cost: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub demand: i64,
}

/// Dense facility-major matrix of per-(facility, customer) coefficients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CostMatrix {
    n_facilities: usize,
    n_customers: usize,
    values: Vec<f64>,
}

impl CostMatrix {
    /// Build from one row per facility; every row must hold `n_customers` entries.
    pub fn from_rows(rows: Vec<Vec<f64>>, n_customers: usize) -> Result<Self, InstanceError> {
        let n_facilities = rows.len();
        let mut values = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != n_customers {
                return Err(InstanceError::IncompleteCostMatrix {
                    row,
                    found: entries.len(),
                    expected: n_customers,
                });
            }
            values.extend(entries);
        }
        Ok(CostMatrix {
            n_facilities,
            n_customers,
            values,
        })
    }

    pub fn from_fn(
        n_facilities: usize,
        n_customers: usize,
        mut value: impl FnMut(usize, usize) -> f64,
    ) -> Self {
        let mut values = Vec::with_capacity(n_facilities * n_customers);
        for f in 0..n_facilities {
            for c in 0..n_customers {
                values.push(value(f, c));
            }
        }
        CostMatrix {
            n_facilities,
            n_customers,
            values,
        }
    }

    pub fn filled(n_facilities: usize, n_customers: usize, value: f64) -> Self {
        CostMatrix {
            n_facilities,
            n_customers,
            values: vec![value; n_facilities * n_customers],
        }
    }

    pub fn n_facilities(&self) -> usize {
        self.n_facilities
    }

    pub fn n_customers(&self) -> usize {
        self.n_customers
    }

    pub fn get(&self, facility: usize, customer: usize) -> f64 {
        self.values[facility * self.n_customers + customer]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / self.n_customers, i % self.n_customers, v))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub facilities: Vec<Facility>,
    pub customers: Vec<Customer>,
    pub costs: CostMatrix,
}

pub fn facility_id(index: usize) -> String {
    format!("Facility{}", index + 1)
}

pub fn customer_id(index: usize) -> String {
    format!("Customer{}", index + 1)
}

impl Instance {
    /// Assemble an instance from raw columns, naming facilities and customers by position.
    pub fn from_parts(
        facilities: &[(i64, f64)],
        demands: &[i64],
        costs: CostMatrix,
    ) -> Self {
        Instance {
            facilities: facilities
                .iter()
                .enumerate()
                .map(|(i, &(capacity, fixed_cost))| Facility {
                    id: facility_id(i),
                    capacity,
                    fixed_cost,
                })
                .collect(),
            customers: demands
                .iter()
                .enumerate()
                .map(|(j, &demand)| Customer {
                    id: customer_id(j),
                    demand,
                })
                .collect(),
            costs,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let text = fs::read_to_string(path)?;
        Instance::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, InstanceError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());

        let (line, content) = lines.next().ok_or_else(|| InstanceError::UnexpectedEof {
            expected: "header line `F C`".to_string(),
        })?;
        let header = parse_record::<usize>(line, content, 2)?;
        let (n_facilities, n_customers) = (header[0], header[1]);

        // Header counts are untrusted; storage grows only with lines actually read.
        let mut facilities = Vec::new();
        for i in 0..n_facilities {
            let (line, content) = lines.next().ok_or_else(|| InstanceError::UnexpectedEof {
                expected: format!("facility line {} of {}", i + 1, n_facilities),
            })?;
            let tokens = tokens_exact(line, content, 2)?;
            let capacity = parse_token::<i64>(line, content, tokens[0])?;
            let fixed_cost = parse_token::<f64>(line, content, tokens[1])?;
            facilities.push((capacity, fixed_cost));
        }

        let mut demands = Vec::new();
        let mut rows = vec![Vec::new(); facilities.len()];
        for j in 0..n_customers {
            let (line, content) = lines.next().ok_or_else(|| InstanceError::UnexpectedEof {
                expected: format!("customer line {} of {}", j + 1, n_customers),
            })?;
            let tokens = tokens_exact(line, content, facilities.len() + 1)?;
            demands.push(parse_token::<i64>(line, content, tokens[0])?);
            for (i, token) in tokens[1..].iter().enumerate() {
                rows[i].push(parse_token::<f64>(line, content, token)?);
            }
        }

        if let Some((line, content)) = lines.next() {
            return Err(InstanceError::Parse {
                line,
                content: content.to_string(),
                message: "unexpected trailing data".to_string(),
            });
        }

        let costs = CostMatrix::from_rows(rows, n_customers)?;
        Ok(Instance::from_parts(&facilities, &demands, costs))
    }

    /// Serialize back into the instance file format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", self.facilities.len(), self.customers.len());
        for f in &self.facilities {
            let _ = writeln!(out, "{} {}", f.capacity, f.fixed_cost);
        }
        for (j, c) in self.customers.iter().enumerate() {
            let _ = write!(out, "{}", c.demand);
            for i in 0..self.facilities.len() {
                let _ = write!(out, " {}", self.costs.get(i, j));
            }
            out.push('\n');
        }
        out
    }

    pub fn total_capacity(&self) -> i64 {
        self.facilities.iter().map(|f| f.capacity).sum()
    }

    pub fn total_demand(&self) -> i64 {
        self.customers.iter().map(|c| c.demand).sum()
    }
}

fn tokens_exact<'a>(
    line: usize,
    content: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, InstanceError> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(InstanceError::Parse {
            line,
            content: content.to_string(),
            message: format!("expected {} tokens, found {}", expected, tokens.len()),
        });
    }
    Ok(tokens)
}

fn parse_token<T: FromStr>(line: usize, content: &str, token: &str) -> Result<T, InstanceError> {
    token.parse::<T>().map_err(|_| InstanceError::Parse {
        line,
        content: content.to_string(),
        message: format!("`{}` is not a valid number", token),
    })
}

fn parse_record<T: FromStr>(
    line: usize,
    content: &str,
    expected: usize,
) -> Result<Vec<T>, InstanceError> {
    tokens_exact(line, content, expected)?
        .into_iter()
        .map(|t| parse_token(line, content, t))
        .collect()
}
