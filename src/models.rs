use serde::{Deserialize, Serialize};
use std::fmt;

// ---------- MILP model types: owned & backend-agnostic ----------

/// Integrality class of a decision variable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableDomain {
    Binary,
    Integer,
    Continuous,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: String,
    pub domain: VariableDomain,
    pub lower: f64,
    pub upper: f64, // f64::INFINITY when unbounded
}

impl Variable {
    pub fn binary(id: impl Into<String>) -> Self {
        Variable {
            id: id.into(),
            domain: VariableDomain::Binary,
            lower: 0.0,
            upper: 1.0,
        }
    }

    pub fn non_negative(id: impl Into<String>, domain: VariableDomain) -> Self {
        match domain {
            VariableDomain::Binary => Variable::binary(id),
            _ => Variable {
                id: id.into(),
                domain,
                lower: 0.0,
                upper: f64::INFINITY,
            },
        }
    }
}

/// A coefficient applied to the variable at `column` in [`Model::variables`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub column: usize,
    pub coefficient: f64,
}

impl Term {
    pub fn new(column: usize, coefficient: f64) -> Self {
        Term { column, coefficient }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::LessEqual => write!(f, "<="),
            Comparison::Equal => write!(f, "="),
            Comparison::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Linear row `terms (cmp) rhs` with a label that stays stable across builds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Constraint {
    pub label: String,
    pub terms: Vec<Term>,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl Constraint {
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.column).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether `values` satisfy this row within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.comparison {
            Comparison::LessEqual => lhs <= self.rhs + tolerance,
            Comparison::Equal => (lhs - self.rhs).abs() <= tolerance,
            Comparison::GreaterEqual => lhs + tolerance >= self.rhs,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: ObjectiveSense,
    pub terms: Vec<Term>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    pub objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Model {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Append a variable and return its column index.
    pub fn add_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    pub fn add_constraint(
        &mut self,
        label: impl Into<String>,
        terms: Vec<Term>,
        comparison: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            label: label.into(),
            terms,
            comparison,
            rhs,
        });
    }

    pub fn set_objective(&mut self, sense: ObjectiveSense, terms: Vec<Term>) {
        self.objective = Some(Objective { sense, terms });
    }

    pub fn sense(&self) -> Option<ObjectiveSense> {
        self.objective.as_ref().map(|o| o.sense)
    }

    pub fn constraint(&self, label: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.label == label)
    }

    /// Objective value at `values`. A model without an objective evaluates to zero.
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        match &self.objective {
            Some(objective) => objective
                .terms
                .iter()
                .map(|t| t.coefficient * values.get(t.column).copied().unwrap_or(0.0))
                .sum(),
            None => 0.0,
        }
    }

    pub fn has_integer_variables(&self) -> bool {
        self.variables
            .iter()
            .any(|v| v.domain != VariableDomain::Continuous)
    }
}

// ---------- Solve results (decoupled from the backends) ----------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    NotSolved,
    Infeasible,
    Unbounded,
    Undefined,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::NotSolved)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::NotSolved => "Not Solved",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::Undefined => "Undefined",
        };
        write!(f, "{}", s)
    }
}

/// What a backend hands back: a status plus one value per model column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub values: Option<Vec<f64>>,
    pub solver: String,
}

impl SolveOutcome {
    /// Build an outcome, recomputing the objective from `values` so every backend
    /// reports it the same way.
    pub fn new(model: &Model, status: SolveStatus, values: Option<Vec<f64>>, solver: &str) -> Self {
        let objective_value = values.as_ref().map(|v| model.evaluate_objective(v));
        SolveOutcome {
            status,
            objective_value,
            values,
            solver: solver.to_string(),
        }
    }

    pub fn value(&self, column: usize) -> f64 {
        self.values
            .as_ref()
            .and_then(|v| v.get(column).copied())
            .unwrap_or(0.0)
    }

    pub fn objective_or_zero(&self) -> f64 {
        self.objective_value.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> Model {
        let mut model = Model::new("small");
        let x = model.add_variable(Variable::binary("x"));
        let y = model.add_variable(Variable::non_negative("y", VariableDomain::Continuous));
        model.add_constraint(
            "sum",
            vec![Term::new(x, 1.0), Term::new(y, 1.0)],
            Comparison::Equal,
            1.0,
        );
        model.set_objective(ObjectiveSense::Minimize, vec![Term::new(x, 3.0), Term::new(y, 2.0)]);
        model
    }

    #[test]
    fn test_evaluate_objective_without_objective_is_zero() {
        let model = Model::new("empty");
        assert_eq!(model.evaluate_objective(&[1.0, 2.0]), 0.0);
        assert_eq!(model.sense(), None);
    }

    #[test]
    fn test_evaluate_objective_sums_terms() {
        let model = small_model();
        assert_eq!(model.evaluate_objective(&[1.0, 0.5]), 4.0);
    }

    #[test]
    fn test_constraint_satisfaction_respects_tolerance() {
        let model = small_model();
        let row = model.constraint("sum").unwrap();
        assert!(row.is_satisfied(&[0.0, 1.0 + 1e-9], 1e-6));
        assert!(!row.is_satisfied(&[1.0, 1.0], 1e-6));
    }

    #[test]
    fn test_non_negative_binary_keeps_unit_bounds() {
        let v = Variable::non_negative("b", VariableDomain::Binary);
        assert_eq!(v.upper, 1.0);
        let v = Variable::non_negative("i", VariableDomain::Integer);
        assert!(v.upper.is_infinite());
    }

    #[test]
    fn test_outcome_without_values_reports_zero_objective() {
        let model = small_model();
        let outcome = SolveOutcome::new(&model, SolveStatus::Infeasible, None, "GLPK");
        assert_eq!(outcome.objective_value, None);
        assert_eq!(outcome.objective_or_zero(), 0.0);
        assert_eq!(outcome.value(0), 0.0);
    }
}
