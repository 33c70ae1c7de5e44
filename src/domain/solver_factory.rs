use log::warn;

use crate::domain::solver::{Solver, SolverSettings};
use crate::domain::solvers::GlpkSolver;

#[cfg(feature = "highs-solver")]
use crate::domain::solvers::HighsSolver;

#[cfg(feature = "gurobi-solver")]
use crate::domain::solvers::GurobiSolver;

/// Available solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    #[default]
    Glpk,
    #[cfg(feature = "highs-solver")]
    Highs,
    #[cfg(feature = "gurobi-solver")]
    Gurobi,
}

impl SolverType {
    /// Parse solver type from its identifier (case-sensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GLPK" => Some(SolverType::Glpk),
            #[cfg(feature = "highs-solver")]
            "HIGHS" => Some(SolverType::Highs),
            #[cfg(feature = "gurobi-solver")]
            "GUROBI" => Some(SolverType::Gurobi),
            _ => None,
        }
    }

    /// Resolve an optional solver name, falling back to the default backend
    /// when the name is unknown or its backend was not compiled in.
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => SolverType::default(),
            Some(s) => SolverType::from_str(s).unwrap_or_else(|| {
                warn!(
                    "Invalid solver name {:?}. Using default solver {}.",
                    s,
                    SolverType::default().identifier()
                );
                SolverType::default()
            }),
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            SolverType::Glpk => "GLPK",
            #[cfg(feature = "highs-solver")]
            SolverType::Highs => "HIGHS",
            #[cfg(feature = "gurobi-solver")]
            SolverType::Gurobi => "GUROBI",
        }
    }
}

/// Create a solver instance based on the specified type
pub fn create_solver(solver_type: SolverType, settings: SolverSettings) -> Box<dyn Solver> {
    match solver_type {
        SolverType::Glpk => Box::new(GlpkSolver::new(settings)),
        #[cfg(feature = "highs-solver")]
        SolverType::Highs => Box::new(HighsSolver::new(settings)),
        #[cfg(feature = "gurobi-solver")]
        SolverType::Gurobi => Box::new(GurobiSolver::new(settings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_solver_type_from_str() {
        assert_eq!(SolverType::from_str("GLPK"), Some(SolverType::Glpk));
        assert_eq!(SolverType::from_str("glpk"), None);
        #[cfg(feature = "highs-solver")]
        assert_eq!(SolverType::from_str("HIGHS"), Some(SolverType::Highs));
        #[cfg(feature = "highs-solver")]
        assert_eq!(SolverType::from_str("HiGHS"), None);
        #[cfg(feature = "gurobi-solver")]
        assert_eq!(SolverType::from_str("GUROBI"), Some(SolverType::Gurobi));
        assert_eq!(SolverType::from_str("unknown"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        assert_eq!(SolverType::resolve(None), SolverType::Glpk);
        assert_eq!(SolverType::resolve(Some("SCIP")), SolverType::Glpk);
        assert_eq!(SolverType::resolve(Some("GLPK")), SolverType::Glpk);
    }

    #[test]
    fn test_identifier_parses_back() {
        let t = SolverType::default();
        assert_eq!(SolverType::from_str(t.identifier()), Some(t));
    }

    #[test]
    fn test_create_glpk_solver_carries_settings() {
        let settings = SolverSettings {
            time_limit: Duration::from_secs(12),
            ..SolverSettings::default()
        };
        let solver = create_solver(SolverType::Glpk, settings.clone());
        assert_eq!(solver.name(), "GLPK");
        assert_eq!(solver.settings(), &settings);
    }

    #[cfg(feature = "highs-solver")]
    #[test]
    fn test_create_highs_solver() {
        let solver = create_solver(SolverType::Highs, SolverSettings::default());
        assert_eq!(solver.name(), "HiGHS");
    }

    #[cfg(feature = "gurobi-solver")]
    #[test]
    fn test_create_gurobi_solver() {
        let solver = create_solver(SolverType::Gurobi, SolverSettings::default());
        assert_eq!(solver.name(), "Gurobi");
    }
}
