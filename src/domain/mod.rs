pub mod formulation;
pub mod generator;
pub mod log_sink;
pub mod solve;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
pub mod validate;
