use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::solver::DEFAULT_TIME_LIMIT;

/// Runtime configuration read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub time_limit: Duration,
    pub log_dir: PathBuf,
    pub solver_logs: bool,
    pub default_solver: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            time_limit: DEFAULT_TIME_LIMIT,
            log_dir: PathBuf::from("logs"),
            solver_logs: true,
            default_solver: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let time_limit = env::var("CFLP_TIME_LIMIT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.time_limit);

        let log_dir = env::var("CFLP_LOG_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let solver_logs = env::var("CFLP_SOLVER_LOGS")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.solver_logs);

        let default_solver = env::var("CFLP_SOLVER").ok().filter(|s| !s.is_empty());

        Config {
            time_limit,
            log_dir,
            solver_logs,
            default_solver,
        }
    }
}
