use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use rust_cflp::config::Config;
use rust_cflp::domain::solve::solve_with;
use rust_cflp::domain::solver_factory::create_solver;
use rust_cflp::{
    build, CapacityLinking, CflpError, Formulation, Instance, LogSink, SolutionReport, SolverSettings,
    SolverType, VariableDomain,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ObjectiveArg {
    Profit,
    Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AssignmentArg {
    Binary,
    Integer,
    Continuous,
}

impl From<AssignmentArg> for VariableDomain {
    fn from(a: AssignmentArg) -> Self {
        match a {
            AssignmentArg::Binary => VariableDomain::Binary,
            AssignmentArg::Integer => VariableDomain::Integer,
            AssignmentArg::Continuous => VariableDomain::Continuous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Solve capacitated facility location instances.
#[derive(Parser, Debug)]
#[command(name = "cflp", version)]
struct Cli {
    /// Instance file, or a directory of instance files
    instance: PathBuf,

    /// GLPK, HIGHS or GUROBI; unknown names fall back to GLPK
    solver: Option<String>,

    /// `true` for aggregate capacity linking, `false` for disaggregated
    #[arg(action = clap::ArgAction::Set)]
    relaxed: Option<bool>,

    #[arg(long, value_enum, default_value_t = ObjectiveArg::Cost)]
    objective: ObjectiveArg,

    /// Domain of the assignment variables, binary by default (cost objective only)
    #[arg(long, value_enum)]
    assignment: Option<AssignmentArg>,

    /// Solver time limit in seconds, overrides CFLP_TIME_LIMIT
    #[arg(long)]
    time_limit: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Cli {
    fn formulation(&self) -> Result<Formulation, clap::Error> {
        let linking = if self.relaxed.unwrap_or(true) {
            CapacityLinking::Aggregate
        } else {
            CapacityLinking::Disaggregated
        };
        let assignment = self.assignment.unwrap_or(AssignmentArg::Binary);
        match self.objective {
            ObjectiveArg::Profit if assignment != AssignmentArg::Binary => Err(clap::Error::raw(
                ErrorKind::ArgumentConflict,
                "the profit objective only supports `--assignment binary`\n",
            )),
            ObjectiveArg::Profit => Ok(Formulation::maximize_profit(linking)),
            ObjectiveArg::Cost => {
                Ok(Formulation::minimize_cost(linking).with_assignment(assignment.into()))
            }
        }
    }
}

fn instance_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn run_instance(
    path: &Path,
    formulation: Formulation,
    format: Format,
    config: &Config,
    solver_type: SolverType,
    time_limit: Duration,
) -> Result<(), CflpError> {
    let instance = Instance::from_file(path)?;
    info!(
        "{}: {} facilities, {} customers",
        path.display(),
        instance.facilities.len(),
        instance.customers.len()
    );

    let model = build(&instance, formulation)?;

    let log_sink = if config.solver_logs {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());
        LogSink::file(
            config
                .log_dir
                .join(format!("{}.{}.log", stem, solver_type.identifier())),
        )
    } else {
        LogSink::Discard
    };

    let solver = create_solver(solver_type, SolverSettings::new(time_limit, log_sink));
    let outcome = solve_with(solver.as_ref(), &model.model)?;
    let report = SolutionReport::new(&model, &outcome);

    match format {
        Format::Text => println!("{}", report),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let formulation = cli.formulation().unwrap_or_else(|e| e.exit());
    let config = Config::from_env();
    let time_limit = cli
        .time_limit
        .map(Duration::from_secs)
        .unwrap_or(config.time_limit);
    let solver_type = SolverType::resolve(cli.solver.as_deref().or(config.default_solver.as_deref()));

    let files = match instance_files(&cli.instance) {
        Ok(files) => files,
        Err(e) => {
            error!("Cannot read {}: {}", cli.instance.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    for path in &files {
        if let Err(e) = run_instance(path, formulation, cli.format, &config, solver_type, time_limit) {
            error!("{}: {}", path.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        error!("{} of {} instances failed", failed, files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
