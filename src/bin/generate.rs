use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rust_cflp::domain::generator::{generate, GeneratorParams};

/// Print a random capacitated facility location instance to stdout.
#[derive(Parser, Debug)]
#[command(name = "cflp-generate", version)]
struct Args {
    /// Seed for a reproducible instance
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 3)]
    min_facilities: usize,

    #[arg(long, default_value_t = 7)]
    max_facilities: usize,

    #[arg(long, default_value_t = 3)]
    min_customers: usize,

    #[arg(long, default_value_t = 7)]
    max_customers: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let params = GeneratorParams {
        facilities: args.min_facilities..=args.max_facilities.max(args.min_facilities),
        customers: args.min_customers..=args.max_customers.max(args.min_customers),
        ..GeneratorParams::default()
    };
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    log::debug!("Generating with {:?}", params);

    print!("{}", generate(&mut rng, &params).to_text());
}
