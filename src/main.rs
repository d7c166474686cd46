use clap::Parser;
use nalgebra::DVector;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_vmc::{read_config, GaussianTrial, OptimizationResult, Result, SlaterTrial, SystemConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Log every optimizer update
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(String, OptimizationResult)> {
    let config = read_config(&args.config)?;
    let optimizer = config.optimizer()?.with_verbose(args.verbose);
    info!(config = %args.config, seed = config.seed, "loaded configuration");

    match config.system {
        SystemConfig::Harmonic {
            dimensions,
            omega,
            initial_alpha,
        } => {
            let trial = GaussianTrial::new(dimensions);
            let hamiltonian = trial.hamiltonian(omega);
            let result = optimizer.optimize(
                &trial,
                &hamiltonian,
                DVector::from_element(1, initial_alpha),
                vec![dimensions],
            )?;
            Ok((format!("{}D harmonic oscillator (omega = {})", dimensions, omega), result))
        }
        SystemConfig::Hydrogen { initial_alpha } => {
            let trial = SlaterTrial::default();
            let hamiltonian = trial.clone().hamiltonian(1.0);
            let result = optimizer.optimize(&trial, &hamiltonian, DVector::from_element(1, initial_alpha), vec![1, 3])?;
            Ok(("Hydrogen atom".to_string(), result))
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(&args) {
        Ok((system, result)) => {
            println!("VMC Optimization Results for {}", system);
            println!("----------------------------------------");
            println!("Updates: {}", result.energy_history.len());
            println!("Final parameters: {:?}", result.final_params.as_slice());
            println!(
                "Final energy: {:.6} ± {:.6} Ha",
                result.final_energy.mean, result.final_energy.error
            );
            println!("Variance: {:.6} Ha²", result.final_variance);
            println!("Autocorrelation time: {:.2} steps", result.final_energy.autocorrelation_time);
            println!("Final step size: {:.4}", result.final_std_move);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
