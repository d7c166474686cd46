//! YAML run configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VmcError};
use crate::mcmc::StepSizeAdapter;
use crate::sampling::VmcOptimizer;

/// Trial system to optimize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SystemConfig {
    /// Gaussian trial state in an isotropic harmonic trap.
    Harmonic {
        dimensions: usize,
        omega: f64,
        initial_alpha: f64,
    },
    /// Slater 1s trial state of the hydrogen atom.
    Hydrogen { initial_alpha: f64 },
}

fn default_log_amplitude() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    pub n_chains: usize,
    pub std_move: f64,
    #[serde(default = "default_log_amplitude")]
    pub log_amplitude: bool,
    pub n_burn_in: usize,
    pub n_steps_per_update: usize,
    pub target_acceptance: f64,
    pub min_step_size: f64,
    pub max_step_size: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub n_updates: usize,
    pub learning_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub seed: u64,
    pub system: SystemConfig,
    pub sampler: SamplerConfig,
    pub optimizer: OptimizerConfig,
}

impl RunConfig {
    /// Rejects settings under which sampling or the variance is undefined.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.n_chains <= 1 {
            return Err(VmcError::invalid(format!(
                "sampler.n_chains must be at least 2, got {}",
                self.sampler.n_chains
            )));
        }
        if !(self.sampler.std_move > 0.0) {
            return Err(VmcError::invalid(format!(
                "sampler.std_move must be positive, got {}",
                self.sampler.std_move
            )));
        }
        if let SystemConfig::Harmonic { dimensions: 0, .. } = self.system {
            return Err(VmcError::invalid("system.dimensions must be positive"));
        }
        self.step_size_adapter().map(|_| ())
    }

    pub fn step_size_adapter(&self) -> Result<StepSizeAdapter> {
        StepSizeAdapter::new(
            self.sampler.target_acceptance,
            self.sampler.min_step_size,
            self.sampler.max_step_size,
        )
    }

    /// Optimizer configured from the sampler and optimizer sections.
    pub fn optimizer(&self) -> Result<VmcOptimizer> {
        self.validate()?;
        Ok(VmcOptimizer::new()
            .with_seed(self.seed)
            .with_n_chains(self.sampler.n_chains)
            .with_std_move(self.sampler.std_move)
            .with_log_amplitude(self.sampler.log_amplitude)
            .with_n_burn_in(self.sampler.n_burn_in)
            .with_n_steps_per_update(self.sampler.n_steps_per_update)
            .with_step_size_adapter(self.step_size_adapter()?)
            .with_n_updates(self.optimizer.n_updates)
            .with_learning_rate(self.optimizer.learning_rate))
    }
}

/// Reads and validates a [`RunConfig`] from a YAML file.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: RunConfig = serde_yaml::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

// example of yaml file
// seed: 42
// system:
//   kind: hydrogen
//   initial_alpha: 0.8
// sampler:
//   n_chains: 200
//   std_move: 0.5
//   n_burn_in: 200
//   n_steps_per_update: 20
//   target_acceptance: 0.5
//   min_step_size: 0.05
//   max_step_size: 2.0
// optimizer:
//   n_updates: 50
//   learning_rate: 0.2
