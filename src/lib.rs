//! Rust VMC - variational Monte Carlo core in Rust
//!
//! This crate provides a generic Metropolis-Hastings engine with a Gaussian
//! position/amplitude specialization. Local energies use a forward-mode
//! Laplacian evaluator; the energy estimator drops the zero-mean term of the
//! gradient using the Hermiticity of the Hamiltonian.

pub mod autodiff;
pub mod error;
pub mod io;
pub mod mcmc;
pub mod physics;
pub mod random;
pub mod sampling;
pub mod systems;

// Re-export commonly used types at crate root
pub use autodiff::{Dual, Float, Real};
pub use error::{Result, VmcError};
pub use io::{read_config, RunConfig, SystemConfig};
pub use mcmc::{
    gaussian_metropolis_step, metropolis_symmetric_acceptance, AcceptanceRule, LogAbsAmplitude, MetropolisStep,
    ProposalKernel, RawAmplitude, StepSizeAdapter, WalkerState, WalkerUpdateRule,
};
pub use physics::{
    laplacian_psi_over_psi, CrossWorkerReduce, EnergyEstimator, EnergyResult, ForwardGradient, GradLogPsi,
    Hamiltonian, LocalEnergy, LogPsi, SingleWorker,
};
pub use random::RandomKey;
pub use sampling::{OptimizationResult, VmcOptimizer};
pub use systems::{GaussianTrial, SlaterTrial};
