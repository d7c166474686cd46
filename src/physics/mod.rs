//! Physics module - local energies, the Laplacian evaluator and the
//! energy/gradient estimator.

mod distribute;
mod energy;
mod kinetic;
mod potential;
mod traits;

pub use distribute::{CrossWorkerReduce, SingleWorker};
pub use energy::{EnergyEstimator, EnergyResult};
pub use kinetic::{laplacian_psi_over_psi, ForwardGradient};
pub use potential::{CoulombPotential, Hamiltonian, HarmonicPotential};
pub use traits::{GradLogPsi, LocalEnergy, LogPsi, Potential};

