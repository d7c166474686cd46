//! MCMC module - Metropolis-Hastings engine and its position/amplitude
//! specialization.

mod adapt;
mod metropolis;
mod position_amplitude;
mod state;
pub mod statistics;
mod traits;

pub use adapt::StepSizeAdapter;
pub use metropolis::MetropolisStep;
pub use position_amplitude::{
    gaussian_metropolis_step, gaussian_proposal, metropolis_symmetric_acceptance, GaussianMetropolisStep,
    GaussianProposal, MaskedUpdate, SymmetricMetropolisAcceptance,
};
pub use state::{AmplitudeModel, LogAbsAmplitude, RawAmplitude, WalkerState};
pub use statistics::{summarize, TraceSummary};
pub use traits::{AcceptanceRule, ProposalKernel, WalkerUpdateRule};
