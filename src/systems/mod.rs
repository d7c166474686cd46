//! Systems module - trial wavefunctions with their Hamiltonians.

mod harmonic;
mod hydrogen;

pub use harmonic::GaussianTrial;
pub use hydrogen::SlaterTrial;
