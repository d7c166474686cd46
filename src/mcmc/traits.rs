//! Strategy traits composed by [`MetropolisStep`](super::MetropolisStep).
//!
//! New sampling schemes are added by implementing these, not by touching
//! the engine. `P` is the caller's parameter container and is only passed
//! through; `D` is the walker data threaded between steps.

use nalgebra::DVector;

use crate::autodiff::Float;
use crate::error::Result;
use crate::random::RandomKey;

/// Produces a candidate walker state from the current one.
pub trait ProposalKernel<P: ?Sized, D> {
    /// Returns the proposal together with the key to thread forward.
    fn propose(&self, params: &P, data: &D, key: RandomKey) -> Result<(D, RandomKey)>;
}

/// Per-chain probability of accepting a proposal.
///
/// Together with the proposal, implementations must satisfy detailed
/// balance for the target distribution; the engine does not check it and
/// does not clip the returned values.
pub trait AcceptanceRule<F: Float, P: ?Sized, D> {
    fn acceptance_probability(&self, params: &P, data: &D, proposed: &D) -> Result<DVector<F>>;
}

/// Merges proposed and current walker states under a per-chain mask.
pub trait WalkerUpdateRule<D> {
    fn update(&self, data: &D, proposed: D, mask: &[bool]) -> Result<D>;
}
