//! Generic Metropolis-Hastings transition.
//!
//! A transition from one walker state to the next is split into a proposal
//! and an acceptance decision. For the chain to preserve a stationary
//! distribution P, the supplied strategies must satisfy detailed balance:
//!
//!   q(i→j) · A(i→j) · P_i = q(j→i) · A(j→i) · P_j
//!
//! Every step is pure: the current state is borrowed, a new state is
//! returned, and the random key is threaded explicitly.

use nalgebra::DVector;
use tracing::{debug, trace};

use super::traits::{AcceptanceRule, ProposalKernel, WalkerUpdateRule};
use crate::autodiff::Float;
use crate::error::{Result, VmcError};
use crate::random::RandomKey;

/// One Metropolis transition built from injected strategies.
#[derive(Clone, Debug)]
pub struct MetropolisStep<Pr, Ac, Up> {
    proposal: Pr,
    acceptance: Ac,
    update: Up,
}

impl<Pr, Ac, Up> MetropolisStep<Pr, Ac, Up> {
    pub fn new(proposal: Pr, acceptance: Ac, update: Up) -> Self {
        Self {
            proposal,
            acceptance,
            update,
        }
    }

    pub fn proposal(&self) -> &Pr {
        &self.proposal
    }

    pub fn acceptance(&self) -> &Ac {
        &self.acceptance
    }

    /// Takes a single Metropolis step.
    ///
    /// Returns `(mean acceptance probability, new data, key)`. The reported
    /// mean is taken over the same probabilities used to build the mask.
    pub fn step<F, P, D>(&self, params: &P, data: &D, key: RandomKey) -> Result<(F, D, RandomKey)>
    where
        F: Float,
        P: ?Sized,
        Pr: ProposalKernel<P, D>,
        Ac: AcceptanceRule<F, P, D>,
        Up: WalkerUpdateRule<D>,
    {
        let (key, subkey) = key.split();
        let (proposed, key) = self.proposal.propose(params, data, key)?;
        let accept_prob = self.acceptance.acceptance_probability(params, data, &proposed)?;

        let n_chains = accept_prob.len();
        if n_chains == 0 {
            return Err(VmcError::invalid("metropolis step needs at least one chain"));
        }

        let uniform: DVector<F> = subkey.uniform(n_chains);
        let mask: Vec<bool> = uniform
            .iter()
            .zip(accept_prob.iter())
            .map(|(u, p)| u < p)
            .collect();
        let new_data = self.update.update(data, proposed, &mask)?;

        let mean_acceptance = accept_prob.iter().fold(F::zero(), |acc, &p| acc + p)
            / F::lit(n_chains as f64);
        trace!(mean_acceptance = %mean_acceptance, n_chains, "metropolis step");

        Ok((mean_acceptance, new_data, key))
    }

    /// Runs `n_steps` consecutive steps.
    ///
    /// Returns the average of the per-step mean acceptance probabilities
    /// (zero when `n_steps == 0`), the final data and the key to thread on.
    pub fn walk<F, P, D>(
        &self,
        params: &P,
        data: D,
        key: RandomKey,
        n_steps: usize,
    ) -> Result<(F, D, RandomKey)>
    where
        F: Float,
        P: ?Sized,
        Pr: ProposalKernel<P, D>,
        Ac: AcceptanceRule<F, P, D>,
        Up: WalkerUpdateRule<D>,
    {
        let mut data = data;
        let mut key = key;
        let mut accept_sum = F::zero();

        for _ in 0..n_steps {
            let (accept, new_data, new_key) = self.step(params, &data, key)?;
            accept_sum += accept;
            data = new_data;
            key = new_key;
        }

        let mean_acceptance = if n_steps == 0 {
            F::zero()
        } else {
            accept_sum / F::lit(n_steps as f64)
        };
        debug!(n_steps, mean_acceptance = %mean_acceptance, "walk finished");

        Ok((mean_acceptance, data, key))
    }

    /// Runs `n_steps` steps and discards the acceptance statistics.
    pub fn burn_in<F, P, D>(
        &self,
        params: &P,
        data: D,
        key: RandomKey,
        n_steps: usize,
    ) -> Result<(D, RandomKey)>
    where
        F: Float,
        P: ?Sized,
        Pr: ProposalKernel<P, D>,
        Ac: AcceptanceRule<F, P, D>,
        Up: WalkerUpdateRule<D>,
    {
        let (_, data, key): (F, D, RandomKey) = self.walk(params, data, key, n_steps)?;
        Ok((data, key))
    }
}
