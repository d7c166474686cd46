//! Energy, variance and the variance-reduced energy gradient.
//!
//! The gradient does not differentiate the sample mean of local energies.
//! Since H is Hermitian,
//!
//!   ∂E/∂θ = 2 E[(E_L - E) ∂ log|psi| / ∂θ],
//!
//! and the term coming from the derivative of E_L itself has zero
//! expectation. Local energies therefore enter the gradient as plain
//! numbers, which the [`LocalEnergy`] trait enforces by only accepting
//! primal floats.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::distribute::{CrossWorkerReduce, SingleWorker};
use super::traits::{configurations, LocalEnergy, LogPsi};
use crate::autodiff::{Dual, Float};
use crate::error::{ensure_len, Result, VmcError};

/// Forward value of the estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyResult<F: Float> {
    /// Mean local energy over the ensemble (and over workers).
    pub energy: F,
    /// Bessel-corrected variance of the local energy.
    pub variance: F,
    /// Local energy of each chain on this worker.
    pub local_energies: DVector<F>,
}

/// Combines a log-amplitude and a local-energy function into energy, variance
/// and gradient with respect to the wavefunction parameters.
///
/// `n_chains` is the number of chains over all workers; it sets the Bessel
/// correction, which is applied after the cross-worker average.
#[derive(Clone, Debug)]
pub struct EnergyEstimator<M, E, R = SingleWorker> {
    log_psi: M,
    local_energy: E,
    n_chains: usize,
    reduce: R,
}

impl<M, E> EnergyEstimator<M, E> {
    pub fn new(log_psi: M, local_energy: E, n_chains: usize) -> Result<Self> {
        if n_chains <= 1 {
            return Err(VmcError::invalid(format!(
                "variance needs at least two chains, got {}",
                n_chains
            )));
        }
        Ok(Self {
            log_psi,
            local_energy,
            n_chains,
            reduce: SingleWorker,
        })
    }
}

impl<M, E, R> EnergyEstimator<M, E, R> {
    /// Replaces the cross-worker reduction.
    pub fn with_reduction<R2>(self, reduce: R2) -> EnergyEstimator<M, E, R2> {
        EnergyEstimator {
            log_psi: self.log_psi,
            local_energy: self.local_energy,
            n_chains: self.n_chains,
            reduce,
        }
    }

    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    pub fn log_psi(&self) -> &M {
        &self.log_psi
    }

    pub fn local_energy(&self) -> &E {
        &self.local_energy
    }
}

impl<M: LogPsi, E, R> EnergyEstimator<M, E, R> {
    /// Energy and variance at `(params, positions)`.
    pub fn evaluate_forward<F>(&self, params: &DVector<F>, positions: &DMatrix<F>) -> Result<EnergyResult<F>>
    where
        F: Float,
        E: LocalEnergy<F>,
        R: CrossWorkerReduce<F>,
    {
        let local_energies = self.local_energy.local_energies(params.as_slice(), positions)?;
        ensure_len("local energies", positions.nrows(), local_energies.len())?;
        if local_energies.is_empty() {
            return Err(VmcError::invalid("no chains to average over"));
        }

        let count = F::lit(local_energies.len() as f64);
        // Accumulate offsets from the first sample so identical energies give
        // an exact mean and exactly zero deviations.
        let shift = local_energies[0];
        let offset = local_energies.iter().fold(F::zero(), |acc, &e| acc + (e - shift));
        let energy = self.reduce.mean(shift + offset / count);

        let squared = local_energies
            .iter()
            .fold(F::zero(), |acc, &e| acc + (e - energy) * (e - energy));
        let n = self.n_chains as f64;
        let variance = self.reduce.mean(squared / count) * F::lit(n / (n - 1.0));

        debug!(energy = %energy, variance = %variance, chains = local_energies.len(), "evaluated energy");
        Ok(EnergyResult {
            energy,
            variance,
            local_energies,
        })
    }

    /// Forward value and the directional derivative of the energy along
    /// `(params_tangent, positions_tangent)`.
    ///
    /// The derivative is `2 · Σ_c t_c (E_L[c] - energy)`, where `t_c` is the
    /// forward-mode derivative of log|psi| at chain `c` along the tangents.
    /// The variance and local energies carry no tangent.
    pub fn evaluate_gradient_given_tangents<F>(
        &self,
        params: &DVector<F>,
        positions: &DMatrix<F>,
        params_tangent: &DVector<F>,
        positions_tangent: &DMatrix<F>,
    ) -> Result<(EnergyResult<F>, F)>
    where
        F: Float,
        E: LocalEnergy<F>,
        R: CrossWorkerReduce<F>,
    {
        ensure_len("params tangent", params.len(), params_tangent.len())?;
        ensure_len("positions tangent chains", positions.nrows(), positions_tangent.nrows())?;
        ensure_len("positions tangent configuration", positions.ncols(), positions_tangent.ncols())?;

        let result = self.evaluate_forward(params, positions)?;

        let params = Dual::seed(params.as_slice(), params_tangent.as_slice());
        let mut tangent = F::zero();
        for (c, x) in configurations(positions).iter().enumerate() {
            let x_tangent: Vec<F> = positions_tangent.row(c).iter().copied().collect();
            let psi_tangent = self.log_psi.log_psi(&params, &Dual::seed(x, &x_tangent))?.eps;
            tangent += psi_tangent * (result.local_energies[c] - result.energy);
        }
        Ok((result, F::lit(2.0) * tangent))
    }

    /// Forward value and the gradient of the energy with respect to every
    /// parameter, with positions held fixed.
    pub fn value_and_grad<F>(&self, params: &DVector<F>, positions: &DMatrix<F>) -> Result<(EnergyResult<F>, DVector<F>)>
    where
        F: Float,
        E: LocalEnergy<F>,
        R: CrossWorkerReduce<F>,
    {
        let result = self.evaluate_forward(params, positions)?;

        let n_params = params.len();
        let seeded: Vec<Vec<Dual<F>>> = (0..n_params)
            .map(|j| Dual::seed_basis(params.as_slice(), j))
            .collect();

        let mut grad = DVector::from_element(n_params, F::zero());
        for (c, x) in configurations(positions).iter().enumerate() {
            let deviation = result.local_energies[c] - result.energy;
            let x: Vec<Dual<F>> = x.iter().map(|&v| Dual::constant(v)).collect();
            for (j, p) in seeded.iter().enumerate() {
                grad[j] += self.log_psi.log_psi(p, &x)?.eps * deviation;
            }
        }
        let two = F::lit(2.0);
        Ok((result, grad.map(|g| two * g)))
    }
}
