//! Traits for wavefunctions, local energies and potentials.
//!
//! Wavefunction methods are generic over [`Real`] so the same code runs on
//! plain floats and on [`Dual`](crate::autodiff::Dual) numbers. A single
//! configuration is a flat slice; batches are `DMatrix` with one
//! configuration per row.

use nalgebra::{DMatrix, DVector};

use crate::autodiff::{Float, Real};
use crate::error::Result;

/// Flattened configurations of `positions`, one per row.
pub(crate) fn configurations<F: Float>(positions: &DMatrix<F>) -> Vec<Vec<F>> {
    (0..positions.nrows())
        .map(|r| positions.row(r).iter().copied().collect())
        .collect()
}

/// log|psi| of a parameterized wavefunction.
pub trait LogPsi {
    /// log|psi(x)| for one flattened configuration `x`.
    fn log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<S>;

    /// log|psi| for every row of `positions`.
    fn log_psi_apply<F: Float>(&self, params: &[F], positions: &DMatrix<F>) -> Result<DVector<F>> {
        let values = configurations(positions)
            .iter()
            .map(|x| self.log_psi(params, x))
            .collect::<Result<Vec<F>>>()?;
        Ok(DVector::from_vec(values))
    }
}

impl<M: LogPsi + ?Sized> LogPsi for &M {
    fn log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<S> {
        (**self).log_psi(params, x)
    }
}

/// Gradient of log|psi| with respect to the configuration.
///
/// The output has the same length as `x`.
pub trait GradLogPsi {
    fn grad_log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<Vec<S>>;
}

impl<G: GradLogPsi + ?Sized> GradLogPsi for &G {
    fn grad_log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<Vec<S>> {
        (**self).grad_log_psi(params, x)
    }
}

/// Local energy (H psi) / psi.
///
/// Takes primal floats only: local energies are never differentiated.
pub trait LocalEnergy<F: Float> {
    fn local_energy(&self, params: &[F], x: &[F]) -> Result<F>;

    /// Local energy of every row of `positions`.
    fn local_energies(&self, params: &[F], positions: &DMatrix<F>) -> Result<DVector<F>> {
        let values = configurations(positions)
            .iter()
            .map(|x| self.local_energy(params, x))
            .collect::<Result<Vec<F>>>()?;
        Ok(DVector::from_vec(values))
    }
}

impl<F: Float, E: LocalEnergy<F> + ?Sized> LocalEnergy<F> for &E {
    fn local_energy(&self, params: &[F], x: &[F]) -> Result<F> {
        (**self).local_energy(params, x)
    }
}

/// Potential energy of a configuration.
pub trait Potential<F: Float> {
    fn potential(&self, x: &[F]) -> Result<F>;
}
