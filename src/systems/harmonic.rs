//! Gaussian trial state of the isotropic harmonic oscillator.

use crate::autodiff::Real;
use crate::error::{ensure_len, Result};
use crate::physics::{GradLogPsi, Hamiltonian, HarmonicPotential, LogPsi};

/// `psi(x) = exp(-α |x|²)` over `dimensions` coordinates, with `params = [α]`.
///
/// For `α = ω/2` this is the exact ground state of the trap with energy
/// `dimensions · ω / 2`.
#[derive(Clone, Copy, Debug)]
pub struct GaussianTrial {
    pub dimensions: usize,
}

impl GaussianTrial {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Hamiltonian of the trap with frequency `omega`.
    pub fn hamiltonian(self, omega: f64) -> Hamiltonian<Self, HarmonicPotential> {
        Hamiltonian::new(self, HarmonicPotential::new(omega))
    }

    /// Exact variational energy `d (α/2 + ω²/(8α))`.
    pub fn exact_energy(&self, alpha: f64, omega: f64) -> f64 {
        self.dimensions as f64 * (alpha / 2.0 + omega * omega / (8.0 * alpha))
    }

    fn check<S>(&self, params: &[S], x: &[S]) -> Result<()> {
        ensure_len("trial parameters", 1, params.len())?;
        ensure_len("configuration", self.dimensions, x.len())
    }
}

impl LogPsi for GaussianTrial {
    fn log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<S> {
        self.check(params, x)?;
        let r2 = x.iter().fold(S::zero(), |acc, &v| acc + v * v);
        Ok(-(params[0] * r2))
    }
}

impl GradLogPsi for GaussianTrial {
    fn grad_log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<Vec<S>> {
        self.check(params, x)?;
        let scale = S::lit(-2.0) * params[0];
        Ok(x.iter().map(|&v| scale * v).collect())
    }
}
