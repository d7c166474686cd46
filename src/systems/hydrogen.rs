//! Slater-type trial state for hydrogen-like atoms.

use crate::autodiff::Real;
use crate::error::{ensure_len, Result, VmcError};
use crate::physics::{CoulombPotential, GradLogPsi, Hamiltonian, LogPsi};

/// Product of 1s orbitals `exp(-α |r_i - R|)` centered at `center`, with
/// `params = [α]`.
///
/// A configuration holds one `(x, y, z)` triple per electron.
#[derive(Clone, Debug)]
pub struct SlaterTrial {
    pub center: [f64; 3],
}

impl Default for SlaterTrial {
    fn default() -> Self {
        Self { center: [0.0; 3] }
    }
}

impl SlaterTrial {
    pub fn new(center: [f64; 3]) -> Self {
        Self { center }
    }

    /// Hamiltonian of electrons around a nucleus of charge `charge` at `center`.
    pub fn hamiltonian(self, charge: f64) -> Hamiltonian<Self, CoulombPotential> {
        let nucleus = CoulombPotential::nucleus(self.center, charge);
        Hamiltonian::new(self, nucleus)
    }

    fn check<S>(&self, params: &[S], x: &[S]) -> Result<()> {
        ensure_len("trial parameters", 1, params.len())?;
        if x.len() % 3 != 0 {
            return Err(VmcError::shape(
                "electron coordinates",
                x.len().next_multiple_of(3),
                x.len(),
            ));
        }
        Ok(())
    }

    fn offsets<S: Real>(&self, x: &[S]) -> Vec<[S; 3]> {
        x.chunks_exact(3)
            .map(|r| [0, 1, 2].map(|k| r[k] - S::lit(self.center[k])))
            .collect()
    }
}

fn norm<S: Real>(d: &[S; 3]) -> S {
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

impl LogPsi for SlaterTrial {
    fn log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<S> {
        self.check(params, x)?;
        let total = self.offsets(x).iter().fold(S::zero(), |acc, d| acc + norm(d));
        Ok(-(params[0] * total))
    }
}

impl GradLogPsi for SlaterTrial {
    fn grad_log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<Vec<S>> {
        self.check(params, x)?;
        let mut grad = Vec::with_capacity(x.len());
        for d in self.offsets(x) {
            let r = norm(&d);
            // The cusp at the nucleus has no gradient; take zero there.
            if r == S::zero() {
                grad.extend([S::zero(); 3]);
            } else {
                let scale = -params[0] / r;
                grad.extend(d.map(|v| scale * v));
            }
        }
        Ok(grad)
    }
}
