//! Potentials and the Hamiltonian local energy.

use super::kinetic::laplacian_psi_over_psi;
use super::traits::{GradLogPsi, LocalEnergy, Potential};
use crate::autodiff::Float;
use crate::error::{ensure_len, Result, VmcError};

/// Isotropic harmonic trap `V(x) = ω² |x|² / 2` in any number of dimensions.
#[derive(Clone, Copy, Debug)]
pub struct HarmonicPotential {
    pub omega: f64,
}

impl HarmonicPotential {
    pub fn new(omega: f64) -> Self {
        Self { omega }
    }
}

impl<F: Float> Potential<F> for HarmonicPotential {
    fn potential(&self, x: &[F]) -> Result<F> {
        let omega = F::lit(self.omega);
        let r2 = x.iter().fold(F::zero(), |acc, &v| acc + v * v);
        Ok(F::lit(0.5) * omega * omega * r2)
    }
}

/// Coulomb interaction of electrons with fixed point charges, in atomic units.
///
/// A configuration holds the electron coordinates as consecutive `(x, y, z)`
/// triples. The constant ion-ion repulsion is included.
#[derive(Clone, Debug)]
pub struct CoulombPotential {
    ions: Vec<[f64; 3]>,
    charges: Vec<f64>,
}

impl CoulombPotential {
    pub fn new(ions: Vec<[f64; 3]>, charges: Vec<f64>) -> Result<Self> {
        ensure_len("ion charges", ions.len(), charges.len())?;
        Ok(Self { ions, charges })
    }

    /// A single nucleus of charge `charge` at `center`.
    pub fn nucleus(center: [f64; 3], charge: f64) -> Self {
        Self {
            ions: vec![center],
            charges: vec![charge],
        }
    }

    fn ion_ion(&self) -> f64 {
        let mut energy = 0.0;
        for i in 0..self.ions.len() {
            for j in (i + 1)..self.ions.len() {
                let r = distance(&self.ions[i], &self.ions[j]);
                energy += self.charges[i] * self.charges[j] / r;
            }
        }
        energy
    }
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q).powi(2)).sum::<f64>().sqrt()
}

fn electron_distance<F: Float>(a: &[F], b: &[F]) -> F {
    a.iter().zip(b).fold(F::zero(), |acc, (&p, &q)| acc + (p - q) * (p - q)).sqrt()
}

impl<F: Float> Potential<F> for CoulombPotential {
    fn potential(&self, x: &[F]) -> Result<F> {
        if x.len() % 3 != 0 {
            return Err(VmcError::shape(
                "electron coordinates",
                x.len().next_multiple_of(3),
                x.len(),
            ));
        }
        let electrons: Vec<&[F]> = x.chunks_exact(3).collect();

        let mut energy = F::lit(self.ion_ion());
        for (ion, &charge) in self.ions.iter().zip(&self.charges) {
            let ion = ion.map(F::lit);
            for e in &electrons {
                energy -= F::lit(charge) / electron_distance(e, &ion);
            }
        }
        for i in 0..electrons.len() {
            for j in (i + 1)..electrons.len() {
                energy += F::one() / electron_distance(electrons[i], electrons[j]);
            }
        }
        Ok(energy)
    }
}

/// `H = -∇²/2 + V`, giving the local energy `-(∇²psi)/(2 psi) + V(x)`.
///
/// The kinetic part is evaluated through [`laplacian_psi_over_psi`] from
/// `grad_log_psi`.
#[derive(Clone, Debug)]
pub struct Hamiltonian<G, V> {
    pub grad_log_psi: G,
    pub potential: V,
}

impl<G, V> Hamiltonian<G, V> {
    pub fn new(grad_log_psi: G, potential: V) -> Self {
        Self { grad_log_psi, potential }
    }
}

impl<F: Float, G: GradLogPsi, V: Potential<F>> LocalEnergy<F> for Hamiltonian<G, V> {
    fn local_energy(&self, params: &[F], x: &[F]) -> Result<F> {
        let laplacian = laplacian_psi_over_psi(&self.grad_log_psi, params, x)?;
        Ok(F::lit(-0.5) * laplacian + self.potential.potential(x)?)
    }
}
