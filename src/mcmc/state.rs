//! Walker ensemble holding positions and cached amplitudes.

use nalgebra::{DMatrix, DVector};

use crate::autodiff::Float;
use crate::error::{ensure_len, Result};
use crate::physics::LogPsi;

/// Batched wavefunction evaluation, one amplitude per chain (row).
pub trait AmplitudeModel<P: ?Sized, F: Float> {
    fn amplitudes(&self, params: &P, positions: &DMatrix<F>) -> Result<DVector<F>>;
}

impl<P: ?Sized, F: Float, M: AmplitudeModel<P, F> + ?Sized> AmplitudeModel<P, F> for &M {
    fn amplitudes(&self, params: &P, positions: &DMatrix<F>) -> Result<DVector<F>> {
        (**self).amplitudes(params, positions)
    }
}

/// Uses log|psi| of a [`LogPsi`] model as the walker amplitude.
#[derive(Clone, Debug)]
pub struct LogAbsAmplitude<M>(pub M);

impl<F: Float, M: LogPsi> AmplitudeModel<DVector<F>, F> for LogAbsAmplitude<M> {
    fn amplitudes(&self, params: &DVector<F>, positions: &DMatrix<F>) -> Result<DVector<F>> {
        self.0.log_psi_apply(params.as_slice(), positions)
    }
}

/// Uses |psi| = exp(log|psi|) of a [`LogPsi`] model as the walker amplitude.
#[derive(Clone, Debug)]
pub struct RawAmplitude<M>(pub M);

impl<F: Float, M: LogPsi> AmplitudeModel<DVector<F>, F> for RawAmplitude<M> {
    fn amplitudes(&self, params: &DVector<F>, positions: &DMatrix<F>) -> Result<DVector<F>> {
        Ok(self.0.log_psi_apply(params.as_slice(), positions)?.map(|v| v.exp()))
    }
}

/// Positions and amplitudes of an ensemble of chains.
///
/// `position` has one row per chain; each row is a configuration of shape
/// `config_shape` flattened in row-major order. `amplitude[c]` caches the
/// model evaluated at row `c` and is never recomputed on read.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkerState<F: Float> {
    position: DMatrix<F>,
    amplitude: DVector<F>,
    config_shape: Vec<usize>,
}

impl<F: Float> WalkerState<F> {
    pub fn new(position: DMatrix<F>, amplitude: DVector<F>, config_shape: Vec<usize>) -> Result<Self> {
        ensure_len("walker amplitude", position.nrows(), amplitude.len())?;
        ensure_len("configuration shape", config_shape.iter().product(), position.ncols())?;
        Ok(Self {
            position,
            amplitude,
            config_shape,
        })
    }

    /// Builds a state whose amplitudes are evaluated from `model`.
    pub fn from_model<P: ?Sized, M: AmplitudeModel<P, F>>(
        model: &M,
        params: &P,
        position: DMatrix<F>,
        config_shape: Vec<usize>,
    ) -> Result<Self> {
        let amplitude = model.amplitudes(params, &position)?;
        Self::new(position, amplitude, config_shape)
    }

    /// Same positions with amplitudes recomputed, e.g. after a parameter update.
    pub fn refresh_amplitude<P: ?Sized, M: AmplitudeModel<P, F>>(&self, model: &M, params: &P) -> Result<Self> {
        Self::from_model(model, params, self.position.clone(), self.config_shape.clone())
    }

    pub fn position(&self) -> &DMatrix<F> {
        &self.position
    }

    pub fn amplitude(&self) -> &DVector<F> {
        &self.amplitude
    }

    pub fn config_shape(&self) -> &[usize] {
        &self.config_shape
    }

    pub fn n_chains(&self) -> usize {
        self.position.nrows()
    }

    /// Scalar degrees of freedom per configuration.
    pub fn n_dof(&self) -> usize {
        self.position.ncols()
    }

    /// Flattened configuration of chain `chain`.
    pub fn configuration(&self, chain: usize) -> Vec<F> {
        self.position.row(chain).iter().copied().collect()
    }

    pub fn into_parts(self) -> (DMatrix<F>, DVector<F>, Vec<usize>) {
        (self.position, self.amplitude, self.config_shape)
    }
}
