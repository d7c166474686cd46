//! Averaging of per-worker scalars across replicated ensembles.

use crate::autodiff::Float;

/// Mean of a scalar over all workers holding a replica of the ensemble.
///
/// Must be commutative and associative, and the identity when only one
/// worker participates.
pub trait CrossWorkerReduce<F: Float> {
    fn mean(&self, value: F) -> F;
}

/// The only worker: reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleWorker;

impl<F: Float> CrossWorkerReduce<F> for SingleWorker {
    fn mean(&self, value: F) -> F {
        value
    }
}

impl<F: Float, R: CrossWorkerReduce<F> + ?Sized> CrossWorkerReduce<F> for &R {
    fn mean(&self, value: F) -> F {
        (**self).mean(value)
    }
}
