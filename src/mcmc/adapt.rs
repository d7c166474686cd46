//! Proposal width adaptation toward a target acceptance rate.

use tracing::warn;

use crate::autodiff::Float;
use crate::error::{Result, VmcError};

/// Rescales the Gaussian proposal width by `sqrt(acceptance / target)`,
/// clamped to `[min_step_size, max_step_size]`.
#[derive(Copy, Clone, Debug)]
pub struct StepSizeAdapter {
    pub target_acceptance: f64,
    pub min_step_size: f64,
    pub max_step_size: f64,
}

impl Default for StepSizeAdapter {
    fn default() -> Self {
        Self {
            target_acceptance: 0.5,
            min_step_size: 0.05,
            max_step_size: 2.0,
        }
    }
}

impl StepSizeAdapter {
    pub fn new(target_acceptance: f64, min_step_size: f64, max_step_size: f64) -> Result<Self> {
        if !(target_acceptance > 0.0 && target_acceptance <= 1.0) {
            return Err(VmcError::invalid(format!(
                "target acceptance must be in (0, 1], got {}",
                target_acceptance
            )));
        }
        if !(min_step_size > 0.0 && min_step_size <= max_step_size) {
            return Err(VmcError::invalid(format!(
                "step size bounds must satisfy 0 < min <= max, got [{}, {}]",
                min_step_size, max_step_size
            )));
        }
        Ok(Self {
            target_acceptance,
            min_step_size,
            max_step_size,
        })
    }

    /// New proposal width given the mean acceptance observed with `step_size`.
    pub fn adjust<F: Float>(&self, step_size: F, mean_acceptance: F) -> F {
        let (step_size, mean_acceptance): (f64, f64) = (step_size.into(), mean_acceptance.into());
        let proposed = step_size * (mean_acceptance / self.target_acceptance).sqrt();
        let clamped = proposed.clamp(self.min_step_size, self.max_step_size);
        if clamped != proposed {
            warn!(proposed, clamped, "proposal width hit its bound");
        }
        F::lit(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_on_target_keeps_step() {
        let adapter = StepSizeAdapter::default();
        assert_relative_eq!(adapter.adjust(0.8f64, 0.5), 0.8);
    }

    #[test]
    fn test_low_acceptance_shrinks_step() {
        let adapter = StepSizeAdapter::default();
        assert_relative_eq!(adapter.adjust(1.0f64, 0.125), 0.5);
    }

    #[test]
    fn test_single_precision_step() {
        let adapter = StepSizeAdapter::default();
        assert_relative_eq!(adapter.adjust(0.5f32, 0.125), 0.25f32);
    }

    #[test]
    fn test_clamps_to_bounds() {
        let adapter = StepSizeAdapter::new(0.5, 0.1, 1.0).unwrap();
        assert_relative_eq!(adapter.adjust(0.9f64, 1.0), 1.0);
        assert_relative_eq!(adapter.adjust(0.2f64, 0.0), 0.1);
    }

    #[test]
    fn test_rejects_bad_bounds() {
        assert!(StepSizeAdapter::new(0.0, 0.1, 1.0).is_err());
        assert!(StepSizeAdapter::new(0.5, 1.0, 0.1).is_err());
        assert!(StepSizeAdapter::new(0.5, 0.0, 1.0).is_err());
    }
}
