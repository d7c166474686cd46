//! Sampling module - the VMC optimization loop.

mod vmc;

pub use vmc::{OptimizationResult, VmcOptimizer};
