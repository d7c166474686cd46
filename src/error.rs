//! Error types shared by the sampler and the energy estimator.

use thiserror::Error;

/// Failures surfaced to callers of the VMC core.
///
/// Numerical edge cases inside the acceptance rule are clamped rather than
/// reported; only inconsistent inputs and invalid settings end up here.
#[derive(Debug, Error)]
pub enum VmcError {
    /// Array shapes disagree with what an operation or injected function expects.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A setting makes the requested computation undefined.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl VmcError {
    pub(crate) fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        VmcError::ShapeMismatch { what, expected, found }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        VmcError::InvalidConfiguration(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VmcError>;

/// Fails with [`VmcError::ShapeMismatch`] unless `found == expected`.
pub(crate) fn ensure_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(VmcError::shape(what, expected, found))
    }
}
