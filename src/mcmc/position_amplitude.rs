//! Gaussian proposal, symmetric Metropolis acceptance and masked update on
//! [`WalkerState`].

use nalgebra::{DMatrix, DVector};

use super::metropolis::MetropolisStep;
use super::state::{AmplitudeModel, WalkerState};
use super::traits::{AcceptanceRule, ProposalKernel, WalkerUpdateRule};
use crate::autodiff::Float;
use crate::error::{ensure_len, Result};
use crate::random::RandomKey;

/// Moves every coordinate of every chain by `std_move · N(0, 1)` and
/// evaluates the model at the proposed positions.
///
/// The move is symmetric, so no Hastings correction is needed downstream.
#[derive(Clone, Debug)]
pub struct GaussianProposal<M, F> {
    model: M,
    std_move: F,
}

impl<M, F: Float> GaussianProposal<M, F> {
    pub fn new(model: M, std_move: F) -> Self {
        Self { model, std_move }
    }

    pub fn std_move(&self) -> F {
        self.std_move
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

/// Adds `std_move · N(0, 1)` to every entry of `positions`.
pub fn gaussian_proposal<F: Float>(positions: &DMatrix<F>, std_move: F, key: RandomKey) -> (DMatrix<F>, RandomKey) {
    let (key, subkey) = key.split();
    let noise: DMatrix<F> = subkey.normal(positions.nrows(), positions.ncols());
    let proposed = DMatrix::from_fn(positions.nrows(), positions.ncols(), |r, c| {
        positions[(r, c)] + std_move * noise[(r, c)]
    });
    (proposed, key)
}

impl<P, F, M> ProposalKernel<P, WalkerState<F>> for GaussianProposal<M, F>
where
    P: ?Sized,
    F: Float,
    M: AmplitudeModel<P, F>,
{
    fn propose(&self, params: &P, data: &WalkerState<F>, key: RandomKey) -> Result<(WalkerState<F>, RandomKey)> {
        let (position, key) = gaussian_proposal(data.position(), self.std_move, key);
        let proposed = WalkerState::from_model(&self.model, params, position, data.config_shape().to_vec())?;
        Ok((proposed, key))
    }
}

/// Metropolis acceptance `min(1, P_new / P_old)` for a symmetric proposal,
/// where `P = |psi|^2`.
///
/// With `log_amplitude` the inputs are log|psi|; otherwise they are psi.
/// Division by zero and overflow-prone exponents are resolved to 1, so the
/// result is finite and in `[0, 1]` for finite inputs.
pub fn metropolis_symmetric_acceptance<F: Float>(
    amplitude: &DVector<F>,
    proposed_amplitude: &DVector<F>,
    log_amplitude: bool,
) -> Result<DVector<F>> {
    ensure_len("proposed amplitude", amplitude.len(), proposed_amplitude.len())?;

    let ratios = amplitude
        .iter()
        .zip(proposed_amplitude.iter())
        .map(|(&old, &new)| {
            if log_amplitude {
                log_amplitude_ratio(old, new)
            } else {
                raw_amplitude_ratio(old, new)
            }
        });
    Ok(DVector::from_iterator(amplitude.len(), ratios))
}

fn log_amplitude_ratio<F: Float>(old: F, new: F) -> F {
    let log_ratio = F::lit(2.0) * (new - old);
    if log_ratio > F::zero() {
        F::one()
    } else {
        log_ratio.exp()
    }
}

// |new| < |old| is equivalent to new^2 < old^2 but cannot overflow.
fn raw_amplitude_ratio<F: Float>(old: F, new: F) -> F {
    let (old, new) = (old.abs(), new.abs());
    if old == F::zero() || new >= old {
        F::one()
    } else {
        let ratio = new / old;
        ratio * ratio
    }
}

/// [`metropolis_symmetric_acceptance`] as an [`AcceptanceRule`].
#[derive(Clone, Copy, Debug)]
pub struct SymmetricMetropolisAcceptance {
    pub log_amplitude: bool,
}

impl SymmetricMetropolisAcceptance {
    pub fn new(log_amplitude: bool) -> Self {
        Self { log_amplitude }
    }
}

impl Default for SymmetricMetropolisAcceptance {
    fn default() -> Self {
        Self { log_amplitude: true }
    }
}

impl<F: Float, P: ?Sized> AcceptanceRule<F, P, WalkerState<F>> for SymmetricMetropolisAcceptance {
    fn acceptance_probability(&self, _: &P, data: &WalkerState<F>, proposed: &WalkerState<F>) -> Result<DVector<F>> {
        metropolis_symmetric_acceptance(data.amplitude(), proposed.amplitude(), self.log_amplitude)
    }
}

/// Takes the proposed position and amplitude of chain `c` where `mask[c]`,
/// the current ones elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaskedUpdate;

impl<F: Float> WalkerUpdateRule<WalkerState<F>> for MaskedUpdate {
    fn update(&self, data: &WalkerState<F>, proposed: WalkerState<F>, mask: &[bool]) -> Result<WalkerState<F>> {
        let n_chains = data.n_chains();
        ensure_len("update mask", n_chains, mask.len())?;
        ensure_len("proposed chains", n_chains, proposed.n_chains())?;
        ensure_len("proposed configuration", data.n_dof(), proposed.n_dof())?;

        let (old_position, old_amplitude) = (data.position(), data.amplitude());
        let (new_position, new_amplitude, config_shape) = proposed.into_parts();

        let position = DMatrix::from_fn(n_chains, data.n_dof(), |r, c| {
            if mask[r] {
                new_position[(r, c)]
            } else {
                old_position[(r, c)]
            }
        });
        let amplitude = DVector::from_fn(n_chains, |r, _| {
            if mask[r] {
                new_amplitude[r]
            } else {
                old_amplitude[r]
            }
        });
        WalkerState::new(position, amplitude, config_shape)
    }
}

pub type GaussianMetropolisStep<M, F> =
    MetropolisStep<GaussianProposal<M, F>, SymmetricMetropolisAcceptance, MaskedUpdate>;

/// Gaussian proposal + symmetric Metropolis acceptance + masked update.
///
/// `log_amplitude` must match what `model` returns: log|psi| or psi.
pub fn gaussian_metropolis_step<M, F: Float>(std_move: F, model: M, log_amplitude: bool) -> GaussianMetropolisStep<M, F> {
    MetropolisStep::new(
        GaussianProposal::new(model, std_move),
        SymmetricMetropolisAcceptance::new(log_amplitude),
        MaskedUpdate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmcError;
    use approx::{assert_relative_eq, relative_eq};
    use proptest::prelude::*;

    struct HalfSquaredNorm;

    impl AmplitudeModel<(), f64> for HalfSquaredNorm {
        fn amplitudes(&self, _: &(), positions: &DMatrix<f64>) -> Result<DVector<f64>> {
            Ok(DVector::from_fn(positions.nrows(), |r, _| -0.5 * positions.row(r).norm_squared()))
        }
    }

    fn accept(old: f64, new: f64, log_amplitude: bool) -> f64 {
        metropolis_symmetric_acceptance(
            &DVector::from_element(1, old),
            &DVector::from_element(1, new),
            log_amplitude,
        )
        .unwrap()[0]
    }

    fn state(rows: usize, cols: usize, fill: f64) -> WalkerState<f64> {
        let position = DMatrix::from_fn(rows, cols, |r, c| fill + (r * cols + c) as f64);
        let amplitude = DVector::from_fn(rows, |r, _| fill - r as f64);
        WalkerState::new(position, amplitude, vec![cols]).unwrap()
    }

    #[test]
    fn test_log_acceptance_values() {
        assert_relative_eq!(accept(0.0, -0.5, true), (-1.0f64).exp());
        assert_eq!(accept(0.0, 0.5, true), 1.0);
        assert_eq!(accept(-1e300, 1e300, true), 1.0);
        assert_eq!(accept(0.0, -1e4, true), 0.0);
    }

    #[test]
    fn test_raw_acceptance_values() {
        assert_relative_eq!(accept(1.0, 0.5, false), 0.25);
        assert_relative_eq!(accept(-2.0, 1.0, false), 0.25);
        assert_eq!(accept(0.5, 1.0, false), 1.0);
        assert_eq!(accept(0.0, 0.0, false), 1.0);
        assert_eq!(accept(0.0, 3.0, false), 1.0);
        let tiny = accept(1e200, 1e100, false);
        assert!(tiny.is_finite() && tiny >= 0.0);
    }

    #[test]
    fn test_raw_acceptance_where_squares_leave_range() {
        // both squares underflow to zero
        let small = accept(1e-170, 1e-180, false);
        assert_relative_eq!(small, 1e-20, max_relative = 1e-12);
        assert_relative_eq!(small, accept(1e-170f64.ln(), 1e-180f64.ln(), true), max_relative = 1e-9);

        // both squares overflow to infinity
        let large = accept(1e160, 1e159, false);
        assert_relative_eq!(large, 0.01, max_relative = 1e-12);
        assert_relative_eq!(large, accept(1e160f64.ln(), 1e159f64.ln(), true), max_relative = 1e-9);
    }

    #[test]
    fn test_acceptance_length_mismatch() {
        let result = metropolis_symmetric_acceptance(
            &DVector::from_element(3, 0.0),
            &DVector::from_element(2, 0.0),
            true,
        );
        assert!(matches!(result, Err(VmcError::ShapeMismatch { expected: 3, found: 2, .. })));
    }

    proptest! {
        #[test]
        fn prop_acceptance_is_a_probability(
            old in -1e6f64..1e6,
            new in -1e6f64..1e6,
            log_amplitude in any::<bool>(),
        ) {
            let p = accept(old, new, log_amplitude);
            prop_assert!(p.is_finite());
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn prop_representations_agree(a in -100.0f64..100.0, b in -100.0f64..100.0) {
            let raw = accept(a.exp(), b.exp(), false);
            let log = accept(a, b, true);
            prop_assert!(relative_eq!(raw, log, epsilon = 1e-300, max_relative = 1e-9));
        }

        #[test]
        fn prop_more_probable_proposal_always_accepted(a in -100.0f64..100.0, delta in 0.0f64..50.0) {
            let b = a + delta;
            prop_assert_eq!(accept(a.exp(), b.exp(), false), 1.0);
            prop_assert_eq!(accept(a, b, true), 1.0);
        }
    }

    #[test]
    fn test_all_false_mask_is_identity() {
        let data = state(4, 3, 0.0);
        let proposed = state(4, 3, 100.0);
        let updated = MaskedUpdate.update(&data, proposed, &[false; 4]).unwrap();
        assert_eq!(updated, data);
    }

    #[test]
    fn test_all_true_mask_takes_proposal() {
        let data = state(4, 3, 0.0);
        let proposed = state(4, 3, 100.0);
        let updated = MaskedUpdate.update(&data, proposed.clone(), &[true; 4]).unwrap();
        assert_eq!(updated, proposed);
    }

    #[test]
    fn test_mixed_mask_is_per_chain() {
        let data = state(3, 2, 0.0);
        let proposed = state(3, 2, 100.0);
        let updated = MaskedUpdate.update(&data, proposed.clone(), &[true, false, true]).unwrap();
        assert_eq!(updated.configuration(0), proposed.configuration(0));
        assert_eq!(updated.configuration(1), data.configuration(1));
        assert_eq!(updated.configuration(2), proposed.configuration(2));
        assert_eq!(updated.amplitude()[0], proposed.amplitude()[0]);
        assert_eq!(updated.amplitude()[1], data.amplitude()[1]);
    }

    #[test]
    fn test_update_rejects_wrong_mask_length() {
        let data = state(3, 2, 0.0);
        let result = MaskedUpdate.update(&data, data.clone(), &[true, false]);
        assert!(matches!(result, Err(VmcError::ShapeMismatch { what: "update mask", .. })));
    }

    #[test]
    fn test_gaussian_proposal_keeps_amplitude_consistent() {
        let position = DMatrix::from_element(5, 4, 0.0);
        let data = WalkerState::from_model(&HalfSquaredNorm, &(), position, vec![2, 2]).unwrap();
        let proposal = GaussianProposal::new(HalfSquaredNorm, 0.7);
        let (proposed, _) = proposal.propose(&(), &data, RandomKey::from_seed(8)).unwrap();

        assert_eq!(proposed.config_shape(), &[2, 2]);
        assert!(proposed.position() != data.position());
        for c in 0..proposed.n_chains() {
            let expected = -0.5 * proposed.position().row(c).norm_squared();
            assert_relative_eq!(proposed.amplitude()[c], expected);
        }
    }

    #[test]
    fn test_zero_std_move_proposes_current_position() {
        let position = DMatrix::from_fn(2, 3, |r, c| (r + c) as f64);
        let data = WalkerState::from_model(&HalfSquaredNorm, &(), position, vec![3]).unwrap();
        let (proposed, _) = GaussianProposal::new(HalfSquaredNorm, 0.0)
            .propose(&(), &data, RandomKey::from_seed(1))
            .unwrap();
        assert_eq!(proposed, data);
    }

    #[test]
    fn test_gaussian_step_acceptance_in_unit_interval() {
        let step = gaussian_metropolis_step(1.0, HalfSquaredNorm, true);
        let position = DMatrix::from_element(64, 3, 0.0);
        let mut data = WalkerState::from_model(&HalfSquaredNorm, &(), position, vec![3]).unwrap();
        let mut key = RandomKey::from_seed(77);
        for _ in 0..20 {
            let (accept, new_data, new_key): (f64, _, _) = step.step(&(), &data, key).unwrap();
            assert!((0.0..=1.0).contains(&accept));
            for c in 0..new_data.n_chains() {
                let expected = -0.5 * new_data.position().row(c).norm_squared();
                assert_relative_eq!(new_data.amplitude()[c], expected);
            }
            data = new_data;
            key = new_key;
        }
    }
}
