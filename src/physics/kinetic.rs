//! Laplacian-over-psi by forward-mode differentiation of grad log|psi|.

use super::traits::{GradLogPsi, LogPsi};
use crate::autodiff::{Dual, Float, Real};
use crate::error::{ensure_len, Result};

/// Computes (∇²psi)/psi at a single configuration `x`.
///
/// Uses the identity
///
///   (∇²psi) / psi = ∇² log|psi| + |∇ log|psi||²
///
/// to stay in the log domain. For each coordinate `i`, `grad_log_psi` is
/// evaluated on duals seeded with the `i`-th basis direction; the primal
/// gives `∂_i log|psi|` and the tangent gives the Hessian diagonal entry
/// `∂_i² log|psi|`. This costs `n` gradient evaluations and never forms the
/// Hessian.
///
/// Applies to one configuration; map over rows for a batch.
pub fn laplacian_psi_over_psi<F, G>(grad_log_psi: &G, params: &[F], x: &[F]) -> Result<F>
where
    F: Float,
    G: GradLogPsi + ?Sized,
{
    let n = x.len();
    let params: Vec<Dual<F>> = params.iter().map(|&p| Dual::constant(p)).collect();

    let mut total = F::zero();
    for i in 0..n {
        let grad = grad_log_psi.grad_log_psi(&params, &Dual::seed_basis(x, i))?;
        ensure_len("grad_log_psi output", n, grad.len())?;
        let g = grad[i];
        total += g.re * g.re + g.eps;
    }
    Ok(total)
}

/// Derives ∇ log|psi| from a [`LogPsi`] by forward mode, one coordinate at
/// a time.
#[derive(Clone, Debug)]
pub struct ForwardGradient<M>(pub M);

impl<M: LogPsi> GradLogPsi for ForwardGradient<M> {
    fn grad_log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<Vec<S>> {
        let params: Vec<Dual<S>> = params.iter().map(|&p| Dual::constant(p)).collect();
        (0..x.len())
            .map(|i| Ok(self.0.log_psi(&params, &Dual::seed_basis(x, i))?.eps))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmcError;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    /// grad log|psi| of psi = exp(-|x|^2 / 2).
    struct StandardGaussianGrad;

    impl GradLogPsi for StandardGaussianGrad {
        fn grad_log_psi<S: Real>(&self, _: &[S], x: &[S]) -> Result<Vec<S>> {
            Ok(x.iter().map(|&v| -v).collect())
        }
    }

    /// log|psi| = -a x0^2 - 2 x1^2 + x0 x1 + 0.3 sin(x2), with params [a].
    struct Skewed;

    impl LogPsi for Skewed {
        fn log_psi<S: Real>(&self, params: &[S], x: &[S]) -> Result<S> {
            let a = params[0];
            Ok(-(a * x[0] * x[0]) - S::lit(2.0) * x[1] * x[1] + x[0] * x[1]
                + S::lit(0.3) * x[2].sin())
        }
    }

    struct Truncated;

    impl GradLogPsi for Truncated {
        fn grad_log_psi<S: Real>(&self, _: &[S], x: &[S]) -> Result<Vec<S>> {
            Ok(x[..x.len() - 1].to_vec())
        }
    }

    fn numerical_laplacian_over_psi<M: LogPsi>(model: &M, params: &[f64], x: &[f64], h: f64) -> f64 {
        let psi = |y: &[f64]| model.log_psi(params, y).unwrap().exp();
        let psi0 = psi(x);
        let mut laplacian = 0.0;
        for i in 0..x.len() {
            let mut fwd = x.to_vec();
            let mut bwd = x.to_vec();
            fwd[i] += h;
            bwd[i] -= h;
            laplacian += (psi(&fwd) - 2.0 * psi0 + psi(&bwd)) / (h * h);
        }
        laplacian / psi0
    }

    #[test]
    fn test_gaussian_matches_closed_form() {
        let mut rng = StdRng::seed_from_u64(17);
        let dist = Normal::new(0.0, 1.5).unwrap();
        for n in [1usize, 3, 6, 10] {
            let x: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let expected = x.iter().map(|v| v * v).sum::<f64>() - n as f64;
            let got = laplacian_psi_over_psi(&StandardGaussianGrad, &[], &x).unwrap();
            assert_relative_eq!(got, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_precision() {
        let x = [0.5f32, -1.0, 2.0];
        let got = laplacian_psi_over_psi(&StandardGaussianGrad, &[], &x).unwrap();
        assert_relative_eq!(got, 5.25f32 - 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_forward_gradient_of_log_psi() {
        let params = [0.7];
        let x = [0.3, -0.4, 1.1];
        let grad = ForwardGradient(Skewed).grad_log_psi(&params, &x).unwrap();
        assert_relative_eq!(grad[0], -2.0 * 0.7 * 0.3 + -0.4, epsilon = 1e-12);
        assert_relative_eq!(grad[1], -4.0 * -0.4 + 0.3, epsilon = 1e-12);
        assert_relative_eq!(grad[2], 0.3 * 1.1f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_nested_forward_mode_matches_finite_differences() {
        let params = [0.7];
        let x = [0.3, -0.4, 1.1];
        let got = laplacian_psi_over_psi(&ForwardGradient(Skewed), &params, &x).unwrap();
        let numerical = numerical_laplacian_over_psi(&Skewed, &params, &x, 1e-4);
        assert_relative_eq!(got, numerical, epsilon = 1e-5);
    }

    #[test]
    fn test_wrong_gradient_length_is_shape_mismatch() {
        let result = laplacian_psi_over_psi(&Truncated, &[], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(VmcError::ShapeMismatch { what: "grad_log_psi output", expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_empty_configuration() {
        let got = laplacian_psi_over_psi(&StandardGaussianGrad, &[], &[] as &[f64]).unwrap();
        assert_eq!(got, 0.0);
    }
}
