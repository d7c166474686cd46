//! Statistics of correlated Markov chain traces.

use crate::autodiff::Float;

/// Mean, blocking error and integrated autocorrelation time of a trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceSummary<F = f64> {
    pub mean: F,
    pub error: F,
    pub autocorrelation_time: F,
}

/// Summarizes a trace of per-step ensemble means.
///
/// An empty trace summarizes to zero mean and error with unit time.
pub fn summarize<F: Float>(trace: &[F]) -> TraceSummary<F> {
    let autocorrelation_time = autocorrelation_time(trace);
    TraceSummary {
        mean: mean(trace),
        error: blocking_error(trace, autocorrelation_time),
        autocorrelation_time,
    }
}

fn mean<F: Float>(values: &[F]) -> F {
    if values.is_empty() {
        return F::zero();
    }
    values.iter().fold(F::zero(), |acc, &v| acc + v) / F::lit(values.len() as f64)
}

/// Biased autocovariance `1/(n - lag) Σ (x_t - m)(x_{t+lag} - m)`.
fn autocovariance<F: Float>(trace: &[F], mean: F, lag: usize) -> F {
    let pairs = trace.len() - lag;
    let sum = trace
        .iter()
        .zip(&trace[lag..])
        .fold(F::zero(), |acc, (&x, &y)| acc + (x - mean) * (y - mean));
    sum / F::lit(pairs as f64)
}

/// Integrated autocorrelation time `1 + 2 Σ ρ(t)`, summed over lags below
/// `n / 2` until the first negative correlation.
///
/// Traces shorter than two samples or without fluctuations return 1.
pub fn autocorrelation_time<F: Float>(trace: &[F]) -> F {
    let n = trace.len();
    if n < 2 {
        return F::one();
    }
    let m = mean(trace);
    let variance = autocovariance(trace, m, 0);
    if variance.is_zero() {
        return F::one();
    }

    let two = F::lit(2.0);
    (1..n / 2)
        .map(|lag| autocovariance(trace, m, lag) / variance)
        .take_while(|&rho| rho >= F::zero())
        .fold(F::one(), |tau, rho| tau + two * rho)
}

/// Standard error of the mean from non-overlapping blocks of length
/// `ceil(2 τ)`; trailing samples that do not fill a block are dropped.
///
/// Returns 0 when fewer than two blocks fit.
pub fn blocking_error<F: Float>(trace: &[F], autocorrelation_time: F) -> F {
    let tau: f64 = autocorrelation_time.into();
    let block_size = ((2.0 * tau).ceil() as usize).max(1);
    let block_means: Vec<F> = trace.chunks_exact(block_size).map(mean).collect();
    let n_blocks = block_means.len();
    if n_blocks < 2 {
        return F::zero();
    }

    let m = mean(&block_means);
    let sum_sq = block_means.iter().fold(F::zero(), |acc, &b| acc + (b - m) * (b - m));
    (sum_sq / F::lit(((n_blocks - 1) * n_blocks) as f64)).sqrt()
}
