//! Scalar traits shared by primal floats and dual numbers.

use std::fmt::{Debug, Display};
use std::ops::Neg;

use num_traits::{FromPrimitive, NumAssign};
use rand::Rng;
use rand_distr::{Distribution, Standard, StandardNormal};

/// Real-valued scalar that wavefunctions are written against.
///
/// Arithmetic, `zero`, `one` and conversions come from `num_traits`. The
/// methods below are the elementary functions a trial wavefunction may use,
/// which [`Dual`](super::Dual) differentiates. Every `num_traits::Float`
/// type is a `Real` through the blanket impl.
pub trait Real: NumAssign + FromPrimitive + Copy + Debug + PartialOrd + Neg<Output = Self> + 'static {
    /// Constant with the value of `value`, NaN if unrepresentable.
    fn lit(value: f64) -> Self;

    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sqrt(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn abs(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tanh(self) -> Self;
}

impl<T> Real for T
where
    T: num_traits::Float + FromPrimitive + NumAssign + Debug + 'static,
{
    #[inline]
    fn lit(value: f64) -> Self {
        T::from_f64(value).unwrap_or_else(T::nan)
    }

    #[inline]
    fn exp(self) -> Self {
        <T as num_traits::Float>::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        <T as num_traits::Float>::ln(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        <T as num_traits::Float>::sqrt(self)
    }

    #[inline]
    fn powi(self, n: i32) -> Self {
        <T as num_traits::Float>::powi(self, n)
    }

    #[inline]
    fn abs(self) -> Self {
        <T as num_traits::Float>::abs(self)
    }

    #[inline]
    fn sin(self) -> Self {
        <T as num_traits::Float>::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        <T as num_traits::Float>::cos(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        <T as num_traits::Float>::tanh(self)
    }
}

/// Primal floating point precision: a `num_traits::Float` that `rand_distr`
/// can sample and that widens losslessly to `f64` for reporting.
pub trait Float: Real + Into<f64> + Display + Send + Sync {
    /// Draws from the standard normal distribution.
    fn sample_standard_normal<R: Rng>(rng: &mut R) -> Self;

    /// Draws uniformly from `[0, 1)`.
    fn sample_unit_uniform<R: Rng>(rng: &mut R) -> Self;
}

impl<T> Float for T
where
    T: Real + num_traits::Float + Into<f64> + Display + Send + Sync,
    StandardNormal: Distribution<T>,
    Standard: Distribution<T>,
{
    fn sample_standard_normal<R: Rng>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }

    fn sample_unit_uniform<R: Rng>(rng: &mut R) -> Self {
        Standard.sample(rng)
    }
}
