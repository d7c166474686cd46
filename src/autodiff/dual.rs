//! First-order dual numbers for forward-mode differentiation.
//!
//! A `Dual { re, eps }` carries a value and its derivative along one input
//! direction. Evaluating any function written against [`Real`] on duals
//! yields the function value and its directional derivative in one pass.
//! Duals nest: `Dual<Dual<f64>>` gives second directional derivatives.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};

use num_traits::{FromPrimitive, Num, One, Zero};

use super::real::Real;

#[derive(Clone, Copy, Debug)]
pub struct Dual<S> {
    /// Primal part.
    pub re: S,
    /// Tangent part.
    pub eps: S,
}

impl<S: Real> Dual<S> {
    pub fn new(re: S, eps: S) -> Self {
        Self { re, eps }
    }

    /// Value with zero tangent.
    pub fn constant(re: S) -> Self {
        Self { re, eps: S::zero() }
    }

    /// Value with unit tangent.
    pub fn variable(re: S) -> Self {
        Self { re, eps: S::one() }
    }

    /// Seeds `values` with `tangent`, component by component.
    pub fn seed(values: &[S], tangent: &[S]) -> Vec<Self> {
        values
            .iter()
            .zip(tangent.iter())
            .map(|(&re, &eps)| Self::new(re, eps))
            .collect()
    }

    /// Seeds `values` with the `index`-th standard basis tangent.
    pub fn seed_basis(values: &[S], index: usize) -> Vec<Self> {
        values
            .iter()
            .enumerate()
            .map(|(j, &re)| if j == index { Self::variable(re) } else { Self::constant(re) })
            .collect()
    }
}

// Comparisons only look at the primal part.
impl<S: Real> PartialEq for Dual<S> {
    fn eq(&self, other: &Self) -> bool {
        self.re == other.re
    }
}

impl<S: Real> PartialOrd for Dual<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.re.partial_cmp(&other.re)
    }
}

impl<S: Real> Add for Dual<S> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.eps + rhs.eps)
    }
}

impl<S: Real> Sub for Dual<S> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.eps - rhs.eps)
    }
}

impl<S: Real> Mul for Dual<S> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.re * rhs.re, self.re * rhs.eps + self.eps * rhs.re)
    }
}

impl<S: Real> Div for Dual<S> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let re = self.re / rhs.re;
        Self::new(re, (self.eps - re * rhs.eps) / rhs.re)
    }
}

// d(a mod b) = da - trunc(a / b) db, with the truncated quotient recovered
// exactly from the primal remainder.
impl<S: Real> Rem for Dual<S> {
    type Output = Self;

    #[inline]
    fn rem(self, rhs: Self) -> Self {
        let re = self.re % rhs.re;
        let quotient = (self.re - re) / rhs.re;
        Self::new(re, self.eps - quotient * rhs.eps)
    }
}

impl<S: Real> Neg for Dual<S> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.eps)
    }
}

impl<S: Real> AddAssign for Dual<S> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<S: Real> SubAssign for Dual<S> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<S: Real> MulAssign for Dual<S> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<S: Real> DivAssign for Dual<S> {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<S: Real> RemAssign for Dual<S> {
    fn rem_assign(&mut self, rhs: Self) {
        *self = *self % rhs;
    }
}

impl<S: Real> Zero for Dual<S> {
    fn zero() -> Self {
        Self::constant(S::zero())
    }

    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.eps.is_zero()
    }
}

impl<S: Real> One for Dual<S> {
    fn one() -> Self {
        Self::constant(S::one())
    }
}

impl<S: Real> Num for Dual<S> {
    type FromStrRadixErr = S::FromStrRadixErr;

    fn from_str_radix(text: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        S::from_str_radix(text, radix).map(Self::constant)
    }
}

impl<S: Real> FromPrimitive for Dual<S> {
    fn from_i64(n: i64) -> Option<Self> {
        S::from_i64(n).map(Self::constant)
    }

    fn from_u64(n: u64) -> Option<Self> {
        S::from_u64(n).map(Self::constant)
    }

    fn from_f64(n: f64) -> Option<Self> {
        S::from_f64(n).map(Self::constant)
    }
}

impl<S: Real> Real for Dual<S> {
    fn lit(value: f64) -> Self {
        Self::constant(S::lit(value))
    }

    fn exp(self) -> Self {
        let e = self.re.exp();
        Self::new(e, self.eps * e)
    }

    fn ln(self) -> Self {
        Self::new(self.re.ln(), self.eps / self.re)
    }

    fn sqrt(self) -> Self {
        let s = self.re.sqrt();
        Self::new(s, self.eps / (s + s))
    }

    fn powi(self, n: i32) -> Self {
        if n == 0 {
            return Self::one();
        }
        let lower = self.re.powi(n - 1);
        Self::new(lower * self.re, self.eps * S::lit(n as f64) * lower)
    }

    fn abs(self) -> Self {
        if self.re < S::zero() {
            -self
        } else {
            self
        }
    }

    fn sin(self) -> Self {
        Self::new(self.re.sin(), self.eps * self.re.cos())
    }

    fn cos(self) -> Self {
        Self::new(self.re.cos(), -(self.eps * self.re.sin()))
    }

    fn tanh(self) -> Self {
        let t = self.re.tanh();
        Self::new(t, self.eps * (S::one() - t * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn numerical_derivative(f: impl Fn(f64) -> f64, x: f64, h: f64) -> f64 {
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    fn composite<S: Real>(x: S) -> S {
        (x * x + S::one()).sqrt() * x.sin().exp() / (x.tanh() + S::lit(2.0)) + x.cos().powi(3)
    }

    #[test]
    fn test_dual_matches_numerical_derivative() {
        let h = 1e-5;
        for &x in &[-1.3, -0.2, 0.4, 2.1] {
            let d = composite(Dual::variable(x));
            assert_relative_eq!(d.re, composite(x), epsilon = 1e-12);
            assert_relative_eq!(d.eps, numerical_derivative(composite::<f64>, x, h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_ln_and_abs() {
        let d = Dual::variable(-2.0f64).abs().ln();
        assert_relative_eq!(d.re, 2.0f64.ln());
        assert_relative_eq!(d.eps, -0.5);
    }

    #[test]
    fn test_nested_dual_gives_second_derivative() {
        // f(x) = x^4, f'' = 12 x^2
        let x = 1.5f64;
        let inner = Dual::variable(x);
        let outer = Dual::new(inner, Dual::constant(1.0));
        let y = outer.powi(4);
        assert_relative_eq!(y.re.re, x.powi(4));
        assert_relative_eq!(y.eps.re, 4.0 * x.powi(3));
        assert_relative_eq!(y.eps.eps, 12.0 * x * x);
    }

    #[test]
    fn test_powi_zero_has_no_tangent() {
        let y = Dual::variable(0.0f64).powi(0);
        assert_eq!(y.re, 1.0);
        assert_eq!(y.eps, 0.0);
    }

    #[test]
    fn test_rem_derivative() {
        // x mod 1.5 has unit slope between jumps, and d/dy (7 mod y) = -trunc(7 / y)
        let x = Dual::variable(4.0f64) % Dual::constant(1.5);
        assert_relative_eq!(x.re, 1.0);
        assert_relative_eq!(x.eps, 1.0);
        let y = Dual::constant(7.0f64) % Dual::variable(2.0);
        assert_relative_eq!(y.re, 1.0);
        assert_relative_eq!(y.eps, -3.0);
    }

    #[test]
    fn test_num_traits_constants() {
        let zero = Dual::<f64>::zero();
        assert!(zero.is_zero());
        assert!(!Dual::new(0.0f64, 1.0).is_zero());
        assert_eq!(Dual::<f64>::one().re, 1.0);
        let parsed = Dual::<f64>::from_str_radix("2.5", 10).unwrap();
        assert_eq!((parsed.re, parsed.eps), (2.5, 0.0));
        assert_eq!(Dual::<f64>::from_u64(3).map(|d| d.re), Some(3.0));
    }

    #[test]
    fn test_seed_basis() {
        let xs = Dual::seed_basis(&[1.0f64, 2.0, 3.0], 1);
        assert_eq!(xs.iter().map(|d| d.eps).collect::<Vec<_>>(), vec![0.0, 1.0, 0.0]);
        assert_eq!(xs.iter().map(|d| d.re).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }
}
