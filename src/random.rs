//! Splittable deterministic random keys.
//!
//! A [`RandomKey`] is consumed by value, either by splitting it into two
//! successors or by drawing from it, so a key can never feed two draws.
//! Successors are derived by hashing `(parent, branch)` with SipHash-1-3
//! under fixed zero keys; draws seed a `StdRng` from the key identity.

use std::hash::Hasher;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use siphasher::sip::SipHasher13;

use crate::autodiff::Float;

const SEED_BRANCH: u64 = 0x5eed;
const CARRY_BRANCH: u64 = 0;
const CONSUME_BRANCH: u64 = 1;

fn derive(parent: u64, branch: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(parent);
    hasher.write_u64(branch);
    hasher.finish()
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RandomKey {
    state: u64,
}

impl RandomKey {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: derive(seed, SEED_BRANCH),
        }
    }

    /// Splits into `(key, subkey)`: thread `key` forward, consume `subkey`.
    pub fn split(self) -> (RandomKey, RandomKey) {
        (
            RandomKey {
                state: derive(self.state, CARRY_BRANCH),
            },
            RandomKey {
                state: derive(self.state, CONSUME_BRANCH),
            },
        )
    }

    /// Identity of this key, for diagnostics.
    pub fn id(&self) -> u64 {
        self.state
    }

    fn into_rng(self) -> StdRng {
        StdRng::seed_from_u64(self.state)
    }

    /// `len` independent draws from `[0, 1)`.
    pub fn uniform<F: Float>(self, len: usize) -> DVector<F> {
        let mut rng = self.into_rng();
        DVector::from_fn(len, |_, _| F::sample_unit_uniform(&mut rng))
    }

    /// Matrix of independent standard normal draws.
    pub fn normal<F: Float>(self, nrows: usize, ncols: usize) -> DMatrix<F> {
        let mut rng = self.into_rng();
        DMatrix::from_fn(nrows, ncols, |_, _| F::sample_standard_normal(&mut rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_draws() {
        let a: DVector<f64> = RandomKey::from_seed(3).uniform(16);
        let b: DVector<f64> = RandomKey::from_seed(3).uniform(16);
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_children_differ_from_parent_and_each_other() {
        let key = RandomKey::from_seed(11);
        let parent = key.id();
        let (carry, consume) = key.split();
        assert_ne!(carry.id(), consume.id());
        assert_ne!(carry.id(), parent);
        assert_ne!(consume.id(), parent);
    }

    #[test]
    fn test_split_chain_has_no_repeats() {
        let mut seen = HashSet::new();
        let mut key = RandomKey::from_seed(0);
        for _ in 0..1000 {
            let (next, sub) = key.split();
            assert!(seen.insert(sub.id()));
            key = next;
        }
    }

    #[test]
    fn test_sibling_draws_are_independent() {
        let (a, b) = RandomKey::from_seed(5).split();
        let xa: DVector<f64> = a.uniform(8);
        let xb: DVector<f64> = b.uniform(8);
        assert_ne!(xa, xb);
    }

    #[test]
    fn test_normal_draw_moments() {
        let z: DMatrix<f64> = RandomKey::from_seed(42).normal(200, 50);
        let n = (z.nrows() * z.ncols()) as f64;
        let mean = z.iter().sum::<f64>() / n;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
    }
}
