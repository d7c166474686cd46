//! Autodiff module - forward-mode dual numbers and the scalar traits
//! wavefunctions are written against.

mod dual;
mod real;

pub use dual::Dual;
pub use real::{Float, Real};
