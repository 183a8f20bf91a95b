//! # apmath-core
//!
//! Arbitrary-precision integer, real and complex arithmetic built on the
//! apmath-ntt convolution engine.
//!
//! [`Apfloat`] is the digit-sequence number (sign, word exponent, tracked
//! precision, radix-generic mantissa); [`Apint`] pins it to exact integer
//! semantics and [`Apcomplex`] pairs two floats. The math modules supply
//! integer powers, roots with remainder, division with remainder, gcd/lcm
//! and modular powers, plus inverse roots, the AGM, logarithms,
//! exponentials, powers and the trigonometric/hyperbolic family, all with
//! explicit precision tracking and quadratically convergent Newton
//! iteration over the NTT multiply.

pub mod apcomplex;
pub mod apfloat;
pub mod apint;
pub mod complex_math;
pub mod error;
pub mod float_math;
pub mod int_math;

// Re-exports
pub use apcomplex::Apcomplex;
pub use apfloat::{Apfloat, EXTRA_PRECISION, INFINITE};
pub use apint::Apint;
pub use error::ApError;
