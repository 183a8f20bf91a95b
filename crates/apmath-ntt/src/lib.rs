//! # apmath-ntt
//!
//! Number theoretic transform convolution engine: the multiplication
//! primitive underneath the apmath arbitrary-precision arithmetic stack.
//!
//! Large products are computed as three parallel NTT convolutions over a
//! triple of word-sized primes, recombined through the Chinese Remainder
//! Theorem with radix-base carry propagation. Transform strategies are
//! chosen by length against the cache size and memory budget: an in-cache
//! table FNT, a six-step in-memory FNT, a two-pass disk FNT, and a
//! factor-3 step wrapping any of them for lengths of three times a power
//! of two.

pub mod builder;
pub mod carry_crt;
pub mod context;
pub mod convolution;
pub mod error;
pub mod limb;
pub mod modmath;
pub mod parallel;
pub mod storage;
pub mod strategy;

pub(crate) mod factor3;
pub(crate) mod six_step;
pub(crate) mod table_fnt;
pub(crate) mod two_pass;

// Re-exports
pub use builder::{round23up, NttBuilder};
pub use carry_crt::CarryCrt;
pub use context::Context;
pub use convolution::{BasicConvolution, Convolution, ConvolutionBuilder, ThreeNttConvolution};
pub use error::NttError;
pub use limb::{DoubleLimb, IntLimb, LongLimb, NttLimb};
pub use modmath::ModMath;
pub use parallel::ParallelRunner;
pub use storage::{DataStorage, DataStorageBuilder};
pub use strategy::NttStrategy;
