//! Transform strategies as a tagged variant.
//!
//! The factor-3 decorator composes over an inner strategy rather than
//! subclassing it; the fused six-step variant exists as its own tag for
//! the case where the whole factor-3 transform fits in memory.
//!
//! Strategies are stateless between calls, but a transform in flight owns
//! its storage exclusively; concurrent use of one strategy instance
//! requires external synchronization.

use crate::builder::round23up;
use crate::error::NttError;
use crate::factor3;
use crate::limb::NttLimb;
use crate::parallel::ParallelRunner;
use crate::six_step;
use crate::storage::DataStorage;
use crate::table_fnt;
use crate::two_pass;

/// A forward/inverse transform algorithm for one power-of-two length,
/// optionally wrapped by a factor-3 outer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NttStrategy {
    /// In-cache table FNT.
    Table,
    /// Six-step FNT over cached storage.
    SixStep,
    /// Two-pass FNT over disk-backed storage.
    TwoPass {
        /// Words resident per column fetch.
        block_words: usize,
    },
    /// Factor-3 step fused with a six-step inner transform.
    Factor3SixStep,
    /// Factor-3 step over any inner strategy.
    Factor3(Box<NttStrategy>),
}

impl NttStrategy {
    /// Smallest supported transform length that is at least `n`.
    #[must_use]
    pub fn transform_length(&self, n: u64) -> u64 {
        round23up(n)
    }

    /// Largest transform length supported by the element type.
    #[must_use]
    pub fn max_transform_length<L: NttLimb>() -> u64 {
        L::max_transform_length()
    }

    /// Whether the strategy's step kernels can use the worker pool. The
    /// in-cache table FNT always runs on the calling thread.
    #[must_use]
    pub fn is_parallel_capable(&self) -> bool {
        !matches!(self, NttStrategy::Table)
    }

    /// Whether the strategy streams its data from disk-capable storage.
    /// Every other strategy requires cached scratch for random access.
    #[must_use]
    pub fn requires_disk(&self) -> bool {
        match self {
            NttStrategy::TwoPass { .. } => true,
            NttStrategy::Factor3(inner) => inner.requires_disk(),
            _ => false,
        }
    }

    /// Forward transform of the whole storage in place.
    ///
    /// # Errors
    ///
    /// Fails on storage I/O errors, or when a cache-resident strategy is
    /// given uncached storage.
    pub fn transform<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        modulus_idx: usize,
        runner: Option<&ParallelRunner>,
    ) -> Result<(), NttError> {
        let len = storage.len();
        self.transform_region(storage, 0, len, modulus_idx, runner)
    }

    /// Inverse transform of the whole storage in place. The storage holds
    /// unnormalized transform-domain data; the `1/length` factor is applied
    /// as the final step.
    ///
    /// # Errors
    ///
    /// Fails on storage I/O errors, or when a cache-resident strategy is
    /// given uncached storage.
    pub fn inverse_transform<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        modulus_idx: usize,
        runner: Option<&ParallelRunner>,
    ) -> Result<(), NttError> {
        let len = storage.len();
        self.inverse_transform_region(storage, 0, len, modulus_idx, len as u64, runner)
    }

    fn transform_region<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        offset: usize,
        len: usize,
        modulus_idx: usize,
        runner: Option<&ParallelRunner>,
    ) -> Result<(), NttError> {
        match self {
            NttStrategy::Table => table_fnt::transform_region(storage, offset, len, modulus_idx),
            NttStrategy::SixStep => {
                six_step::transform_region(storage, offset, len, modulus_idx, runner)
            }
            NttStrategy::TwoPass { block_words } => {
                two_pass::transform_region(storage, offset, len, modulus_idx, *block_words)
            }
            NttStrategy::Factor3SixStep => {
                self.factor3_forward(storage, offset, len, modulus_idx, runner, &NttStrategy::SixStep)
            }
            NttStrategy::Factor3(inner) => {
                self.factor3_forward(storage, offset, len, modulus_idx, runner, inner)
            }
        }
    }

    fn inverse_transform_region<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        offset: usize,
        len: usize,
        modulus_idx: usize,
        total_length: u64,
        runner: Option<&ParallelRunner>,
    ) -> Result<(), NttError> {
        match self {
            NttStrategy::Table => {
                table_fnt::inverse_transform_region(storage, offset, len, modulus_idx, total_length)
            }
            NttStrategy::SixStep => six_step::inverse_transform_region(
                storage,
                offset,
                len,
                modulus_idx,
                total_length,
                runner,
            ),
            NttStrategy::TwoPass { block_words } => two_pass::inverse_transform_region(
                storage,
                offset,
                len,
                modulus_idx,
                total_length,
                *block_words,
            ),
            NttStrategy::Factor3SixStep => self.factor3_inverse(
                storage,
                offset,
                len,
                modulus_idx,
                total_length,
                runner,
                &NttStrategy::SixStep,
            ),
            NttStrategy::Factor3(inner) => self.factor3_inverse(
                storage,
                offset,
                len,
                modulus_idx,
                total_length,
                runner,
                inner,
            ),
        }
    }

    /// Butterfly columns, then the three power-of-two subtransforms.
    #[allow(clippy::too_many_arguments)]
    fn factor3_forward<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        offset: usize,
        len: usize,
        modulus_idx: usize,
        runner: Option<&ParallelRunner>,
        inner: &NttStrategy,
    ) -> Result<(), NttError> {
        debug_assert_eq!(len % 3, 0);
        let m = len / 3;
        factor3::transform_columns(storage, offset, m, modulus_idx, false, runner)?;
        for third in 0..3 {
            inner.transform_region(storage, offset + third * m, m, modulus_idx, runner)?;
        }
        Ok(())
    }

    /// The three inverse subtransforms (normalizing by the full length),
    /// then the inverse butterfly columns.
    #[allow(clippy::too_many_arguments)]
    fn factor3_inverse<L: NttLimb>(
        &self,
        storage: &mut DataStorage<L>,
        offset: usize,
        len: usize,
        modulus_idx: usize,
        total_length: u64,
        runner: Option<&ParallelRunner>,
        inner: &NttStrategy,
    ) -> Result<(), NttError> {
        debug_assert_eq!(len % 3, 0);
        let m = len / 3;
        for third in 0..3 {
            inner.inverse_transform_region(
                storage,
                offset + third * m,
                m,
                modulus_idx,
                total_length,
                runner,
            )?;
        }
        factor3::transform_columns(storage, offset, m, modulus_idx, true, runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{DoubleLimb, IntLimb, LongLimb, NttLimb};

    fn roundtrip<L: NttLimb>(strategy: &NttStrategy, storage: &mut DataStorage<L>, n: usize) {
        for modulus_idx in 0..3 {
            let words: Vec<L::Word> = (0..n as u64).map(|v| L::from_u64(v * 11 + 2)).collect();
            storage.write_block(0, &words).unwrap();

            strategy.transform(storage, modulus_idx, None).unwrap();
            strategy.inverse_transform(storage, modulus_idx, None).unwrap();

            let expected: Vec<u64> = (0..n as u64).map(|v| v * 11 + 2).collect();
            assert_eq!(storage.to_words().unwrap(), expected, "modulus {modulus_idx}");
        }
    }

    #[test]
    fn roundtrip_every_strategy_shape() {
        let cases: Vec<(NttStrategy, usize, bool)> = vec![
            (NttStrategy::Table, 128, true),
            (NttStrategy::SixStep, 128, true),
            (NttStrategy::TwoPass { block_words: 64 }, 256, false),
            (NttStrategy::Factor3SixStep, 3 * 64, true),
            (NttStrategy::Factor3(Box::new(NttStrategy::Table)), 3 * 32, true),
            (
                NttStrategy::Factor3(Box::new(NttStrategy::TwoPass { block_words: 32 })),
                3 * 64,
                false,
            ),
        ];
        for (strategy, n, cached) in cases {
            let mut storage = if cached {
                DataStorage::<LongLimb>::cached(n)
            } else {
                DataStorage::<LongLimb>::disk(n).unwrap()
            };
            roundtrip::<LongLimb>(&strategy, &mut storage, n);
        }
    }

    #[test]
    fn roundtrip_other_element_types() {
        let strategy = NttStrategy::Factor3(Box::new(NttStrategy::Table));
        let n = 3 * 16;
        let mut int_storage = DataStorage::<IntLimb>::cached(n);
        roundtrip::<IntLimb>(&strategy, &mut int_storage, n);
        let mut double_storage = DataStorage::<DoubleLimb>::cached(n);
        roundtrip::<DoubleLimb>(&strategy, &mut double_storage, n);
    }

    #[test]
    fn strategies_agree_in_transform_domain_after_roundtrip() {
        // Different strategies may permute the transform domain, but a
        // transform/inverse pair through any of them is the identity, so a
        // convolution computed with one must match another. Compare a
        // squared sequence across table and fused factor-3 six-step paths
        // at the same length.
        let n = 3 * 128;
        let words: Vec<u64> = (0..n as u64).map(|v| v % 97).collect();
        let mm = crate::modmath::ModMath::new::<LongLimb>(1);

        let mut results = Vec::new();
        for strategy in [
            NttStrategy::Factor3SixStep,
            NttStrategy::Factor3(Box::new(NttStrategy::Table)),
        ] {
            let mut storage = DataStorage::<LongLimb>::cached(n);
            storage.write_block(0, &words).unwrap();
            strategy.transform(&mut storage, 1, None).unwrap();
            storage
                .update_range(0, n, |v| mm.multiply(v, v))
                .unwrap();
            strategy.inverse_transform(&mut storage, 1, None).unwrap();
            results.push(storage.to_words().unwrap());
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn parallel_capability() {
        assert!(!NttStrategy::Table.is_parallel_capable());
        assert!(NttStrategy::SixStep.is_parallel_capable());
        assert!(NttStrategy::Factor3(Box::new(NttStrategy::Table)).is_parallel_capable());
    }
}
