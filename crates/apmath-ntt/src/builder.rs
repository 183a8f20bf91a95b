//! Strategy selection.
//!
//! Chooses a transform strategy from the rounded transform length, the L1
//! cache size and the memory budget: table FNT when the transform plus its
//! twiddle table fit in half the cache, six-step while the power-of-two
//! part fits in main memory, two-pass disk transforms beyond that. A
//! factor of three wraps the chosen strategy, fusing with six-step when
//! the whole length still fits in memory.

use tracing::debug;

use crate::context::Context;
use crate::error::NttError;
use crate::limb::NttLimb;
use crate::strategy::NttStrategy;

/// Round up to the nearest power of two or three times a power of two.
#[must_use]
pub fn round23up(n: u64) -> u64 {
    if n <= 1 {
        return n.max(1);
    }
    let p = n.next_power_of_two();
    let h = p / 4 * 3;
    if n <= h {
        h
    } else {
        p
    }
}

/// Creates transform strategies suitable for a given length and the
/// machine parameters in the context.
#[derive(Debug, Clone)]
pub struct NttBuilder<'a> {
    ctx: &'a Context,
}

impl<'a> NttBuilder<'a> {
    /// Builder over the given context.
    #[must_use]
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Select a strategy for a transform of at least `min_length` elements.
    ///
    /// # Errors
    ///
    /// Returns [`NttError::TransformLength`] when the rounded length
    /// exceeds what the element type's prime triple supports.
    pub fn create<L: NttLimb>(&self, min_length: u64) -> Result<NttStrategy, NttError> {
        let size = round23up(min_length);
        if size > L::max_transform_length() {
            return Err(NttError::TransformLength {
                requested: size,
                maximum: L::max_transform_length(),
            });
        }

        let word_size = std::mem::size_of::<L::Word>() as u64;
        let cache_words = self.ctx.cache_l1_size as u64 / word_size;
        let memory_words = self.ctx.max_memory_block_size as u64 / word_size;

        // Power-of-two part; with a factor of three this is one third of
        // the whole transform length.
        let power2size = size & size.wrapping_neg();
        let use_factor3 = size != power2size;

        let inner = if power2size <= cache_words / 2 {
            NttStrategy::Table
        } else if power2size <= memory_words && power2size <= i32::MAX as u64 {
            NttStrategy::SixStep
        } else {
            NttStrategy::TwoPass {
                block_words: self.ctx.block_size,
            }
        };

        let strategy = if use_factor3 {
            if size <= memory_words && size <= i32::MAX as u64 && inner == NttStrategy::SixStep {
                NttStrategy::Factor3SixStep
            } else {
                NttStrategy::Factor3(Box::new(inner))
            }
        } else {
            inner
        };

        debug!(
            element = L::NAME,
            min_length, size, ?strategy, "selected transform strategy"
        );
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{IntLimb, LongLimb};

    #[test]
    fn round23up_values() {
        assert_eq!(round23up(1), 1);
        assert_eq!(round23up(2), 2);
        assert_eq!(round23up(3), 3);
        assert_eq!(round23up(4), 4);
        assert_eq!(round23up(5), 6);
        assert_eq!(round23up(6), 6);
        assert_eq!(round23up(7), 8);
        assert_eq!(round23up(97), 128);
        assert_eq!(round23up(96), 96);
        assert_eq!(round23up(1 << 20), 1 << 20);
        assert_eq!(round23up((1 << 20) + 1), 3 << 19);
    }

    fn test_context() -> Context {
        // 1Ki-word cache, 64Ki-word memory budget over u64 words.
        Context::default()
            .with_cache_l1_size(8 * 1024)
            .with_max_memory_block_size(8 * 65_536)
    }

    #[test]
    fn selects_by_size_class() {
        let ctx = test_context();
        let builder = NttBuilder::new(&ctx);

        // Fits in half the cache (512 words).
        assert_eq!(builder.create::<LongLimb>(512).unwrap(), NttStrategy::Table);
        // 769 rounds to 1024, past the cache boundary.
        assert_eq!(builder.create::<LongLimb>(769).unwrap(), NttStrategy::SixStep);
        assert_eq!(
            builder.create::<LongLimb>(65_536).unwrap(),
            NttStrategy::SixStep
        );
        // Past the memory budget.
        assert!(matches!(
            builder.create::<LongLimb>(131_072).unwrap(),
            NttStrategy::TwoPass { .. }
        ));
    }

    #[test]
    fn factor3_wrapping_and_fusion() {
        let ctx = test_context();
        let builder = NttBuilder::new(&ctx);

        // 3 * 2^9 with the power-of-two part in cache.
        assert_eq!(
            builder.create::<LongLimb>(3 * 512).unwrap(),
            NttStrategy::Factor3(Box::new(NttStrategy::Table))
        );
        // 3 * 2^14: inner six-step and the whole length fits in memory.
        assert_eq!(
            builder.create::<LongLimb>(3 << 14).unwrap(),
            NttStrategy::Factor3SixStep
        );
        // 3 * 2^15 = 98304 > 65536 memory words: the power-of-two part
        // still fits, so the six-step inner gets the generic wrapper.
        assert_eq!(
            builder.create::<LongLimb>(3 << 15).unwrap(),
            NttStrategy::Factor3(Box::new(NttStrategy::SixStep))
        );
        // Far past the budget: two-pass inside factor-3.
        assert!(matches!(
            builder.create::<LongLimb>(3 << 17).unwrap(),
            NttStrategy::Factor3(inner) if matches!(*inner, NttStrategy::TwoPass { .. })
        ));
    }

    #[test]
    fn rejects_excessive_length() {
        let ctx = Context::default();
        let builder = NttBuilder::new(&ctx);
        let err = builder.create::<IntLimb>(1 << 40).unwrap_err();
        assert!(matches!(err, NttError::TransformLength { .. }));
    }
}
