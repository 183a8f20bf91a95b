//! Convolution in the transform domain.
//!
//! Large products run three parallel NTT convolutions, one per prime, and
//! recombine the residues through the carry-CRT step. Short products use
//! the schoolbook method; the builder picks by operand size.

use tracing::debug;

use crate::builder::NttBuilder;
use crate::carry_crt::{CarryCrt, U192};
use crate::context::Context;
use crate::error::NttError;
use crate::limb::NttLimb;
use crate::modmath::ModMath;
use crate::parallel::ParallelRunner;
use crate::storage::{DataStorage, DataStorageBuilder};
use crate::strategy::NttStrategy;

/// Combined operand length below which the schoolbook method wins.
const NTT_THRESHOLD: usize = 128;

/// Schoolbook convolution with exact 192-bit position accumulators.
pub struct BasicConvolution<L: NttLimb> {
    base: u64,
    _marker: std::marker::PhantomData<L>,
}

impl<L: NttLimb> BasicConvolution<L> {
    /// Schoolbook convoluter for the given radix.
    #[must_use]
    pub fn new(radix: u32) -> Self {
        let (_, base) = L::base_digits(radix);
        Self {
            base,
            _marker: std::marker::PhantomData,
        }
    }

    /// Multiply two digit sequences, most significant digit first,
    /// producing `result_size` digits (truncated from the least
    /// significant end when shorter than the full product).
    ///
    /// # Errors
    ///
    /// Fails on storage I/O errors.
    pub fn convolute(
        &self,
        x: &DataStorage<L>,
        y: &DataStorage<L>,
        result_size: usize,
        builder: &DataStorageBuilder,
    ) -> Result<DataStorage<L>, NttError> {
        let a = x.to_words()?;
        let b = y.to_words()?;
        let (nx, ny) = (a.len(), b.len());
        debug_assert!(result_size <= nx + ny);

        let mut digits = vec![0u64; result_size];
        let mut carry = U192::ZERO;
        // Position k of the linear convolution lands at digit k + 1, with
        // the final carry in digit 0.
        for k in (0..nx + ny - 1).rev() {
            let mut acc = carry;
            let i_lo = k.saturating_sub(ny - 1);
            let i_hi = k.min(nx - 1);
            for i in i_lo..=i_hi {
                acc = acc.add_u128(u128::from(a[i]) * u128::from(b[k - i]));
            }
            let (q, digit) = acc.div_rem_u64(self.base);
            if k + 1 < result_size {
                digits[k + 1] = digit;
            }
            carry = q;
        }
        let (q, digit) = carry.div_rem_u64(self.base);
        digits[0] = digit;
        debug_assert!(q.is_zero(), "product exceeds result size");

        let mut result = builder.create::<L>(result_size)?;
        let words: Vec<L::Word> = digits.into_iter().map(L::from_u64).collect();
        result.write_block(0, &words)?;
        Ok(result)
    }
}

/// Convolution through three parallel NTTs and the Chinese Remainder
/// Theorem.
pub struct ThreeNttConvolution<'a, L: NttLimb> {
    ctx: &'a Context,
    strategy: NttStrategy,
    storage_builder: DataStorageBuilder,
    carry_crt: CarryCrt<L>,
}

impl<'a, L: NttLimb> ThreeNttConvolution<'a, L> {
    /// Convoluter using the given transform strategy.
    #[must_use]
    pub fn new(ctx: &'a Context, radix: u32, strategy: NttStrategy) -> Self {
        Self {
            ctx,
            strategy,
            storage_builder: DataStorageBuilder::new(ctx),
            carry_crt: CarryCrt::new(radix),
        }
    }

    /// Convolute `x` with `y` into `result_size` digits. Passing the same
    /// storage for both operands routes to the squaring specialization.
    ///
    /// # Errors
    ///
    /// Fails when the transform length exceeds the element type's maximum
    /// or on storage I/O errors.
    pub fn convolute(
        &self,
        x: &DataStorage<L>,
        y: &DataStorage<L>,
        result_size: usize,
    ) -> Result<DataStorage<L>, NttError> {
        if std::ptr::eq(x, y) {
            return self.auto_convolute(x, result_size);
        }

        let length = self.checked_length(x.len() as u64 + y.len() as u64)?;
        let runner = self.runner()?;
        // Hold the shared-memory lock while the transforms are in flight;
        // the guard releases on every exit path.
        let _guard = self.maybe_lock(length);

        let r0 = self.convolute_one(x, y, length, 0, false, runner.as_ref())?;
        let r1 = self.convolute_one(x, y, length, 1, false, runner.as_ref())?;
        let r2 = self.convolute_one(x, y, length, 2, true, runner.as_ref())?;

        self.carry_crt
            .carry_crt(&r0, &r1, &r2, result_size, &self.storage_builder)
    }

    /// Convolute a data set with itself: one forward transform per modulus
    /// instead of two.
    ///
    /// # Errors
    ///
    /// Fails when the transform length exceeds the element type's maximum
    /// or on storage I/O errors.
    pub fn auto_convolute(
        &self,
        x: &DataStorage<L>,
        result_size: usize,
    ) -> Result<DataStorage<L>, NttError> {
        let length = self.checked_length(2 * x.len() as u64)?;
        let runner = self.runner()?;
        let _guard = self.maybe_lock(length);

        let r0 = self.auto_convolute_one(x, length, 0, false, runner.as_ref())?;
        let r1 = self.auto_convolute_one(x, length, 1, false, runner.as_ref())?;
        let r2 = self.auto_convolute_one(x, length, 2, true, runner.as_ref())?;

        self.carry_crt
            .carry_crt(&r0, &r1, &r2, result_size, &self.storage_builder)
    }

    fn checked_length(&self, min_length: u64) -> Result<usize, NttError> {
        let length = self.strategy.transform_length(min_length);
        if length > L::max_transform_length() {
            return Err(NttError::TransformLength {
                requested: length,
                maximum: L::max_transform_length(),
            });
        }
        debug!(length, strategy = ?self.strategy, "convolution transform");
        Ok(usize::try_from(length).expect("transform length fits usize"))
    }

    fn runner(&self) -> Result<Option<ParallelRunner>, NttError> {
        if self.strategy.is_parallel_capable() && self.ctx.number_of_processors > 1 {
            Ok(Some(ParallelRunner::new(self.ctx.number_of_processors)?))
        } else {
            Ok(None)
        }
    }

    fn maybe_lock(&self, length: usize) -> Option<parking_lot::MutexGuard<'static, ()>> {
        let bytes = length * std::mem::size_of::<L::Word>();
        if self.strategy.is_parallel_capable() && bytes > self.ctx.shared_memory_threshold {
            Some(self.ctx.lock_shared_memory())
        } else {
            None
        }
    }

    /// One modulus worth of convolution. The result is downgraded to
    /// at-rest storage unless `keep_cached` asks for it to stay resident
    /// for the immediately following CRT pass.
    /// Transform scratch: cached for random-access strategies, budget
    /// driven (and thus usually disk) for the two-pass family.
    fn scratch(&self, length: usize) -> Result<DataStorage<L>, NttError> {
        if self.strategy.requires_disk() {
            self.storage_builder.create::<L>(length)
        } else {
            Ok(self.storage_builder.create_cached::<L>(length))
        }
    }

    fn convolute_one(
        &self,
        x: &DataStorage<L>,
        y: &DataStorage<L>,
        length: usize,
        modulus_idx: usize,
        keep_cached: bool,
        runner: Option<&ParallelRunner>,
    ) -> Result<DataStorage<L>, NttError> {
        let mm = ModMath::new::<L>(modulus_idx);

        let mut tmp_y = self.scratch(length)?;
        tmp_y.copy_from(y, length)?;
        self.strategy.transform(&mut tmp_y, modulus_idx, runner)?;
        let tmp_y = self.storage_builder.downgrade(tmp_y)?;

        let mut tmp_x = self.scratch(length)?;
        tmp_x.copy_from(x, length)?;
        self.strategy.transform(&mut tmp_x, modulus_idx, runner)?;

        tmp_x.update_zip(length, &tmp_y, |a, b| mm.multiply(a, b))?;
        self.strategy.inverse_transform(&mut tmp_x, modulus_idx, runner)?;

        if keep_cached {
            Ok(tmp_x)
        } else {
            self.storage_builder.downgrade(tmp_x)
        }
    }

    fn auto_convolute_one(
        &self,
        x: &DataStorage<L>,
        length: usize,
        modulus_idx: usize,
        keep_cached: bool,
        runner: Option<&ParallelRunner>,
    ) -> Result<DataStorage<L>, NttError> {
        let mm = ModMath::new::<L>(modulus_idx);

        let mut tmp = self.scratch(length)?;
        tmp.copy_from(x, length)?;
        self.strategy.transform(&mut tmp, modulus_idx, runner)?;
        tmp.update_range(0, length, |v| mm.multiply(v, v))?;
        self.strategy.inverse_transform(&mut tmp, modulus_idx, runner)?;

        if keep_cached {
            Ok(tmp)
        } else {
            self.storage_builder.downgrade(tmp)
        }
    }
}

/// A convolution method selected for a pair of operand sizes.
pub enum Convolution<'a, L: NttLimb> {
    /// Schoolbook method for short operands.
    Basic(BasicConvolution<L>, DataStorageBuilder),
    /// Transform-domain method for everything else.
    ThreeNtt(ThreeNttConvolution<'a, L>),
}

impl<L: NttLimb> Convolution<'_, L> {
    /// Run the selected method.
    ///
    /// # Errors
    ///
    /// Fails when the transform length exceeds the element type's maximum
    /// or on storage I/O errors.
    pub fn convolute(
        &self,
        x: &DataStorage<L>,
        y: &DataStorage<L>,
        result_size: usize,
    ) -> Result<DataStorage<L>, NttError> {
        match self {
            Convolution::Basic(basic, builder) => basic.convolute(x, y, result_size, builder),
            Convolution::ThreeNtt(ntt) => ntt.convolute(x, y, result_size),
        }
    }
}

/// Picks a convolution method from the operand sizes.
#[derive(Debug, Clone)]
pub struct ConvolutionBuilder<'a> {
    ctx: &'a Context,
}

impl<'a> ConvolutionBuilder<'a> {
    /// Builder over the given context.
    #[must_use]
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Select a method for operands of `size1` and `size2` digits.
    ///
    /// # Errors
    ///
    /// Returns [`NttError::TransformLength`] when even the largest
    /// supported transform cannot hold the product.
    pub fn create<L: NttLimb>(
        &self,
        radix: u32,
        size1: u64,
        size2: u64,
    ) -> Result<Convolution<'a, L>, NttError> {
        if size1 + size2 < NTT_THRESHOLD as u64 {
            debug!(size1, size2, "selected schoolbook convolution");
            Ok(Convolution::Basic(
                BasicConvolution::new(radix),
                DataStorageBuilder::new(self.ctx),
            ))
        } else {
            let strategy = NttBuilder::new(self.ctx).create::<L>(size1 + size2)?;
            Ok(Convolution::ThreeNtt(ThreeNttConvolution::new(
                self.ctx, radix, strategy,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{DoubleLimb, IntLimb, LongLimb};

    fn storage_from<L: NttLimb>(digits: &[u64]) -> DataStorage<L> {
        let mut s = DataStorage::<L>::cached(digits.len());
        let words: Vec<L::Word> = digits.iter().map(|&d| L::from_u64(d)).collect();
        s.write_block(0, &words).unwrap();
        s
    }

    #[test]
    fn basic_small_product() {
        // 123 * 456 = 56088, radix 10 with single-digit words forced by a
        // word-per-digit layout in base 10^k: use 10^9 words directly.
        let ctx = Context::default();
        let builder = DataStorageBuilder::new(&ctx);
        let basic = BasicConvolution::<IntLimb>::new(10);

        let x = storage_from::<IntLimb>(&[123]);
        let y = storage_from::<IntLimb>(&[456]);
        let out = basic.convolute(&x, &y, 2, &builder).unwrap();
        assert_eq!(out.to_words().unwrap(), vec![0, 56_088]);
    }

    #[test]
    fn basic_carry_chain() {
        // (base - 1) * (base - 1) = [base - 2, 1] MSD first.
        let ctx = Context::default();
        let builder = DataStorageBuilder::new(&ctx);
        let basic = BasicConvolution::<LongLimb>::new(10);
        let base = 1_000_000_000_000_000_000u64;

        let x = storage_from::<LongLimb>(&[base - 1]);
        let out = basic.convolute(&x, &x, 2, &builder).unwrap();
        assert_eq!(out.to_words().unwrap(), vec![base - 2, 1]);
    }

    fn ntt_matches_basic<L: NttLimb>(nx: usize, ny: usize) {
        let ctx = Context::default();
        let builder = DataStorageBuilder::new(&ctx);
        let (_, base) = L::base_digits(10);

        let xd: Vec<u64> = (0..nx as u64).map(|i| (i * 910_481 + 7) % base).collect();
        let yd: Vec<u64> = (0..ny as u64).map(|i| (i * 653_111 + 3) % base).collect();
        let x = storage_from::<L>(&xd);
        let y = storage_from::<L>(&yd);

        let basic = BasicConvolution::<L>::new(10);
        let expected = basic.convolute(&x, &y, nx + ny, &builder).unwrap();

        let strategy = NttBuilder::new(&ctx).create::<L>((nx + ny) as u64).unwrap();
        let ntt = ThreeNttConvolution::<L>::new(&ctx, 10, strategy);
        let got = ntt.convolute(&x, &y, nx + ny).unwrap();

        assert_eq!(
            got.to_words().unwrap(),
            expected.to_words().unwrap(),
            "{} {nx}x{ny}",
            L::NAME
        );
    }

    #[test]
    fn ntt_matches_basic_all_element_types() {
        ntt_matches_basic::<IntLimb>(40, 25);
        ntt_matches_basic::<LongLimb>(40, 25);
        ntt_matches_basic::<DoubleLimb>(40, 25);
    }

    #[test]
    fn ntt_matches_basic_factor3_length() {
        // 50 + 46 = 96 = 3 * 32 rounds to a factor-3 transform.
        ntt_matches_basic::<LongLimb>(50, 46);
    }

    #[test]
    fn auto_convolute_matches_convolute() {
        let ctx = Context::default();
        let (_, base) = LongLimb::base_digits(10);
        let xd: Vec<u64> = (0..60u64).map(|i| (i * 37 + 11) % base).collect();
        let x = storage_from::<LongLimb>(&xd);
        let y = storage_from::<LongLimb>(&xd);

        let strategy = NttBuilder::new(&ctx).create::<LongLimb>(120).unwrap();
        let ntt = ThreeNttConvolution::<LongLimb>::new(&ctx, 10, strategy);

        let squared = ntt.auto_convolute(&x, 120).unwrap();
        let multiplied = ntt.convolute(&x, &y, 120).unwrap();
        assert_eq!(
            squared.to_words().unwrap(),
            multiplied.to_words().unwrap()
        );

        // Aliased operands route to the squaring path.
        let aliased = ntt.convolute(&x, &x, 120).unwrap();
        assert_eq!(aliased.to_words().unwrap(), squared.to_words().unwrap());
    }

    #[test]
    fn disk_backed_two_pass_convolution() {
        // Shrink the budget so the transform spills to disk.
        let mut ctx = Context::default()
            .with_cache_l1_size(1024)
            .with_max_memory_block_size(2048);
        ctx.memory_threshold = 2048;
        ctx.block_size = 128;

        let (_, base) = LongLimb::base_digits(10);
        let xd: Vec<u64> = (0..300u64).map(|i| (i * 17 + 5) % base).collect();
        let yd: Vec<u64> = (0..212u64).map(|i| (i * 23 + 1) % base).collect();
        let x = storage_from::<LongLimb>(&xd);
        let y = storage_from::<LongLimb>(&yd);

        let strategy = NttBuilder::new(&ctx).create::<LongLimb>(512).unwrap();
        assert!(matches!(strategy, NttStrategy::TwoPass { .. }));
        let ntt = ThreeNttConvolution::<LongLimb>::new(&ctx, 10, strategy);
        let got = ntt.convolute(&x, &y, 512).unwrap();

        let default_ctx = Context::default();
        let builder = DataStorageBuilder::new(&default_ctx);
        let expected = BasicConvolution::<LongLimb>::new(10)
            .convolute(&x, &y, 512, &builder)
            .unwrap();
        assert_eq!(got.to_words().unwrap(), expected.to_words().unwrap());
    }

    #[test]
    fn builder_selects_by_size() {
        let ctx = Context::default();
        let builder = ConvolutionBuilder::new(&ctx);
        assert!(matches!(
            builder.create::<LongLimb>(10, 10, 10).unwrap(),
            Convolution::Basic(..)
        ));
        assert!(matches!(
            builder.create::<LongLimb>(10, 100, 100).unwrap(),
            Convolution::ThreeNtt(..)
        ));
    }
}
