//! Chinese Remainder recombination and carry propagation.
//!
//! The three residue streams of a convolution are lifted position by
//! position into integers below p0*p1*p2 using Garner's algorithm, then
//! split into radix-base digits with a carry chained from the least toward
//! the most significant position. Garner's form needs only per-prime
//! u64/u128 arithmetic plus one 192-bit accumulator, instead of reductions
//! by the 186-bit product of the primes.

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::modmath::ModMath;
use crate::storage::{DataStorage, DataStorageBuilder};

/// Unsigned 192-bit accumulator, little-endian limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct U192([u64; 3]);

impl U192 {
    pub(crate) const ZERO: U192 = U192([0; 3]);

    pub(crate) fn from_u128(v: u128) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        U192([v as u64, (v >> 64) as u64, 0])
    }

    pub(crate) fn is_zero(self) -> bool {
        self.0 == [0; 3]
    }

    /// `a * b` widened to 192 bits. The product of a 128-bit and a 64-bit
    /// value always fits.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn mul_u128_u64(a: u128, b: u64) -> Self {
        let lo = (a as u64) as u128 * u128::from(b);
        let hi = (a >> 64) * u128::from(b);
        let mid = (lo >> 64) + (hi as u64 as u128);
        U192([lo as u64, mid as u64, ((hi >> 64) + (mid >> 64)) as u64])
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn add(self, other: U192) -> Self {
        let mut limbs = [0u64; 3];
        let mut carry = 0u64;
        for i in 0..3 {
            let sum = u128::from(self.0[i]) + u128::from(other.0[i]) + u128::from(carry);
            limbs[i] = sum as u64;
            carry = (sum >> 64) as u64;
        }
        debug_assert_eq!(carry, 0, "192-bit accumulator overflow");
        U192(limbs)
    }

    pub(crate) fn add_u128(self, v: u128) -> Self {
        self.add(Self::from_u128(v))
    }

    /// Long division by a word, returning `(quotient, remainder)`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn div_rem_u64(self, d: u64) -> (U192, u64) {
        debug_assert!(d > 0);
        let mut quotient = [0u64; 3];
        let mut rem = 0u128;
        for i in (0..3).rev() {
            let cur = (rem << 64) | u128::from(self.0[i]);
            quotient[i] = (cur / u128::from(d)) as u64;
            rem = cur % u128::from(d);
        }
        (U192(quotient), rem as u64)
    }
}

/// CRT recombination for one element type and radix.
pub struct CarryCrt<L: NttLimb> {
    base: u64,
    p0: u64,
    p0p1: u128,
    inv_p0_mod_p1: u64,
    inv_p0p1_mod_p2: u64,
    mm1: ModMath,
    mm2: ModMath,
    _marker: std::marker::PhantomData<L>,
}

impl<L: NttLimb> CarryCrt<L> {
    /// Precompute the Garner coefficients for the element type's prime
    /// triple and the per-word base of `radix`.
    #[must_use]
    pub fn new(radix: u32) -> Self {
        let [p0, p1, p2] = L::MODULI;
        let mm1 = ModMath::with_modulus(p1);
        let mm2 = ModMath::with_modulus(p2);
        let p0p1 = u128::from(p0) * u128::from(p1);
        #[allow(clippy::cast_possible_truncation)]
        let p0p1_mod_p2 = (p0p1 % u128::from(p2)) as u64;
        let (_, base) = L::base_digits(radix);
        Self {
            base,
            p0,
            p0p1,
            inv_p0_mod_p1: mm1.inverse(p0 % p1),
            inv_p0p1_mod_p2: mm2.inverse(p0p1_mod_p2),
            mm1,
            mm2,
            _marker: std::marker::PhantomData,
        }
    }

    /// Lift one residue triple to the unique integer below p0*p1*p2.
    #[allow(clippy::cast_possible_truncation)]
    fn reconstruct(&self, x0: u64, x1: u64, x2: u64) -> U192 {
        let t1 = self
            .mm1
            .multiply(self.mm1.subtract(x1, x0 % self.mm1.modulus()), self.inv_p0_mod_p1);
        let v01 = u128::from(x0) + u128::from(self.p0) * u128::from(t1);
        let t2 = self.mm2.multiply(
            self.mm2
                .subtract(x2, (v01 % u128::from(self.mm2.modulus())) as u64),
            self.inv_p0p1_mod_p2,
        );
        U192::mul_u128_u64(self.p0p1, t2).add_u128(v01)
    }

    /// Recombine three residue streams of equal length into `result_size`
    /// radix-base digits, most significant first. Positions are processed
    /// from the least significant end with a chained carry; digits beyond
    /// `result_size` are dropped after their carry is absorbed.
    ///
    /// # Errors
    ///
    /// Fails on storage I/O errors.
    pub fn carry_crt(
        &self,
        r0: &DataStorage<L>,
        r1: &DataStorage<L>,
        r2: &DataStorage<L>,
        result_size: usize,
        builder: &DataStorageBuilder,
    ) -> Result<DataStorage<L>, NttError> {
        let n = r0.len();
        debug_assert_eq!(r1.len(), n);
        debug_assert_eq!(r2.len(), n);
        debug_assert!(result_size >= 1);

        let mut result = builder.create::<L>(result_size)?;
        {
            let mut it0 = r0.read_iter_rev(0, n);
            let mut it1 = r1.read_iter_rev(0, n);
            let mut it2 = r2.read_iter_rev(0, n);
            let mut out = result.write_cursor_rev(0, result_size);

            let mut carry = U192::ZERO;
            // Convolution position k contributes at digit position k + 1;
            // the final carry lands in position 0.
            for k in (0..n).rev() {
                let x0 = it0.next().expect("residue stream length");
                let x1 = it1.next().expect("residue stream length");
                let x2 = it2.next().expect("residue stream length");

                let acc = self.reconstruct(x0, x1, x2).add(carry);
                let (q, digit) = acc.div_rem_u64(self.base);
                if k + 1 < result_size {
                    out.put(digit)?;
                }
                carry = q;
            }
            let (q, digit) = carry.div_rem_u64(self.base);
            out.put(digit)?;
            debug_assert!(q.is_zero(), "product exceeds result size");
            out.flush()?;
        }
        Ok(result)
    }
}
