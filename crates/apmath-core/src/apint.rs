//! Arbitrary-precision integers.
//!
//! An `Apint` is an [`Apfloat`] pinned to infinite precision with an
//! integral value; every operation stays exact.

use std::cmp::Ordering;
use std::fmt;

use crate::apfloat::{Apfloat, INFINITE};
use crate::error::ApError;

/// An exact arbitrary-precision integer.
#[derive(Debug, Clone)]
pub struct Apint(pub(crate) Apfloat);

impl Apint {
    /// The zero value.
    #[must_use]
    pub fn zero(radix: u32) -> Self {
        Apint(Apfloat::zero(radix))
    }

    /// The value one.
    #[must_use]
    pub fn one(radix: u32) -> Self {
        Apint(Apfloat::one(radix))
    }

    /// An exact small integer.
    #[must_use]
    pub fn from_i64(value: i64, radix: u32) -> Self {
        Apint(Apfloat::from_i64(value, radix))
    }

    /// Parse an integer in the given radix.
    ///
    /// # Errors
    ///
    /// Returns a domain error for malformed or non-integral input.
    pub fn parse(input: &str, radix: u32) -> Result<Self, ApError> {
        let value = Apfloat::parse(input, radix, Some(INFINITE))?;
        if !value.frac().is_zero() {
            return Err(ApError::Domain("not an integer"));
        }
        Ok(Apint(value))
    }

    /// Wrap a float, truncating any fractional part.
    #[must_use]
    pub fn from_float_truncated(value: &Apfloat) -> Self {
        Apint(value.truncate())
    }

    /// View as a float at the given precision.
    #[must_use]
    pub fn to_float(&self, precision: u64) -> Apfloat {
        self.0.with_precision(precision)
    }

    /// Borrow the underlying float (always infinite precision).
    #[must_use]
    pub fn as_float(&self) -> &Apfloat {
        &self.0
    }

    /// The radix the digits are stored in.
    #[must_use]
    pub fn radix(&self) -> u32 {
        self.0.radix()
    }

    /// -1, 0 or 1.
    #[must_use]
    pub fn signum(&self) -> i32 {
        self.0.signum()
    }

    /// Whether this is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of digits.
    #[must_use]
    pub fn scale(&self) -> i64 {
        self.0.scale()
    }

    /// Negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        Apint(self.0.negate())
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Apint(self.0.abs())
    }

    /// Exact addition.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn add(&self, other: &Self) -> Result<Self, ApError> {
        Ok(Apint(self.0.add(&other.0)?))
    }

    /// Exact subtraction.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn subtract(&self, other: &Self) -> Result<Self, ApError> {
        Ok(Apint(self.0.subtract(&other.0)?))
    }

    /// Exact multiplication through the convolution engine.
    ///
    /// # Errors
    ///
    /// Propagates storage failures and transform-length overruns.
    pub fn multiply(&self, other: &Self) -> Result<Self, ApError> {
        Ok(Apint(self.0.multiply(&other.0)?))
    }

    /// Exact multiplication by `radix^digits` for non-negative shifts.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn scale_by(&self, digits: i64) -> Result<Self, ApError> {
        debug_assert!(digits >= 0);
        Ok(Apint(self.0.scale_by(digits)?))
    }

    /// Exact multiplication by a word below the base.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn multiply_word(&self, m: u64) -> Result<Self, ApError> {
        Ok(Apint(self.0.multiply_word(m)?))
    }

    /// Three-way comparison.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        self.0.compare_to(&other.0)
    }

    /// Exact division by a machine word: `(quotient, remainder)` with the
    /// quotient truncated toward zero and the remainder the magnitude of
    /// `|self| mod d`.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a zero divisor.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn div_rem_word(&self, d: u64) -> Result<(Apint, u64), ApError> {
        use crate::apfloat::base_digits;
        if d == 0 {
            return Err(ApError::Domain("division by zero"));
        }
        if self.is_zero() {
            return Ok((Apint::zero(self.radix()), 0));
        }
        let (_, base) = base_digits(self.radix());
        let len = self.0.exponent as usize;
        debug_assert!(len >= self.0.data.len(), "integer invariant");

        let mut words = Vec::with_capacity(len);
        let mut rem = 0u128;
        for i in 0..len {
            let w = self.0.data.get(i).copied().unwrap_or(0);
            let cur = rem * u128::from(base) + u128::from(w);
            words.push((cur / u128::from(d)) as u64);
            rem = cur % u128::from(d);
        }
        let quotient = Apfloat::from_parts(
            self.0.sign,
            self.0.exponent,
            INFINITE,
            self.radix(),
            words,
        );
        Ok((Apint(quotient), rem as u64))
    }

    /// Convert to i64.
    ///
    /// # Errors
    ///
    /// Overflow when the value does not fit.
    pub fn to_i64(&self) -> Result<i64, ApError> {
        self.0.to_i64()
    }
}

impl fmt::Display for Apint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for Apint {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(other) == Ordering::Equal
    }
}

impl Eq for Apint {}

impl PartialOrd for Apint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Ord for Apint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}
