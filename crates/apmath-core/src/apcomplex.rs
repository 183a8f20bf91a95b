//! Arbitrary-precision complex numbers: a real/imaginary pair sharing a
//! radix.

use std::fmt;

use crate::apfloat::{Apfloat, INFINITE};
use crate::error::ApError;
use crate::float_math;

/// An arbitrary-precision complex number.
#[derive(Debug, Clone)]
pub struct Apcomplex {
    real: Apfloat,
    imag: Apfloat,
}

impl Apcomplex {
    /// Pair a real and imaginary part.
    #[must_use]
    pub fn new(real: Apfloat, imag: Apfloat) -> Self {
        debug_assert_eq!(real.radix(), imag.radix());
        Self { real, imag }
    }

    /// A purely real value.
    #[must_use]
    pub fn from_real(real: Apfloat) -> Self {
        let radix = real.radix();
        Self::new(real, Apfloat::zero(radix))
    }

    /// The zero value.
    #[must_use]
    pub fn zero(radix: u32) -> Self {
        Self::from_real(Apfloat::zero(radix))
    }

    /// The value one.
    #[must_use]
    pub fn one(radix: u32) -> Self {
        Self::from_real(Apfloat::one(radix))
    }

    /// The imaginary unit.
    #[must_use]
    pub fn i(radix: u32) -> Self {
        Self::new(Apfloat::zero(radix), Apfloat::one(radix))
    }

    /// Real part.
    #[must_use]
    pub fn real(&self) -> &Apfloat {
        &self.real
    }

    /// Imaginary part.
    #[must_use]
    pub fn imag(&self) -> &Apfloat {
        &self.imag
    }

    /// The radix the digits are stored in.
    #[must_use]
    pub fn radix(&self) -> u32 {
        self.real.radix()
    }

    /// Whether both parts are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.real.is_zero() && self.imag.is_zero()
    }

    /// Precision in radix digits: the lesser of the parts, ignoring an
    /// exact zero part.
    #[must_use]
    pub fn precision(&self) -> u64 {
        match (self.real.is_zero(), self.imag.is_zero()) {
            (false, true) => self.real.precision(),
            (true, false) => self.imag.precision(),
            _ => self.real.precision().min(self.imag.precision()),
        }
    }

    /// A copy constrained to `precision` digits in both parts.
    #[must_use]
    pub fn with_precision(&self, precision: u64) -> Self {
        Self::new(
            self.real.with_precision(precision),
            self.imag.with_precision(precision),
        )
    }

    /// Scale of the dominant part.
    #[must_use]
    pub fn scale(&self) -> i64 {
        if self.real.is_zero() {
            self.imag.scale()
        } else if self.imag.is_zero() {
            self.real.scale()
        } else {
            self.real.scale().max(self.imag.scale())
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(self.real.negate(), self.imag.negate())
    }

    /// Complex conjugate.
    #[must_use]
    pub fn conj(&self) -> Self {
        Self::new(self.real.clone(), self.imag.negate())
    }

    /// Multiplication by the imaginary unit.
    #[must_use]
    pub fn times_i(&self) -> Self {
        Self::new(self.imag.negate(), self.real.clone())
    }

    /// Addition.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn add(&self, other: &Self) -> Result<Self, ApError> {
        Ok(Self::new(
            self.real.add(&other.real)?,
            self.imag.add(&other.imag)?,
        ))
    }

    /// Subtraction.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn subtract(&self, other: &Self) -> Result<Self, ApError> {
        Ok(Self::new(
            self.real.subtract(&other.real)?,
            self.imag.subtract(&other.imag)?,
        ))
    }

    /// Multiplication: `(ac - bd) + (ad + bc)i`.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn multiply(&self, other: &Self) -> Result<Self, ApError> {
        let ac = self.real.multiply(&other.real)?;
        let bd = self.imag.multiply(&other.imag)?;
        let ad = self.real.multiply(&other.imag)?;
        let bc = self.imag.multiply(&other.real)?;
        Ok(Self::new(ac.subtract(&bd)?, ad.add(&bc)?))
    }

    /// Exact multiplication of both parts by a word below the base.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn multiply_word(&self, m: u64) -> Result<Self, ApError> {
        Ok(Self::new(
            self.real.multiply_word(m)?,
            self.imag.multiply_word(m)?,
        ))
    }

    /// Truncated division of both parts by a word.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a zero divisor.
    pub fn divide_word(&self, d: u64, precision: u64) -> Result<Self, ApError> {
        Ok(Self::new(
            self.real.divide_word(d, precision)?,
            self.imag.divide_word(d, precision)?,
        ))
    }

    /// Division through the conjugate: `z/w = z*conj(w) / |w|^2`.
    ///
    /// # Errors
    ///
    /// Domain for a zero divisor; Precision when the needed reciprocal is
    /// of exact values.
    pub fn divide(&self, other: &Self) -> Result<Self, ApError> {
        if other.is_zero() {
            return Err(ApError::Domain("division by zero"));
        }
        if self.is_zero() {
            return Ok(Self::zero(self.radix()));
        }
        // Purely real divisors keep the parts independent.
        if other.imag.is_zero() {
            return Ok(Self::new(
                float_math::divide(&self.real, &other.real)?,
                float_math::divide(&self.imag, &other.real)?,
            ));
        }
        let numerator = self.multiply(&other.conj())?;
        let norm = other
            .real
            .multiply(&other.real)?
            .add(&other.imag.multiply(&other.imag)?)?;
        Ok(Self::new(
            float_math::divide(&numerator.real, &norm)?,
            float_math::divide(&numerator.imag, &norm)?,
        ))
    }

    /// Number of leading digits this value shares with `other`, measured
    /// on the dominant component of the difference.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn equal_digits(&self, other: &Self) -> Result<u64, ApError> {
        let diff = self.subtract(other)?;
        if diff.is_zero() {
            return Ok(self.precision().min(other.precision()));
        }
        let scale = self.scale().min(other.scale());
        let matched = i128::from(scale) - i128::from(diff.scale());
        Ok(u64::try_from(matched.max(0)).unwrap_or(0))
    }
}

impl fmt::Display for Apcomplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.imag.is_zero() {
            self.real.fmt(f)
        } else {
            write!(f, "({}, {})", self.real, self.imag)
        }
    }
}

/// Divide by `2i`: `(a + bi) / 2i = (b - ai) / 2`.
pub(crate) fn halve_over_i(z: &Apcomplex, precision: u64) -> Result<Apcomplex, ApError> {
    Apcomplex::new(z.imag().clone(), z.real().negate()).divide_word(2, precision)
}

/// Exactness marker shared by the transcendental entry points.
pub(crate) fn require_finite(precision: u64) -> Result<u64, ApError> {
    if precision == INFINITE {
        Err(ApError::Precision("transcendental of an exact value"))
    } else {
        Ok(precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: &str, im: &str) -> Apcomplex {
        Apcomplex::new(
            Apfloat::parse(re, 10, Some(40)).unwrap(),
            Apfloat::parse(im, 10, Some(40)).unwrap(),
        )
    }

    #[test]
    fn multiply_and_conjugate() {
        let z = c("3", "4");
        let product = z.multiply(&z.conj()).unwrap();
        assert_eq!(product.real().to_string(), "25");
        assert!(product.imag().is_zero());
        assert_eq!(z.multiply(&z).unwrap().to_string(), "(-7, 24)");
    }

    #[test]
    fn divide_recovers_factor() {
        let z = c("-7", "24");
        let w = c("3", "4");
        let q = z.divide(&w).unwrap();
        let reference = c("3", "4");
        assert!(q.equal_digits(&reference).unwrap() >= 38);
    }

    #[test]
    fn times_i_rotates() {
        let z = c("2", "5");
        assert_eq!(z.times_i().to_string(), "(-5, 2)");
        assert_eq!(z.times_i().times_i().to_string(), "(-2, -5)");
    }

    #[test]
    fn display_forms() {
        assert_eq!(c("1.5", "0").to_string(), "1.5");
        assert_eq!(c("1.5", "-2").to_string(), "(1.5, -2)");
    }

    #[test]
    fn precision_ignores_exact_zero_part() {
        let z = Apcomplex::from_real(Apfloat::parse("2", 10, Some(33)).unwrap());
        assert_eq!(z.precision(), 33);
    }
}
