//! The arbitrary-precision floating-point number.
//!
//! A value is sign * 0.d1 d2 ... * base^exponent, where the digits are
//! packed into 64-bit words of `base = radix^k` for the largest `k` the
//! transform engine's element type supports, most significant word first.
//! The exponent counts words, so alignment in addition never shifts digits
//! inside a word; the digit-level scale is derived. Precision is tracked
//! in radix digits, with [`INFINITE`] marking exact values.
//!
//! Invariants for non-zero values: the leading and trailing stored words
//! are non-zero, the sign is +/-1, and the precision is at least one
//! digit. Zero has sign 0, empty digits and an undefined exponent.

use std::cmp::Ordering;
use std::fmt;

use apmath_ntt::{Context, ConvolutionBuilder, DataStorage, LongLimb, NttLimb};

use crate::error::ApError;

/// Sentinel precision marking an exact value.
pub const INFINITE: u64 = u64::MAX;

/// Working-precision margin applied wherever round-off is expected.
pub const EXTRA_PRECISION: u64 = 20;

/// Digits per word and word base for a radix, as supported by the engine's
/// 64-bit element type.
#[must_use]
pub fn base_digits(radix: u32) -> (u32, u64) {
    LongLimb::base_digits(radix)
}

/// Number of radix digits an IEEE double can represent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn double_digits(radix: u32) -> u64 {
    ((52.0 / f64::from(radix).log2()).floor() as u64).max(1)
}

/// Saturating precision addition that preserves [`INFINITE`].
#[must_use]
pub fn extend_precision(precision: u64, extra: u64) -> u64 {
    if precision == INFINITE {
        INFINITE
    } else {
        precision.saturating_add(extra)
    }
}

/// An arbitrary-precision real number.
#[derive(Debug, Clone)]
pub struct Apfloat {
    pub(crate) sign: i32,
    pub(crate) exponent: i64,
    pub(crate) precision: u64,
    pub(crate) radix: u32,
    pub(crate) data: Vec<u64>,
}

impl Apfloat {
    /// The zero value.
    #[must_use]
    pub fn zero(radix: u32) -> Self {
        Self {
            sign: 0,
            exponent: 0,
            precision: INFINITE,
            radix,
            data: Vec::new(),
        }
    }

    /// The value one, exact.
    #[must_use]
    pub fn one(radix: u32) -> Self {
        Self::from_u64(1, radix)
    }

    /// An exact small non-negative integer.
    #[must_use]
    pub fn from_u64(value: u64, radix: u32) -> Self {
        let (_, base) = base_digits(radix);
        let mut data = Vec::new();
        let mut v = value;
        while v > 0 {
            data.push(v % base);
            v /= base;
        }
        data.reverse();
        let exponent = data.len() as i64;
        Self::from_parts(i32::from(value > 0), exponent, INFINITE, radix, data)
    }

    /// An exact small integer.
    #[must_use]
    pub fn from_i64(value: i64, radix: u32) -> Self {
        let mut result = Self::from_u64(value.unsigned_abs(), radix);
        if value < 0 {
            result.sign = -1;
        }
        result
    }

    /// Build from raw parts, normalizing to the stored-word invariants.
    pub(crate) fn from_parts(
        sign: i32,
        mut exponent: i64,
        precision: u64,
        radix: u32,
        mut data: Vec<u64>,
    ) -> Self {
        // Strip leading zero words; each drops the exponent by one.
        let leading = data.iter().take_while(|&&w| w == 0).count();
        data.drain(..leading);
        exponent -= leading as i64;
        // Trailing zero words carry no information.
        while data.last() == Some(&0) {
            data.pop();
        }
        if data.is_empty() || sign == 0 {
            return Self::zero(radix);
        }
        let mut result = Self {
            sign,
            exponent,
            precision: precision.max(1),
            radix,
            data,
        };
        result.limit();
        result
    }

    /// Truncate the stored words to what the precision justifies.
    fn limit(&mut self) {
        if self.precision == INFINITE || self.sign == 0 {
            return;
        }
        let (bd, _) = base_digits(self.radix);
        let max_words = (self.precision.div_ceil(u64::from(bd)) + 1) as usize;
        if self.data.len() > max_words {
            self.data.truncate(max_words);
            while self.data.last() == Some(&0) {
                self.data.pop();
            }
            if self.data.is_empty() {
                *self = Self::zero(self.radix);
            }
        }
    }

    /// The radix the digits are stored in.
    #[must_use]
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Precision in radix digits; [`INFINITE`] for exact values.
    #[must_use]
    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// A copy constrained (or extended) to `precision` digits.
    #[must_use]
    pub fn with_precision(&self, precision: u64) -> Self {
        let mut result = self.clone();
        result.precision = precision.max(1);
        result.limit();
        result
    }

    /// -1, 0 or 1.
    #[must_use]
    pub fn signum(&self) -> i32 {
        self.sign
    }

    /// Whether this is the zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    /// Word count of the stored mantissa.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Word-level exponent.
    #[must_use]
    pub fn word_exponent(&self) -> i64 {
        self.exponent
    }

    /// Base-radix exponent of the most significant digit: 1 for values in
    /// [1, radix), 0 for values in [1/radix, 1), and so on. Undefined (0)
    /// for zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale(&self) -> i64 {
        if self.sign == 0 {
            return 0;
        }
        let (bd, _) = base_digits(self.radix);
        let msw_digits = i128::from(digits_in(self.data[0], self.radix));
        let scale = (i128::from(self.exponent) - 1) * i128::from(bd) + msw_digits;
        scale.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        let mut result = self.clone();
        result.sign = -result.sign;
        result
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        let mut result = self.clone();
        result.sign = result.sign.abs();
        result
    }

    /// Multiply by `radix^digits` (an exact exponent shift when the shift
    /// is word-aligned, otherwise a word multiply).
    ///
    /// # Errors
    ///
    /// Propagates storage failures from the underlying multiply.
    pub fn scale_by(&self, digits: i64) -> Result<Self, ApError> {
        if self.sign == 0 || digits == 0 {
            return Ok(self.clone());
        }
        let (bd, _) = base_digits(self.radix);
        let bd = i64::from(bd);
        let words = digits.div_euclid(bd);
        let rest = digits.rem_euclid(bd);
        let mut result = self.clone();
        result.exponent += words;
        if rest > 0 {
            let factor = u64::pow(u64::from(self.radix), u32::try_from(rest).expect("rest < bd"));
            result = result.multiply_word(factor)?;
        }
        Ok(result)
    }

    fn compare_abs(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.radix, other.radix);
        match (self.sign == 0, other.sign == 0) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let len = self.data.len().max(other.data.len());
        for i in 0..len {
            let a = self.data.get(i).copied().unwrap_or(0);
            let b = other.data.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Three-way comparison.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal => {}
            ord => return ord,
        }
        let ord = self.compare_abs(other);
        if self.sign < 0 {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Addition. The result precision accounts for the least reliable
    /// digit either operand contributes.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn add(&self, other: &Self) -> Result<Self, ApError> {
        debug_assert_eq!(self.radix, other.radix);
        if self.sign == 0 {
            return Ok(other.clone());
        }
        if other.sign == 0 {
            return Ok(self.clone());
        }

        let result = if self.sign == other.sign {
            let mut sum = add_magnitudes(self, other);
            sum.sign = self.sign;
            sum
        } else {
            match self.compare_abs(other) {
                Ordering::Equal => return Ok(Self::zero(self.radix)),
                Ordering::Greater => {
                    let mut diff = sub_magnitudes(self, other);
                    diff.sign = self.sign;
                    diff
                }
                Ordering::Less => {
                    let mut diff = sub_magnitudes(other, self);
                    diff.sign = other.sign;
                    diff
                }
            }
        };
        Ok(result.carry_precision(self, other))
    }

    /// Subtraction.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn subtract(&self, other: &Self) -> Result<Self, ApError> {
        self.add(&other.negate())
    }

    /// Derive the precision of an addition/subtraction result from the
    /// reliable digit ranges of the operands.
    fn carry_precision(mut self, a: &Self, b: &Self) -> Self {
        if a.precision == INFINITE && b.precision == INFINITE {
            self.precision = INFINITE;
            return self;
        }
        if self.sign == 0 {
            return self;
        }
        // Lowest reliable digit scale across the operands.
        let low_a = reliable_low(a);
        let low_b = reliable_low(b);
        let low = low_a.max(low_b);
        let precision = (i128::from(self.scale()) - low).max(1);
        // Saturate just under the sentinel when one operand was exact and
        // the scales are far apart.
        self.precision = u64::try_from(precision).unwrap_or(INFINITE - 1);
        self.limit();
        self
    }

    /// Multiplication through the convolution engine, using the global
    /// context.
    ///
    /// # Errors
    ///
    /// Propagates storage failures and transform-length overruns.
    pub fn multiply(&self, other: &Self) -> Result<Self, ApError> {
        self.multiply_in(other, Context::global())
    }

    /// Multiplication with an explicit context.
    ///
    /// # Errors
    ///
    /// Propagates storage failures and transform-length overruns.
    pub fn multiply_in(&self, other: &Self, ctx: &Context) -> Result<Self, ApError> {
        debug_assert_eq!(self.radix, other.radix);
        if self.sign == 0 || other.sign == 0 {
            return Ok(Self::zero(self.radix));
        }

        let (n1, n2) = (self.data.len(), other.data.len());
        let conv = ConvolutionBuilder::new(ctx).create::<LongLimb>(
            self.radix,
            n1 as u64,
            n2 as u64,
        )?;

        let x = storage_from(&self.data)?;
        // Aliased operands share one storage so squarings take the
        // single-transform path.
        let product = if std::ptr::eq(self, other) {
            conv.convolute(&x, &x, n1 + n2)?
        } else {
            let y = storage_from(&other.data)?;
            conv.convolute(&x, &y, n1 + n2)?
        };
        let words = product.to_words()?;

        let precision = if self.precision == INFINITE && other.precision == INFINITE {
            INFINITE
        } else {
            self.precision.min(other.precision)
        };
        Ok(Self::from_parts(
            self.sign * other.sign,
            self.exponent + other.exponent,
            precision,
            self.radix,
            words,
        ))
    }

    /// Exact multiplication by a word below the base.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    #[allow(clippy::cast_possible_truncation)]
    pub fn multiply_word(&self, m: u64) -> Result<Self, ApError> {
        let (_, base) = base_digits(self.radix);
        debug_assert!(m < base);
        if self.sign == 0 || m == 0 {
            return Ok(Self::zero(self.radix));
        }
        if m == 1 {
            return Ok(self.clone());
        }

        let mut words = vec![0u64; self.data.len() + 1];
        let mut carry = 0u128;
        for (i, &w) in self.data.iter().enumerate().rev() {
            let product = u128::from(w) * u128::from(m) + carry;
            words[i + 1] = (product % u128::from(base)) as u64;
            carry = product / u128::from(base);
        }
        words[0] = carry as u64;
        Ok(Self::from_parts(
            self.sign,
            self.exponent + 1,
            self.precision,
            self.radix,
            words,
        ))
    }

    /// Truncated division by a machine word, producing enough words for
    /// `precision` digits (exact when the division terminates). Any
    /// non-zero divisor is accepted: each quotient word stays below the
    /// base because the running remainder stays below the divisor.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a zero divisor.
    #[allow(clippy::cast_possible_truncation)]
    pub fn divide_word(&self, d: u64, precision: u64) -> Result<Self, ApError> {
        let (bd, base) = base_digits(self.radix);
        if d == 0 {
            return Err(ApError::Domain("division by zero"));
        }
        if self.sign == 0 || d == 1 {
            return Ok(self.clone());
        }

        let out_words = if precision == INFINITE {
            self.data.len() + 1
        } else {
            (precision.div_ceil(u64::from(bd)) + 2) as usize
        }
        .max(self.data.len());

        let mut words = Vec::with_capacity(out_words);
        let mut rem = 0u128;
        for i in 0..out_words {
            let w = self.data.get(i).copied().unwrap_or(0);
            let cur = rem * u128::from(base) + u128::from(w);
            words.push((cur / u128::from(d)) as u64);
            rem = cur % u128::from(d);
            if rem == 0 && i >= self.data.len() - 1 {
                break;
            }
        }
        let precision = if precision == INFINITE && rem != 0 {
            // A non-terminating expansion cannot be exact.
            (out_words as u64) * u64::from(bd)
        } else {
            precision.min(self.precision)
        };
        Ok(Self::from_parts(
            self.sign,
            self.exponent,
            precision,
            self.radix,
            words,
        ))
    }

    /// Division via the Newton reciprocal.
    ///
    /// # Errors
    ///
    /// Domain for a zero divisor; Precision when both operands are exact
    /// and the expansion may not terminate.
    pub fn divide(&self, other: &Self) -> Result<Self, ApError> {
        crate::float_math::divide(self, other)
    }

    /// Remainder with the sign of `self`: `self - truncate(self/other) *
    /// other`.
    ///
    /// # Errors
    ///
    /// Domain for a zero divisor.
    pub fn modulo(&self, other: &Self) -> Result<Self, ApError> {
        if other.is_zero() {
            return Err(ApError::Domain("division by zero"));
        }
        if self.is_zero() {
            return Ok(Self::zero(self.radix));
        }
        let quotient = self.divide(other)?.truncate();
        self.subtract(&quotient.multiply(other)?)
    }

    /// Integer part, exact.
    #[must_use]
    pub fn truncate(&self) -> Self {
        if self.sign == 0 || self.exponent <= 0 {
            return Self::zero(self.radix);
        }
        let keep = (self.exponent as usize).min(self.data.len());
        Self::from_parts(
            self.sign,
            self.exponent,
            INFINITE,
            self.radix,
            self.data[..keep].to_vec(),
        )
    }

    /// Fractional part: `self - truncate(self)`, with the sign of `self`.
    #[must_use]
    pub fn frac(&self) -> Self {
        if self.sign == 0 || self.exponent >= self.data.len() as i64 {
            return Self::zero(self.radix);
        }
        if self.exponent <= 0 {
            return self.clone();
        }
        let skip = self.exponent as usize;
        Self::from_parts(
            self.sign,
            0,
            self.precision,
            self.radix,
            self.data[skip..].to_vec(),
        )
    }

    /// Number of leading digits this value shares with `other`: roughly
    /// `scale - scale(self - other)`. Returns the smaller precision when
    /// the values are equal.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn equal_digits(&self, other: &Self) -> Result<u64, ApError> {
        let diff = self.subtract(other)?;
        if diff.is_zero() {
            return Ok(self.precision.min(other.precision));
        }
        if self.sign != other.sign || self.is_zero() || other.is_zero() {
            return Ok(0);
        }
        let scale = self.scale().min(other.scale());
        let matched = i128::from(scale) - i128::from(diff.scale());
        Ok(u64::try_from(matched.max(0)).unwrap_or(0))
    }

    /// Leading mantissa and word exponent: the value is approximately
    /// `m * base^e` with `|m|` in `[1, base)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64_scaled(&self) -> (f64, i64) {
        if self.sign == 0 {
            return (0.0, 0);
        }
        let (_, base) = base_digits(self.radix);
        let base_f = base as f64;
        let mut m = 0.0;
        for i in (0..3.min(self.data.len())).rev() {
            m = m / base_f + self.data[i] as f64;
        }
        // When fewer than three words exist the loop still anchors at the
        // leading word.
        (m * f64::from(self.sign), self.exponent - 1)
    }

    /// Best-effort conversion to f64; overflows to infinity.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn to_f64(&self) -> f64 {
        let (m, e) = self.to_f64_scaled();
        if m == 0.0 {
            return 0.0;
        }
        let (_, base) = base_digits(self.radix);
        if e > 200 {
            return f64::INFINITY * m.signum();
        }
        if e < -200 {
            return 0.0;
        }
        m * (base as f64).powi(e as i32)
    }

    /// Build from a scaled double: `m * base^word_exp`. The precision is
    /// what a double justifies for the radix.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_f64_scaled(m: f64, mut word_exp: i64, radix: u32) -> Self {
        if m == 0.0 || !m.is_finite() {
            return Self::zero(radix);
        }
        let sign = if m < 0.0 { -1 } else { 1 };
        let (_, base) = base_digits(radix);
        let base_f = base as f64;
        let mut m = m.abs();
        while m >= base_f {
            m /= base_f;
            word_exp += 1;
        }
        while m < 1.0 {
            m *= base_f;
            word_exp -= 1;
        }
        let mut data = Vec::with_capacity(3);
        for _ in 0..3 {
            let w = m.floor();
            data.push(w as u64);
            m = (m - w) * base_f;
        }
        Self::from_parts(sign, word_exp + 1, double_digits(radix), radix, data)
    }

    /// Build from an ordinary double.
    #[must_use]
    pub fn from_f64(value: f64, radix: u32) -> Self {
        Self::from_f64_scaled(value, 0, radix)
    }

    /// Convert an integer value to i64.
    ///
    /// # Errors
    ///
    /// Overflow when the value does not fit.
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_i64(&self) -> Result<i64, ApError> {
        if self.sign == 0 {
            return Ok(0);
        }
        let (_, base) = base_digits(self.radix);
        if self.exponent < self.data.len() as i64 {
            return Err(ApError::Domain("not an integer"));
        }
        let mut acc = 0i128;
        for i in 0..self.exponent as usize {
            let w = self.data.get(i).copied().unwrap_or(0);
            acc = acc
                .checked_mul(i128::from(base))
                .and_then(|a| a.checked_add(i128::from(w)))
                .ok_or(ApError::Overflow)?;
            if acc > i128::from(i64::MAX) + 1 {
                return Err(ApError::Overflow);
            }
        }
        acc *= i128::from(self.sign);
        i64::try_from(acc).map_err(|_| ApError::Overflow)
    }

    /// Parse a number in the given radix. The precision defaults to the
    /// count of significant digits supplied; pass `Some(INFINITE)` for
    /// exact integers.
    ///
    /// # Errors
    ///
    /// Returns a domain error for malformed input.
    pub fn parse(input: &str, radix: u32, precision: Option<u64>) -> Result<Self, ApError> {
        let (bd, _) = base_digits(radix);
        let mut chars = input.trim().chars().peekable();
        let sign = match chars.peek() {
            Some('-') => {
                chars.next();
                -1
            }
            Some('+') => {
                chars.next();
                1
            }
            _ => 1,
        };

        let mut digits: Vec<u32> = Vec::new();
        let mut int_len: i64 = 0;
        let mut seen_point = false;
        let mut seen_digit = false;
        let mut exponent_shift: i64 = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '.' if !seen_point => {
                    seen_point = true;
                    chars.next();
                }
                'e' | 'E' if radix <= 14 && seen_digit => {
                    chars.next();
                    let rest: String = chars.by_ref().collect();
                    exponent_shift = rest
                        .parse::<i64>()
                        .map_err(|_| ApError::Domain("malformed exponent"))?;
                }
                _ => {
                    let d = c
                        .to_digit(radix)
                        .ok_or(ApError::Domain("invalid digit for radix"))?;
                    digits.push(d);
                    seen_digit = true;
                    if !seen_point {
                        int_len += 1;
                    }
                    chars.next();
                }
            }
        }
        if !seen_digit {
            return Err(ApError::Domain("no digits"));
        }

        // Significant window: drop leading and trailing zeros, tracking the
        // digit-level scale of the first significant digit.
        let leading = digits.iter().take_while(|&&d| d == 0).count();
        let scale = int_len - leading as i64 + exponent_shift;
        digits.drain(..leading);
        while digits.last() == Some(&0) {
            digits.pop();
        }
        if digits.is_empty() {
            return Ok(Self::zero(radix));
        }

        let significant = digits.len() as u64;
        // Word-align: the leading word holds the top r digits so that the
        // remaining digit stream falls on word boundaries.
        let word_exp = scale.div_euclid(i64::from(bd))
            + i64::from(scale.rem_euclid(i64::from(bd)) > 0);
        let r = scale - (word_exp - 1) * i64::from(bd);
        debug_assert!(r >= 1 && r <= i64::from(bd));

        let mut data = Vec::with_capacity(digits.len() / bd as usize + 2);
        let mut word = 0u64;
        let mut fill = u32::try_from(i64::from(bd) - r).expect("partial fill");
        for &d in &digits {
            word = word * u64::from(radix) + u64::from(d);
            fill += 1;
            if fill == bd {
                data.push(word);
                word = 0;
                fill = 0;
            }
        }
        if fill > 0 {
            word *= u64::from(radix).pow(bd - fill);
            data.push(word);
        }

        Ok(Self::from_parts(
            sign,
            word_exp,
            precision.unwrap_or(significant),
            radix,
            data,
        ))
    }

    /// Digit string of the mantissa, most significant first, without sign
    /// or point.
    fn mantissa_digits(&self) -> Vec<u32> {
        let (bd, _) = base_digits(self.radix);
        let mut out = Vec::with_capacity(self.data.len() * bd as usize);
        for (i, &w) in self.data.iter().enumerate() {
            let width = if i == 0 {
                digits_in(w, self.radix)
            } else {
                bd
            };
            let mut word_digits = vec![0u32; width as usize];
            let mut v = w;
            for slot in word_digits.iter_mut().rev() {
                *slot = (v % u64::from(self.radix)) as u32;
                v /= u64::from(self.radix);
            }
            out.extend(word_digits);
        }
        while out.last() == Some(&0) {
            out.pop();
        }
        out
    }
}

impl fmt::Display for Apfloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == 0 {
            return write!(f, "0");
        }
        if self.sign < 0 {
            write!(f, "-")?;
        }
        let digits = self.mantissa_digits();
        let scale = self.scale();
        let digit_char = |d: u32| char::from_digit(d, 36).expect("digit in radix range");

        if scale > 0 && (scale as usize) >= digits.len() {
            // Integer, possibly with trailing zeros.
            for &d in &digits {
                write!(f, "{}", digit_char(d))?;
            }
            for _ in digits.len()..scale as usize {
                write!(f, "0")?;
            }
        } else if scale > 0 {
            for (i, &d) in digits.iter().enumerate() {
                if i == scale as usize {
                    write!(f, ".")?;
                }
                write!(f, "{}", digit_char(d))?;
            }
        } else {
            write!(f, "0.")?;
            for _ in 0..(-scale) as usize {
                write!(f, "0")?;
            }
            for &d in &digits {
                write!(f, "{}", digit_char(d))?;
            }
        }
        Ok(())
    }
}

/// Significant digits in a word for the radix; at least one.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn digits_in(word: u64, radix: u32) -> u32 {
    let mut digits = 1;
    let mut v = word / u64::from(radix);
    while v > 0 {
        digits += 1;
        v /= u64::from(radix);
    }
    digits
}

/// Digit scale below which an operand's digits are unreliable.
fn reliable_low(x: &Apfloat) -> i128 {
    if x.precision == INFINITE {
        i128::MIN / 2
    } else {
        i128::from(x.scale()) - i128::from(x.precision)
    }
}

fn storage_from(digits: &[u64]) -> Result<DataStorage<LongLimb>, ApError> {
    let mut s = DataStorage::<LongLimb>::cached(digits.len());
    s.write_block(0, digits)?;
    Ok(s)
}

/// Magnitude addition of two non-zero values with a shared radix.
fn add_magnitudes(a: &Apfloat, b: &Apfloat) -> Apfloat {
    let (_, base) = base_digits(a.radix);
    let e = a.exponent.max(b.exponent);
    let low = (a.exponent - a.data.len() as i64).min(b.exponent - b.data.len() as i64);
    let len = (e - low) as usize;
    let mut out = vec![0u64; len + 1];

    // Place a directly; its words cannot collide with themselves.
    let off_a = (e - a.exponent) as usize + 1;
    out[off_a..off_a + a.data.len()].copy_from_slice(&a.data);

    // Add b with carry propagation toward the top.
    let off_b = (e - b.exponent) as usize + 1;
    let mut carry = 0u64;
    for j in (0..b.data.len()).rev() {
        let idx = off_b + j;
        let sum = out[idx] + b.data[j] + carry;
        out[idx] = sum % base;
        carry = sum / base;
    }
    let mut idx = off_b;
    while carry > 0 {
        idx -= 1;
        let sum = out[idx] + carry;
        out[idx] = sum % base;
        carry = sum / base;
    }

    Apfloat::from_parts(1, e + 1, INFINITE, a.radix, out)
}

/// Magnitude subtraction; `a` must have the strictly larger magnitude.
fn sub_magnitudes(a: &Apfloat, b: &Apfloat) -> Apfloat {
    let (_, base) = base_digits(a.radix);
    let e = a.exponent;
    let low = (a.exponent - a.data.len() as i64).min(b.exponent - b.data.len() as i64);
    let len = (e - low) as usize;
    let mut out = vec![0u64; len];

    let off_a = (e - a.exponent) as usize;
    out[off_a..off_a + a.data.len()].copy_from_slice(&a.data);

    let off_b = (e - b.exponent) as usize;
    let mut borrow = 0u64;
    for j in (0..b.data.len()).rev() {
        let idx = off_b + j;
        let sub = b.data[j] + borrow;
        if out[idx] >= sub {
            out[idx] -= sub;
            borrow = 0;
        } else {
            out[idx] += base - sub;
            borrow = 1;
        }
    }
    let mut idx = off_b;
    while borrow > 0 {
        idx -= 1;
        if out[idx] >= 1 {
            out[idx] -= 1;
            borrow = 0;
        } else {
            out[idx] = base - 1;
        }
    }

    Apfloat::from_parts(1, e, INFINITE, a.radix, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse10(s: &str) -> Apfloat {
        Apfloat::parse(s, 10, None).unwrap()
    }

    fn parse_exact(s: &str) -> Apfloat {
        Apfloat::parse(s, 10, Some(INFINITE)).unwrap()
    }

    #[test]
    fn parse_format_roundtrip() {
        for s in [
            "0",
            "1",
            "-1",
            "123456789",
            "123456789012345678901234567890",
            "0.5",
            "-0.001234",
            "123.456",
            "1000000000000000000",
            "3.14159265358979323846264338327950288",
        ] {
            assert_eq!(parse_exact(s).to_string(), s, "roundtrip {s}");
        }
    }

    #[test]
    fn parse_exponent_notation() {
        assert_eq!(parse_exact("1.5e3").to_string(), "1500");
        assert_eq!(parse_exact("25e-3").to_string(), "0.025");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Apfloat::parse("abc", 10, None).is_err());
        assert!(Apfloat::parse("", 10, None).is_err());
        assert!(Apfloat::parse("1.2.3", 10, None).is_err());
    }

    #[test]
    fn zero_invariants() {
        let zero = Apfloat::zero(10);
        assert_eq!(zero.signum(), 0);
        assert_eq!(zero.size(), 0);
        assert!(zero.is_zero());
        assert_eq!(parse_exact("0.000").to_string(), "0");
    }

    #[test]
    fn scale_values() {
        assert_eq!(parse_exact("1").scale(), 1);
        assert_eq!(parse_exact("9").scale(), 1);
        assert_eq!(parse_exact("10").scale(), 2);
        assert_eq!(parse_exact("123456789012345678901").scale(), 21);
        assert_eq!(parse_exact("0.5").scale(), 0);
        assert_eq!(parse_exact("0.05").scale(), -1);
    }

    #[test]
    fn add_and_subtract() {
        let a = parse_exact("999999999999999999999");
        let b = parse_exact("1");
        assert_eq!(a.add(&b).unwrap().to_string(), "1000000000000000000000");
        assert_eq!(
            a.subtract(&b).unwrap().to_string(),
            "999999999999999999998"
        );

        let x = parse_exact("123.5");
        let y = parse_exact("-23.25");
        assert_eq!(x.add(&y).unwrap().to_string(), "100.25");
        assert_eq!(y.add(&x).unwrap().to_string(), "100.25");
        assert_eq!(x.subtract(&x).unwrap().to_string(), "0");
    }

    #[test]
    fn add_across_word_gap() {
        // Operands whose words do not overlap at all.
        let a = parse_exact("1e40");
        let b = parse_exact("7");
        assert_eq!(
            a.add(&b).unwrap().to_string(),
            "10000000000000000000000000000000000000007"
        );
    }

    #[test]
    fn multiply_small_and_large() {
        let a = parse_exact("12345");
        let b = parse_exact("6789");
        assert_eq!(a.multiply(&b).unwrap().to_string(), "83810205");

        // Cross the single-word boundary.
        let c = parse_exact("999999999999999999");
        let d = parse_exact("2");
        assert_eq!(c.multiply(&d).unwrap().to_string(), "1999999999999999998");
    }

    #[test]
    fn multiply_signs_and_zero() {
        let a = parse_exact("-4");
        let b = parse_exact("25");
        assert_eq!(a.multiply(&b).unwrap().to_string(), "-100");
        assert_eq!(a.multiply(&Apfloat::zero(10)).unwrap().to_string(), "0");
    }

    #[test]
    fn multiply_fractions() {
        let a = parse_exact("0.5");
        let b = parse_exact("0.25");
        assert_eq!(a.multiply(&b).unwrap().to_string(), "0.125");
        let c = parse_exact("1.5");
        assert_eq!(c.multiply(&c).unwrap().to_string(), "2.25");
    }

    #[test]
    fn multiply_word_and_divide_word() {
        let a = parse_exact("999999999999999999999999");
        let doubled = a.multiply_word(2).unwrap();
        assert_eq!(doubled.to_string(), "1999999999999999999999998");
        assert_eq!(doubled.divide_word(2, INFINITE).unwrap().to_string(), a.to_string());

        let third = Apfloat::one(10).divide_word(3, 30).unwrap();
        let s = third.to_string();
        assert!(s.starts_with("0.33333333333333333333"), "{s}");
    }

    #[test]
    fn divide_and_modulo_methods() {
        let x = parse10("10.75");
        let y = parse10("2.5");
        let q = x.divide(&y).unwrap();
        assert!(q.to_string().starts_with("4.3"), "{q}");
        assert_eq!(x.modulo(&y).unwrap().to_string(), "0.75");
        let z = parse10("-10.75");
        assert_eq!(z.modulo(&y).unwrap().to_string(), "-0.75");
    }

    #[test]
    fn truncate_and_frac() {
        let x = parse_exact("12345.6789");
        assert_eq!(x.truncate().to_string(), "12345");
        assert_eq!(x.frac().to_string(), "0.6789");
        let y = parse_exact("-12345.6789");
        assert_eq!(y.truncate().to_string(), "-12345");
        assert_eq!(y.frac().to_string(), "-0.6789");
        assert_eq!(parse_exact("0.75").truncate().to_string(), "0");
        assert_eq!(parse_exact("42").frac().to_string(), "0");
    }

    #[test]
    fn compare_ordering() {
        let values = ["-100", "-1", "-0.5", "0", "0.25", "1", "99", "1e30"];
        for (i, &a) in values.iter().enumerate() {
            for (j, &b) in values.iter().enumerate() {
                let expected = i.cmp(&j);
                assert_eq!(
                    parse_exact(a).compare_to(&parse_exact(b)),
                    expected,
                    "{a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn equal_digits_counts_shared_prefix() {
        let a = parse10("1.23456789");
        let b = parse10("1.23456000");
        assert_eq!(a.equal_digits(&b).unwrap(), 6);
        assert_eq!(a.equal_digits(&a).unwrap(), 9);
        assert_eq!(
            parse10("5").equal_digits(&parse10("-5")).unwrap(),
            0
        );
    }

    #[test]
    fn precision_limits_stored_words() {
        let x = parse_exact("123456789012345678901234567890").with_precision(10);
        assert_eq!(x.precision(), 10);
        // ceil(10/18) + 1 = 2 words at most.
        assert!(x.size() <= 2);
        // The leading digits survive.
        assert!(x.to_string().starts_with("1234567890"));
    }

    #[test]
    fn f64_scaled_roundtrip() {
        let x = parse10("123456.789");
        let (m, e) = x.to_f64_scaled();
        let back = Apfloat::from_f64_scaled(m, e, 10);
        assert!(x.equal_digits(&back).unwrap() >= 14);

        assert!((parse10("0.125").to_f64() - 0.125).abs() < 1e-15);
        assert!((parse10("-2.5").to_f64() + 2.5).abs() < 1e-15);
    }

    #[test]
    fn scale_by_shifts_exponent() {
        let x = parse_exact("5");
        assert_eq!(x.scale_by(3).unwrap().to_string(), "5000");
        assert_eq!(x.scale_by(-2).unwrap().to_string(), "0.05");
        assert_eq!(x.scale_by(36).unwrap().scale(), 37);
    }

    #[test]
    fn to_i64_bounds() {
        assert_eq!(parse_exact("0").to_i64().unwrap(), 0);
        assert_eq!(parse_exact("-42").to_i64().unwrap(), -42);
        assert_eq!(
            parse_exact("9223372036854775807").to_i64().unwrap(),
            i64::MAX
        );
        assert!(parse_exact("9223372036854775808").to_i64().is_err());
        assert_eq!(
            parse_exact("-9223372036854775808").to_i64().unwrap(),
            i64::MIN
        );
    }
}
