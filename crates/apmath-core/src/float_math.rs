//! Transcendental and algebraic functions on real numbers.
//!
//! The workhorses are the quadratically convergent Newton iteration for
//! inverse roots (precision doubling from a double seed, with a final
//! precising iteration at full precision) and the AGM identity for the
//! logarithm; everything else reduces to those plus the convolution
//! multiply.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::apfloat::{
    base_digits, double_digits, extend_precision, Apfloat, EXTRA_PRECISION, INFINITE,
};
use crate::apint::Apint;
use crate::error::ApError;

/// `x^n` for `n >= 0` by binary exponentiation, at the operands' working
/// precision.
pub(crate) fn int_pow(x: &Apfloat, mut n: u64) -> Result<Apfloat, ApError> {
    let mut result = Apfloat::one(x.radix()).with_precision(x.precision());
    if n == 0 {
        return Ok(result);
    }
    let mut square = x.clone();
    // Square away trailing zero bits, multiplying into the result only for
    // set bits.
    while n > 1 {
        if n & 1 != 0 {
            result = result.multiply(&square)?;
        }
        square = square.multiply(&square)?;
        n >>= 1;
    }
    result.multiply(&square)
}

/// `x^(-1/n)` to the precision of `x`.
///
/// The seed comes from a rescaled double so operands with scales beyond
/// the double exponent range never overflow; Newton's update
/// `r <- r + r*(1 - x*r^n)/n` then doubles the precision each iteration,
/// with one final iteration run at the target precision to absorb
/// residual error.
///
/// # Errors
///
/// Domain for zero or an even root of a negative value; Precision for an
/// infinite-precision operand.
pub fn inverse_root(x: &Apfloat, n: i64) -> Result<Apfloat, ApError> {
    if n == 0 {
        return Err(ApError::Domain("zeroth root"));
    }
    if n < 0 {
        return Err(ApError::Domain("negative root order"));
    }
    if x.is_zero() {
        return Err(ApError::Domain("inverse root of zero"));
    }
    if x.signum() < 0 {
        if n % 2 == 0 {
            return Err(ApError::Domain("even root of a negative number"));
        }
        return Ok(inverse_root(&x.abs(), n)?.negate());
    }
    if x.precision() == INFINITE {
        return Err(ApError::Precision("inverse root of an exact value"));
    }

    let radix = x.radix();
    let target = x.precision();
    let n_u = n.unsigned_abs();

    // Seed: x ~ m * base^e, so x^(-1/n) ~ m^(-1/n) * base^(-e/n) with the
    // fractional part of the exponent folded into the double.
    let (m, e) = x.to_f64_scaled();
    let q = (-e).div_euclid(n);
    #[allow(clippy::cast_precision_loss)]
    let f = (-e).rem_euclid(n) as f64 / n as f64;
    let (_, base) = base_digits(radix);
    #[allow(clippy::cast_precision_loss)]
    let seed_m = m.powf(-1.0 / n as f64) * (base as f64).powf(f);
    let mut r = Apfloat::from_f64_scaled(seed_m, q, radix);

    let mut prec = double_digits(radix);
    let one = Apfloat::one(radix);
    let step = |r: &Apfloat, working: u64| -> Result<Apfloat, ApError> {
        let w = extend_precision(working, EXTRA_PRECISION);
        let r = r.with_precision(w);
        let xn = x.with_precision(w);
        let residual = one.subtract(&xn.multiply(&int_pow(&r, n_u)?)?)?;
        let correction = r.multiply(&residual)?.divide_word(n_u, w)?;
        Ok(r.add(&correction)?.with_precision(w))
    };

    while prec < target {
        prec = (2 * prec).min(target);
        r = step(&r, prec)?;
    }
    // Precising iteration at the final precision.
    r = step(&r, target)?;
    trace!(target, n, "inverse root converged");
    Ok(r.with_precision(target))
}

/// Square root via `x * x^(-1/2)`.
///
/// # Errors
///
/// Domain for negative input or Precision for exact input.
pub fn sqrt(x: &Apfloat) -> Result<Apfloat, ApError> {
    if x.is_zero() {
        return Ok(Apfloat::zero(x.radix()));
    }
    let precision = x.precision();
    let r = inverse_root(x, 2)?;
    Ok(x.multiply(&r)?.with_precision(precision))
}

/// Cube root via `x * (x^(-1/3))^2`, defined for all signs.
///
/// # Errors
///
/// Precision for exact input.
pub fn cbrt(x: &Apfloat) -> Result<Apfloat, ApError> {
    if x.is_zero() {
        return Ok(Apfloat::zero(x.radix()));
    }
    let precision = x.precision();
    let r = inverse_root(x, 3)?;
    Ok(x.multiply(&r.multiply(&r)?)?.with_precision(precision))
}

/// Division via the Newton reciprocal: `x * y^(-1)`.
///
/// # Errors
///
/// Domain for a zero divisor; Precision when both operands are exact
/// (the expansion may not terminate).
pub fn divide(x: &Apfloat, y: &Apfloat) -> Result<Apfloat, ApError> {
    if y.is_zero() {
        return Err(ApError::Domain("division by zero"));
    }
    if x.is_zero() {
        return Ok(Apfloat::zero(x.radix()));
    }
    let target = x.precision().min(y.precision());
    if target == INFINITE {
        return Err(ApError::Precision("division of exact values"));
    }
    let working = extend_precision(target, EXTRA_PRECISION);
    let inverse = inverse_root(&y.with_precision(working), 1)?;
    Ok(x.multiply(&inverse)?.with_precision(target))
}

/// Arithmetic-geometric mean of two non-negative values, iterating
/// `(a, b) <- ((a+b)/2, sqrt(a*b))` until the halves agree to half the
/// working precision; one more iteration then doubles that to full.
///
/// # Errors
///
/// Domain for negative input; Precision when both operands are exact.
pub fn agm(a: &Apfloat, b: &Apfloat) -> Result<Apfloat, ApError> {
    if a.signum() < 0 || b.signum() < 0 {
        return Err(ApError::Domain("agm of a negative number"));
    }
    if a.is_zero() || b.is_zero() {
        return Ok(Apfloat::zero(a.radix()));
    }
    let target = a.precision().min(b.precision());
    if target == INFINITE {
        return Err(ApError::Precision("agm of exact values"));
    }
    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    let mut x = a.with_precision(working);
    let mut y = b.with_precision(working);
    // Quadratic convergence: the digit count doubles per round, so the
    // bound is generous.
    let max_rounds = 64 + working.ilog2() as u64;
    for _ in 0..max_rounds {
        let mean = x.add(&y)?.divide_word(2, working)?;
        let geometric = sqrt(&x.multiply(&y)?.with_precision(working))?;
        let converged = mean.equal_digits(&geometric)? >= working / 2;
        x = mean;
        y = geometric;
        if converged {
            return Ok(x.add(&y)?.divide_word(2, working)?.with_precision(target));
        }
    }
    Err(ApError::LossOfAccuracy)
}

static LOG_RADIX_CACHE: Mutex<Option<HashMap<u32, Apfloat>>> = Mutex::new(None);
static PI_CACHE: Mutex<Option<HashMap<u32, Apfloat>>> = Mutex::new(None);

fn cached(
    cache: &Mutex<Option<HashMap<u32, Apfloat>>>,
    radix: u32,
    precision: u64,
    compute: impl FnOnce(u64) -> Result<Apfloat, ApError>,
) -> Result<Apfloat, ApError> {
    {
        let guard = cache.lock();
        if let Some(value) = guard.as_ref().and_then(|map| map.get(&radix)) {
            if value.precision() >= precision {
                return Ok(value.with_precision(precision));
            }
        }
    }
    let value = compute(precision)?;
    let mut guard = cache.lock();
    guard
        .get_or_insert_with(HashMap::new)
        .insert(radix, value.clone());
    Ok(value)
}

/// Pi to `precision` digits by Chudnovsky binary splitting, cached per
/// radix.
///
/// # Errors
///
/// Propagates storage failures from the exact integer arithmetic.
pub fn pi(precision: u64, radix: u32) -> Result<Apfloat, ApError> {
    cached(&PI_CACHE, radix, precision, |precision| {
        let working = extend_precision(precision, 2 * EXTRA_PRECISION);
        // Each series term contributes ~14.18 decimal digits; rescale for
        // other radices through the digit ratio.
        let decimal_digits =
            (working as f64 * f64::from(radix).log10()).ceil().max(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let terms = (decimal_digits / 14.18).ceil() as i64 + 2;

        let (_, q, t) = chudnovsky_split(0, terms, radix)?;
        // pi = 426880 * sqrt(10005) * Q / T.
        let root = sqrt(&Apfloat::from_u64(10_005, radix).with_precision(working))?;
        let numerator = q
            .to_float(working)
            .multiply_word(426_880)?
            .multiply(&root)?;
        divide(&numerator, &t.to_float(working))
    })
}

/// Binary splitting for the Chudnovsky series: returns (P, Q, T) over
/// `[a, b)`.
fn chudnovsky_split(a: i64, b: i64, radix: u32) -> Result<(Apint, Apint, Apint), ApError> {
    if b - a == 1 {
        let (p, q) = if a == 0 {
            (Apint::one(radix), Apint::one(radix))
        } else {
            let p = Apint::from_i64(6 * a - 5, radix)
                .multiply(&Apint::from_i64(2 * a - 1, radix))?
                .multiply(&Apint::from_i64(6 * a - 1, radix))?;
            // a^3 * 640320^3 / 24
            let a_int = Apint::from_i64(a, radix);
            let q = a_int
                .multiply(&a_int)?
                .multiply(&a_int)?
                .multiply(&Apint::from_i64(10_939_058_860_032_000, radix))?;
            (p, q)
        };
        let mut t = p.multiply(
            &Apint::from_i64(13_591_409, radix)
                .add(&Apint::from_i64(545_140_134, radix).multiply(&Apint::from_i64(a, radix))?)?,
        )?;
        if a % 2 != 0 {
            t = t.negate();
        }
        Ok((p, q, t))
    } else {
        let m = (a + b) / 2;
        let (p1, q1, t1) = chudnovsky_split(a, m, radix)?;
        let (p2, q2, t2) = chudnovsky_split(m, b, radix)?;
        let p = p1.multiply(&p2)?;
        let q = q1.multiply(&q2)?;
        let t = t1.multiply(&q2)?.add(&p1.multiply(&t2)?)?;
        Ok((p, q, t))
    }
}

/// `log(radix)` to `precision` digits, cached per radix.
pub(crate) fn log_radix(precision: u64, radix: u32) -> Result<Apfloat, ApError> {
    cached(&LOG_RADIX_CACHE, radix, precision, |precision| {
        let working = extend_precision(precision, 2 * EXTRA_PRECISION);
        // log(radix^m) = m*log(radix) through the AGM identity, with m
        // large enough that the O(s^-2) error is below the precision.
        let m = i64::try_from(working / 2 + 2 * EXTRA_PRECISION).map_err(|_| ApError::Overflow)?;
        let s = Apfloat::one(radix).with_precision(working).scale_by(m)?;
        raw_agm_log(&s, working)?
            .divide_word(m.unsigned_abs(), working)
            .map(|v| v.with_precision(precision))
    })
}

/// `log(s)` for large `s` by the AGM identity `pi / (2*agm(1, 4/s))`.
/// The caller guarantees `scale(s)` is large enough for the error term.
fn raw_agm_log(s: &Apfloat, working: u64) -> Result<Apfloat, ApError> {
    let radix = s.radix();
    let four = Apfloat::from_u64(4, radix).with_precision(working);
    let b = divide(&four, s)?;
    let one = Apfloat::one(radix).with_precision(working);
    let denominator = agm(&one, &b)?.multiply_word(2)?;
    divide(&pi(working, radix)?, &denominator)
}

/// Natural logarithm.
///
/// The argument is scaled by `radix^n` so the AGM identity applies, then
/// corrected by `n*log(radix)`.
///
/// # Errors
///
/// Domain for non-positive input; Precision for an exact operand.
pub fn log(x: &Apfloat) -> Result<Apfloat, ApError> {
    if x.signum() <= 0 {
        return Err(ApError::Domain("logarithm of a non-positive number"));
    }
    let radix = x.radix();
    let target = x.precision();
    if target == INFINITE {
        return Err(ApError::Precision("logarithm of an exact value"));
    }
    let one = Apfloat::one(radix);
    if x.compare_to(&one) == std::cmp::Ordering::Equal {
        return Ok(Apfloat::zero(radix));
    }
    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    // Shift so that scale(s) comfortably exceeds working/2.
    let shift = i64::try_from(working / 2 + 2 * EXTRA_PRECISION).map_err(|_| ApError::Overflow)?
        - x.scale().min(0);
    let s = x.with_precision(working).scale_by(shift)?;
    let log_s = raw_agm_log(&s, working)?;
    let correction = log_radix(working, radix)?.multiply(&Apfloat::from_i64(shift, radix))?;
    log_s
        .subtract(&correction)
        .map(|v| v.with_precision(target))
}

/// Exponential function by Newton iteration on `w -> log(w) = x`.
///
/// # Errors
///
/// Overflow when the result exponent exceeds the representable range;
/// LossOfAccuracy when the operand's precision cannot pin any digit of
/// the result; Precision for an exact operand.
pub fn exp(x: &Apfloat) -> Result<Apfloat, ApError> {
    let radix = x.radix();
    if x.is_zero() {
        return Ok(Apfloat::one(radix));
    }
    let target = x.precision();
    if target == INFINITE {
        return Err(ApError::Precision("exponential of an exact value"));
    }
    // Result scale is x/log(radix) digits; reject what an i64 exponent
    // cannot hold.
    let xd = x.to_f64();
    #[allow(clippy::cast_precision_loss)]
    let limit = (i64::MAX / 2) as f64 * f64::from(radix).ln();
    if xd >= limit {
        return Err(ApError::Overflow);
    }
    if xd <= -limit {
        return Err(ApError::LossOfAccuracy);
    }
    if x.scale() > 0 && u64::try_from(x.scale()).unwrap_or(u64::MAX) > target {
        // The integer part alone exhausts the precision; no digit of the
        // result is determined.
        return Err(ApError::LossOfAccuracy);
    }

    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    // Argument reduction: x = i*log(radix) + f with |f| <= log(radix), so
    // exp(x) = exp(f) * radix^i and the seed double never overflows.
    #[allow(clippy::cast_possible_truncation)]
    let i = (xd / f64::from(radix).ln()).trunc() as i64;
    let i_digits = u64::from(64 - i.unsigned_abs().leading_zeros()).max(1);
    let lnb = log_radix(extend_precision(working, i_digits), radix)?;
    let f = x
        .with_precision(working)
        .subtract(&lnb.multiply(&Apfloat::from_i64(i, radix))?)?;

    let seed = Apfloat::from_f64(f.to_f64().exp(), radix).scale_by(i)?;

    let mut w = seed;
    let mut prec = double_digits(radix);
    let one = Apfloat::one(radix);
    let step = |w: &Apfloat, working: u64| -> Result<Apfloat, ApError> {
        let p = extend_precision(working, EXTRA_PRECISION);
        let wp = w.with_precision(p);
        let delta = x.with_precision(p).subtract(&log(&wp)?)?.add(&one)?;
        wp.multiply(&delta)
    };
    while prec < target {
        prec = (2 * prec).min(target);
        w = step(&w, prec)?;
    }
    w = step(&w, target)?;
    Ok(w.with_precision(target))
}

/// `x^y = exp(y*log(x))`, with fast paths for integral exponents.
///
/// # Errors
///
/// ZeroToZero for `0^0`; Domain for a negative base with a non-integral
/// exponent or `0^negative`.
pub fn pow(x: &Apfloat, y: &Apfloat) -> Result<Apfloat, ApError> {
    let radix = x.radix();
    if y.is_zero() {
        if x.is_zero() {
            return Err(ApError::ZeroToZero);
        }
        return Ok(Apfloat::one(radix));
    }
    if x.is_zero() {
        if y.signum() < 0 {
            return Err(ApError::Domain("zero to a negative power"));
        }
        return Ok(Apfloat::zero(radix));
    }

    // Integral exponents go through binary exponentiation, which also
    // covers negative bases.
    if y.frac().is_zero() {
        if let Ok(n) = y.to_i64() {
            let target = x.precision().min(extend_precision(y.precision(), 0));
            let base = x.with_precision(extend_precision(target, EXTRA_PRECISION));
            let powered = int_pow(&base, n.unsigned_abs())?;
            let result = if n < 0 {
                divide(&Apfloat::one(radix).with_precision(powered.precision()), &powered)?
            } else {
                powered
            };
            return Ok(result.with_precision(target));
        }
    }

    if x.signum() < 0 {
        return Err(ApError::Domain(
            "negative base with a non-integral exponent",
        ));
    }
    let target = x.precision().min(y.precision());
    if target == INFINITE {
        return Err(ApError::Precision("power of exact values"));
    }
    let working = extend_precision(target, EXTRA_PRECISION);
    let product = y
        .with_precision(working)
        .multiply(&log(&x.with_precision(working))?)?;
    Ok(exp(&product)?.with_precision(target))
}

fn as_complex(x: &Apfloat) -> crate::apcomplex::Apcomplex {
    crate::apcomplex::Apcomplex::from_real(x.clone())
}

/// Real sine, through the complex exponential.
///
/// # Errors
///
/// As for the complex version.
pub fn sin(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::sin(&as_complex(x))?.real().clone())
}

/// Real cosine, through the complex exponential.
///
/// # Errors
///
/// As for the complex version.
pub fn cos(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::cos(&as_complex(x))?.real().clone())
}

/// Real tangent.
///
/// # Errors
///
/// As for the complex version.
pub fn tan(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::tan(&as_complex(x))?.real().clone())
}

/// Real hyperbolic sine.
///
/// # Errors
///
/// As for the complex version.
pub fn sinh(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::sinh(&as_complex(x))?.real().clone())
}

/// Real hyperbolic cosine.
///
/// # Errors
///
/// As for the complex version.
pub fn cosh(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::cosh(&as_complex(x))?.real().clone())
}

/// Real hyperbolic tangent.
///
/// # Errors
///
/// As for the complex version.
pub fn tanh(x: &Apfloat) -> Result<Apfloat, ApError> {
    Ok(crate::complex_math::tanh(&as_complex(x))?.real().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(s: &str, precision: u64) -> Apfloat {
        Apfloat::parse(s, 10, Some(precision)).unwrap()
    }

    fn assert_digits(value: &Apfloat, expected: &str, digits: u64) {
        let reference = Apfloat::parse(expected, 10, Some(digits + 10)).unwrap();
        let matched = value.equal_digits(&reference).unwrap();
        assert!(
            matched >= digits,
            "only {matched} digits match: {value} vs {expected}"
        );
    }

    #[test]
    fn inverse_root_of_four() {
        let x = f("4", 40);
        assert_digits(&inverse_root(&x, 2).unwrap(), "0.5", 39);
    }

    #[test]
    fn inverse_root_of_five_cubed() {
        let x = f("5", 50);
        assert_digits(
            &inverse_root(&x, 3).unwrap(),
            "0.584803547642573213101357472027584555706099727020206008284515",
            48,
        );
    }

    #[test]
    fn inverse_root_domain_errors() {
        assert!(matches!(
            inverse_root(&f("0", 30), 2),
            Err(ApError::Domain(_))
        ));
        assert!(matches!(
            inverse_root(&f("-4", 30), 2),
            Err(ApError::Domain(_))
        ));
        let exact = Apfloat::parse("4", 10, Some(INFINITE)).unwrap();
        assert!(matches!(
            inverse_root(&exact, 2),
            Err(ApError::Precision(_))
        ));
    }

    #[test]
    fn inverse_root_odd_of_negative() {
        let x = f("-8", 30);
        assert_digits(&inverse_root(&x, 3).unwrap(), "-0.5", 29);
    }

    #[test]
    fn sqrt_two() {
        assert_digits(
            &sqrt(&f("2", 50)).unwrap(),
            "1.41421356237309504880168872420969807856967187537694807317668",
            49,
        );
    }

    #[test]
    fn sqrt_of_large_scale_operand() {
        // Scale differences beyond what a double exponent could hold.
        let x = f("1e400", 30);
        let root = sqrt(&x).unwrap();
        assert_eq!(root.scale(), 201);
        assert_digits(&root, "1e200", 29);
    }

    #[test]
    fn cbrt_signed() {
        assert_digits(&cbrt(&f("27", 30)).unwrap(), "3", 29);
        assert_digits(&cbrt(&f("-27", 30)).unwrap(), "-3", 29);
    }

    #[test]
    fn divide_basic() {
        let q = divide(&f("1", 40), &f("3", 40)).unwrap();
        assert_digits(&q, "0.33333333333333333333333333333333333333333333", 39);
        let q = divide(&f("355", 40), &f("113", 40)).unwrap();
        assert_digits(&q, "3.14159292035398230088495575221238938053097345", 39);
    }

    #[test]
    fn agm_known_value_and_symmetry() {
        let a = f("1", 45);
        let b = f("2", 45);
        let expected = "1.45679103104690686918643238326508197497386394322130559079417";
        assert_digits(&agm(&a, &b).unwrap(), expected, 43);
        assert_digits(&agm(&b, &a).unwrap(), expected, 43);
    }

    #[test]
    fn pi_digits() {
        assert_digits(
            &pi(50, 10).unwrap(),
            "3.14159265358979323846264338327950288419716939937510582097494",
            50,
        );
    }

    #[test]
    fn log_known_values() {
        assert_digits(
            &log(&f("2", 50)).unwrap(),
            "0.69314718055994530941723212145817656807550013436025525412068",
            48,
        );
        assert_digits(
            &log(&f("2.25", 40)).unwrap(),
            "0.810930216216328763956026230928698273143980846924988395228029",
            38,
        );
        // An argument below one exercises the negative-scale shift.
        assert_digits(
            &log(&f("0.5", 40)).unwrap(),
            "-0.69314718055994530941723212145817656807550013436025525412068",
            38,
        );
    }

    #[test]
    fn exp_known_values() {
        assert_digits(
            &exp(&f("1", 50)).unwrap(),
            "2.71828182845904523536028747135266249775724709369995957496697",
            48,
        );
        assert_digits(
            &exp(&f("1.5", 50)).unwrap(),
            "4.48168907033806482260205546011927581900574986836966705677265",
            48,
        );
        assert_digits(&exp(&f("0", 30)).unwrap(), "1", 29);
        // Negative argument: exp(-1) = 1/e.
        assert_digits(
            &exp(&f("-1", 40)).unwrap(),
            "0.36787944117144232159552377016146086744581113103176783450783",
            38,
        );
    }

    #[test]
    fn real_trig_wrappers() {
        let x = f("1", 40);
        assert_digits(
            &sin(&x).unwrap(),
            "0.841470984807896506652502321630298999622563060798371065672752",
            36,
        );
        assert_digits(
            &cos(&x).unwrap(),
            "0.540302305868139717400936607442976603732310420617922227670097",
            36,
        );
        assert_digits(
            &tanh(&x).unwrap(),
            "0.761594155955764888119458282604793590412768597257936551596811",
            36,
        );
    }

    #[test]
    fn exp_log_roundtrip() {
        let x = f("1.5", 50);
        let roundtrip = log(&exp(&x).unwrap()).unwrap();
        assert_digits(&roundtrip, "1.5", 49);
    }

    #[test]
    fn exp_overflow_and_loss() {
        // The result exponent cannot be represented.
        let huge = f("1e30", 40);
        assert!(matches!(exp(&huge), Err(ApError::Overflow)));
        // Representable, but precision 10 cannot pin any fractional digit
        // of exp(1e15).
        let wide_scale = f("1e15", 10);
        assert!(matches!(exp(&wide_scale), Err(ApError::LossOfAccuracy)));
        let wide = f("123456789", 40);
        // Scale 9 < precision 40: representable, just large.
        let result = exp(&wide).unwrap();
        assert!(result.scale() > 53_000_000);
    }

    #[test]
    fn pow_paths() {
        assert_digits(
            &pow(&f("2", 45), &f("1.5", 45)).unwrap(),
            "2.82842712474619009760337744841939615713934375075389614635336",
            43,
        );
        assert_digits(&pow(&f("2", 30), &f("10", 30)).unwrap(), "1024", 29);
        assert_digits(&pow(&f("-2", 30), &f("3", 30)).unwrap(), "-8", 29);
        assert_digits(&pow(&f("2", 30), &f("-2", 30)).unwrap(), "0.25", 29);
        assert!(matches!(
            pow(&f("0", 30), &f("0", 30)),
            Err(ApError::ZeroToZero)
        ));
        assert!(matches!(
            pow(&f("-2", 30), &f("0.5", 30)),
            Err(ApError::Domain(_))
        ));
    }
}
