//! Transcendental functions on complex numbers.
//!
//! The same Newton/AGM machinery as the real layer, run on complex
//! arithmetic. Seeds come from rescaled doubles in three regimes (real
//! part dominant, imaginary part dominant, comparable) so no extreme
//! scale difference can overflow the double range. Trigonometric and
//! hyperbolic functions reduce to the exponential, with parity identities
//! choosing the numerically stable half-plane first.

use std::f64::consts::PI;

use crate::apcomplex::{halve_over_i, require_finite, Apcomplex};
use crate::apfloat::{
    base_digits, double_digits, extend_precision, Apfloat, EXTRA_PRECISION,
};
use crate::apint::Apint;
use crate::error::ApError;
use crate::float_math;

/// `z^n` for `n >= 0` by binary exponentiation.
pub(crate) fn int_pow(z: &Apcomplex, mut n: u64) -> Result<Apcomplex, ApError> {
    let mut result = Apcomplex::one(z.radix()).with_precision(z.precision());
    if n == 0 {
        return Ok(result);
    }
    let mut square = z.clone();
    while n > 1 {
        if n & 1 != 0 {
            result = result.multiply(&square)?;
        }
        square = square.multiply(&square)?;
        n >>= 1;
    }
    result.multiply(&square)
}

/// Word-exponent gap beyond which the smaller part vanishes in a double.
const REGIME_GAP: i64 = 3;

/// Polar double approximation: `(magnitude, angle, word_exponent)` with
/// the magnitude scaled into the double range.
fn seed_polar(z: &Apcomplex) -> (f64, f64, i64) {
    let (ar, er) = z.real().to_f64_scaled();
    let (ai, ei) = z.imag().to_f64_scaled();

    if z.imag().is_zero() || (!z.real().is_zero() && er - ei > REGIME_GAP) {
        // The real part dominates; the angle collapses onto the real axis.
        let angle = if ar >= 0.0 {
            0.0
        } else if z.imag().signum() < 0 {
            -PI
        } else {
            PI
        };
        (ar.abs(), angle, er)
    } else if z.real().is_zero() || ei - er > REGIME_GAP {
        // The imaginary part dominates.
        let angle = if ai >= 0.0 { PI / 2.0 } else { -PI / 2.0 };
        (ai.abs(), angle, ei)
    } else {
        // Comparable: align both on the larger word exponent.
        let (_, base) = base_digits(z.radix());
        #[allow(clippy::cast_precision_loss)]
        let base_f = base as f64;
        let e = er.max(ei);
        #[allow(clippy::cast_possible_truncation)]
        let mr = ar * base_f.powi((er - e) as i32);
        #[allow(clippy::cast_possible_truncation)]
        let mi = ai * base_f.powi((ei - e) as i32);
        (mr.hypot(mi), mi.atan2(mr), e)
    }
}

/// `z^(-1/n)` to the precision of `z`, on the principal branch.
///
/// # Errors
///
/// Domain for zero input or a non-positive root order; Precision for an
/// exact operand.
pub fn inverse_root(z: &Apcomplex, n: i64) -> Result<Apcomplex, ApError> {
    if n == 0 {
        return Err(ApError::Domain("zeroth root"));
    }
    if n < 0 {
        return Err(ApError::Domain("negative root order"));
    }
    if z.is_zero() {
        return Err(ApError::Domain("inverse root of zero"));
    }
    if z.imag().is_zero() && z.real().signum() > 0 {
        return Ok(Apcomplex::from_real(float_math::inverse_root(z.real(), n)?));
    }
    let radix = z.radix();
    let target = require_finite(z.precision())?;
    let n_u = n.unsigned_abs();

    let (mag, angle, e) = seed_polar(z);
    let q = (-e).div_euclid(n);
    #[allow(clippy::cast_precision_loss)]
    let f = (-e).rem_euclid(n) as f64 / n as f64;
    let (_, base) = base_digits(radix);
    #[allow(clippy::cast_precision_loss)]
    let s = mag.powf(-1.0 / n as f64) * (base as f64).powf(f);
    #[allow(clippy::cast_precision_loss)]
    let angle_r = -angle / n as f64;
    let mut r = Apcomplex::new(
        Apfloat::from_f64_scaled(s * angle_r.cos(), q, radix),
        Apfloat::from_f64_scaled(s * angle_r.sin(), q, radix),
    );

    let one = Apcomplex::one(radix);
    let step = |r: &Apcomplex, working: u64| -> Result<Apcomplex, ApError> {
        let w = extend_precision(working, EXTRA_PRECISION);
        let rp = r.with_precision(w);
        let zp = z.with_precision(w);
        let residual = one.subtract(&zp.multiply(&int_pow(&rp, n_u)?)?)?;
        rp.add(&rp.multiply(&residual)?.divide_word(n_u, w)?)
    };
    let mut prec = double_digits(radix);
    while prec < target {
        prec = (2 * prec).min(target);
        r = step(&r, prec)?;
    }
    r = step(&r, target)?;
    Ok(r.with_precision(target))
}

/// Principal square root via `z * z^(-1/2)`.
///
/// # Errors
///
/// Precision for an exact operand.
pub fn sqrt(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.is_zero() {
        return Ok(Apcomplex::zero(z.radix()));
    }
    let precision = z.precision();
    let r = inverse_root(z, 2)?;
    Ok(z.multiply(&r)?.with_precision(precision))
}

/// Complex arithmetic-geometric mean. Converges for operands off the
/// negative real axis; the logarithm only feeds it values with a
/// non-negative real part.
///
/// # Errors
///
/// Precision for exact operands; LossOfAccuracy if the iteration fails to
/// settle.
pub fn agm(a: &Apcomplex, b: &Apcomplex) -> Result<Apcomplex, ApError> {
    if a.is_zero() || b.is_zero() {
        return Ok(Apcomplex::zero(a.radix()));
    }
    let target = require_finite(a.precision().min(b.precision()))?;
    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    let mut x = a.with_precision(working);
    let mut y = b.with_precision(working);
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

/// Principal natural logarithm.
///
/// The argument is first reflected into the right half-plane (adding the
/// `+/-pi*i` bias) to stay clear of the branch cut, then scaled by
/// `radix^n` for the AGM identity.
///
/// # Errors
///
/// Domain for zero; Precision for an exact operand.
pub fn log(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.is_zero() {
        return Err(ApError::Domain("logarithm of zero"));
    }
    let radix = z.radix();
    if z.imag().is_zero() && z.real().signum() > 0 {
        return Ok(Apcomplex::from_real(float_math::log(z.real())?));
    }
    let target = require_finite(z.precision())?;
    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    if z.real().signum() < 0 {
        // log(z) = log(-z) +/- pi*i, keeping the principal branch.
        let reflected = log(&z.negate().with_precision(working))?;
        let mut bias = float_math::pi(working, radix)?;
        if z.imag().signum() < 0 {
            bias = bias.negate();
        }
        let result = reflected.add(&Apcomplex::new(Apfloat::zero(radix), bias))?;
        return Ok(result.with_precision(target));
    }

    let shift = i64::try_from(working / 2 + 2 * EXTRA_PRECISION).map_err(|_| ApError::Overflow)?
        - z.scale().min(0);
    let s = Apcomplex::new(
        z.real().with_precision(working).scale_by(shift)?,
        z.imag().with_precision(working).scale_by(shift)?,
    );

    let four = Apcomplex::from_real(Apfloat::from_u64(4, radix).with_precision(working));
    let b = four.divide(&s)?;
    let one = Apcomplex::one(radix).with_precision(working);
    let denominator = agm(&one, &b)?.multiply_word(2)?;
    let log_s = Apcomplex::from_real(float_math::pi(working, radix)?).divide(&denominator)?;

    let correction = float_math::log_radix(working, radix)?
        .multiply(&Apfloat::from_i64(shift, radix))?;
    let result = log_s.subtract(&Apcomplex::from_real(correction))?;
    Ok(result.with_precision(target))
}

/// Complex exponential by Newton iteration on the logarithm.
///
/// The imaginary part is reduced into `(-pi/2, pi/2]` by subtracting a
/// multiple of pi (restoring the sign afterward), so the Newton iterate
/// stays in the right half-plane where the principal logarithm is smooth.
///
/// # Errors
///
/// Overflow / LossOfAccuracy as for the real exponential; Precision for
/// an exact operand.
pub fn exp(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    let radix = z.radix();
    if z.imag().is_zero() {
        return Ok(Apcomplex::from_real(float_math::exp(z.real())?));
    }
    let target = require_finite(z.precision())?;
    let working = extend_precision(target, 2 * EXTRA_PRECISION);

    // Multiple of pi to remove from the imaginary part.
    let im_d = z.imag().to_f64();
    if !im_d.is_finite() {
        return Err(ApError::LossOfAccuracy);
    }
    let k_f = (im_d / PI).abs();
    let half = Apfloat::one(radix).divide_word(2, double_digits(radix))?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let k_digits = k_f.log10().max(0.0) as u64 + EXTRA_PRECISION;
    let pi_w = float_math::pi(extend_precision(working, k_digits), radix)?;
    let ratio = float_math::divide(
        &z.imag().with_precision(extend_precision(working, k_digits)),
        &pi_w,
    )?;
    let rounded = if ratio.signum() < 0 {
        ratio.subtract(&half)?
    } else {
        ratio.add(&half)?
    };
    let k = Apint::from_float_truncated(&rounded);
    let parity = k.abs().div_rem_word(2)?.1;

    let im_red = z
        .imag()
        .with_precision(extend_precision(working, k_digits))
        .subtract(&k.to_float(extend_precision(working, k_digits)).multiply(&pi_w)?)?;
    let z_red = Apcomplex::new(z.real().with_precision(working), im_red.clone());

    // Seed from doubles: exp(re) through the radix split, rotated by the
    // reduced angle.
    let re_d = z.real().to_f64();
    #[allow(clippy::cast_precision_loss)]
    let limit = (i64::MAX / 2) as f64 * f64::from(radix).ln();
    if re_d >= limit {
        return Err(ApError::Overflow);
    }
    if re_d <= -limit {
        return Err(ApError::LossOfAccuracy);
    }
    #[allow(clippy::cast_possible_truncation)]
    let i_part = (re_d / f64::from(radix).ln()).trunc() as i64;
    let i_digits = u64::from(64 - i_part.unsigned_abs().leading_zeros()).max(1);
    let lnb = float_math::log_radix(extend_precision(working, i_digits), radix)?;
    let f = z
        .real()
        .with_precision(working)
        .subtract(&lnb.multiply(&Apfloat::from_i64(i_part, radix))?)?;
    let (ef, imf) = (f.to_f64().exp(), im_red.to_f64());
    let seed = Apcomplex::new(
        Apfloat::from_f64(ef * imf.cos(), radix).scale_by(i_part)?,
        Apfloat::from_f64(ef * imf.sin(), radix).scale_by(i_part)?,
    );

    let one = Apcomplex::one(radix);
    let step = |w: &Apcomplex, working: u64| -> Result<Apcomplex, ApError> {
        let p = extend_precision(working, EXTRA_PRECISION);
        let wp = w.with_precision(p);
        let delta = z_red
            .with_precision(p)
            .subtract(&log(&wp)?)?
            .add(&one)?;
        wp.multiply(&delta)
    };
    let mut w = seed;
    let mut prec = double_digits(radix);
    while prec < target {
        prec = (2 * prec).min(target);
        w = step(&w, prec)?;
    }
    w = step(&w, target)?;

    // exp(z) = exp(z - k*pi*i) * (-1)^k.
    if parity != 0 {
        w = w.negate();
    }
    Ok(w.with_precision(target))
}

/// `z^w = exp(w*log(z))`, with a binary-exponentiation fast path for
/// integral exponents.
///
/// # Errors
///
/// ZeroToZero for `0^0`; Domain for `0` to a negative or non-real power.
pub fn pow(z: &Apcomplex, w: &Apcomplex) -> Result<Apcomplex, ApError> {
    let radix = z.radix();
    if w.is_zero() {
        if z.is_zero() {
            return Err(ApError::ZeroToZero);
        }
        return Ok(Apcomplex::one(radix));
    }
    if z.is_zero() {
        if w.imag().is_zero() && w.real().signum() > 0 {
            return Ok(Apcomplex::zero(radix));
        }
        return Err(ApError::Domain("zero base"));
    }

    if w.imag().is_zero() && w.real().frac().is_zero() {
        if let Ok(n) = w.real().to_i64() {
            let target = z.precision();
            let base = z.with_precision(extend_precision(target, EXTRA_PRECISION));
            let powered = int_pow(&base, n.unsigned_abs())?;
            let result = if n < 0 {
                Apcomplex::one(radix)
                    .with_precision(powered.precision())
                    .divide(&powered)?
            } else {
                powered
            };
            return Ok(result.with_precision(target));
        }
    }

    let target = require_finite(z.precision().min(w.precision()))?;
    let working = extend_precision(target, EXTRA_PRECISION);
    let product = w.with_precision(working).multiply(&log(&z.with_precision(working))?)?;
    Ok(exp(&product)?.with_precision(target))
}

/// Sine: `(e^(iz) - e^(-iz)) / 2i`.
///
/// # Errors
///
/// Precision for an exact operand; Overflow for operands whose
/// exponential leaves the representable range.
pub fn sin(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.imag().signum() < 0 {
        // Odd function; flip into the half-plane where e^(iz) stays small.
        return Ok(sin(&z.negate())?.negate());
    }
    let precision = z.precision();
    let u = exp(&z.times_i())?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    halve_over_i(&u.subtract(&v)?, precision)
}

/// Cosine: `(e^(iz) + e^(-iz)) / 2`.
///
/// # Errors
///
/// As for [`sin`].
pub fn cos(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.imag().signum() < 0 {
        // Even function.
        return cos(&z.negate());
    }
    let precision = z.precision();
    let u = exp(&z.times_i())?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    u.add(&v)?.divide_word(2, precision)
}

/// Tangent, from one exponential: `sin/cos` with `e^(iz)` shared.
///
/// # Errors
///
/// Domain at the poles of the tangent; otherwise as for [`sin`].
pub fn tan(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.imag().signum() < 0 {
        return Ok(tan(&z.negate())?.negate());
    }
    let precision = z.precision();
    let u = exp(&z.times_i())?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    let sine = halve_over_i(&u.subtract(&v)?, precision)?;
    let cosine = u.add(&v)?.divide_word(2, precision)?;
    if cosine.is_zero() {
        return Err(ApError::Domain("tangent pole"));
    }
    sine.divide(&cosine)
}

/// Hyperbolic sine: `(e^z - e^(-z)) / 2`.
///
/// # Errors
///
/// As for [`exp`].
pub fn sinh(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.real().signum() < 0 {
        return Ok(sinh(&z.negate())?.negate());
    }
    let precision = z.precision();
    let u = exp(z)?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    u.subtract(&v)?.divide_word(2, precision)
}

/// Hyperbolic cosine: `(e^z + e^(-z)) / 2`.
///
/// # Errors
///
/// As for [`exp`].
pub fn cosh(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.real().signum() < 0 {
        return cosh(&z.negate());
    }
    let precision = z.precision();
    let u = exp(z)?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    u.add(&v)?.divide_word(2, precision)
}

/// Hyperbolic tangent, from one exponential.
///
/// # Errors
///
/// As for [`exp`].
pub fn tanh(z: &Apcomplex) -> Result<Apcomplex, ApError> {
    if z.real().signum() < 0 {
        return Ok(tanh(&z.negate())?.negate());
    }
    let precision = z.precision();
    let u = exp(z)?;
    let v = Apcomplex::one(z.radix()).with_precision(u.precision()).divide(&u)?;
    let ratio = u.subtract(&v)?.divide(&u.add(&v)?)?;
    Ok(ratio.with_precision(precision))
}
