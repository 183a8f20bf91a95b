//! Integer functions: powers, roots with remainder, division with
//! remainder, gcd/lcm and modular powers.
//!
//! Division and roots are seeded by the floating-point Newton machinery at
//! just enough precision, truncated, and corrected by at most a step or
//! two of exact integer arithmetic.

use std::cmp::Ordering;

use crate::apfloat::{extend_precision, EXTRA_PRECISION};
use crate::apint::Apint;
use crate::error::ApError;
use crate::float_math::{int_pow, inverse_root};

/// `x^n` truncated to an integer; zero for `n < 0`.
///
/// # Errors
///
/// ZeroToZero for `0^0`; Domain for `0` to a negative power.
pub fn pow(x: &Apint, n: i64) -> Result<Apint, ApError> {
    let radix = x.radix();
    if n == 0 {
        if x.is_zero() {
            return Err(ApError::ZeroToZero);
        }
        return Ok(Apint::one(radix));
    }
    if n < 0 {
        if x.is_zero() {
            return Err(ApError::Domain("zero to a negative power"));
        }
        return Ok(Apint::zero(radix));
    }

    // Square away the trailing zero bits of n first; the skipped
    // doublings reappear as squarings of the accumulated base.
    let mut n = n.unsigned_abs();
    let mut base = x.clone();
    while n & 1 == 0 {
        base = base.multiply(&base)?;
        n >>= 1;
    }
    let mut result = base.clone();
    loop {
        n >>= 1;
        if n == 0 {
            return Ok(result);
        }
        base = base.multiply(&base)?;
        if n & 1 != 0 {
            result = result.multiply(&base)?;
        }
    }
}

/// `(x - 1)^n` from `x^n`, using the binomial shortcut for small n.
fn pow_x_minus1(xn: &Apint, x: &Apint, n: i64) -> Result<Apint, ApError> {
    let one = Apint::one(x.radix());
    match n {
        2 => {
            // x^2 - 2x + 1
            let two_x = x.multiply_word(2)?;
            xn.subtract(&two_x)?.add(&one)
        }
        3 => {
            // x^3 - 3x^2 + 3x - 1
            let xx = x.multiply(x)?;
            xn.subtract(&xx.multiply_word(3)?)?
                .add(&x.multiply_word(3)?)?
                .subtract(&one)
        }
        _ => pow(&x.subtract(&one)?, n),
    }
}

/// `(x + 1)^n` from `x^n`, using the binomial shortcut for small n.
fn pow_x_plus1(xn: &Apint, x: &Apint, n: i64) -> Result<Apint, ApError> {
    let one = Apint::one(x.radix());
    match n {
        2 => {
            // x^2 + 2x + 1
            let two_x = x.multiply_word(2)?;
            xn.add(&two_x)?.add(&one)
        }
        3 => {
            // x^3 + 3x^2 + 3x + 1
            let xx = x.multiply(x)?;
            xn.add(&xx.multiply_word(3)?)?
                .add(&x.multiply_word(3)?)?
                .add(&one)
        }
        _ => pow(&x.add(&one)?, n),
    }
}

/// Integer n:th root with remainder: `(q, r)` such that `q^n + r = x`,
/// with `sign(r) = sign(x)` and `|r| < (|q|+1)^n - |q|^n`.
///
/// # Errors
///
/// Domain for an even root of a negative value, the zeroth root, or an
/// inverse root of zero.
pub fn root(x: &Apint, n: i64) -> Result<(Apint, Apint), ApError> {
    let radix = x.radix();
    if n == 0 {
        return Err(ApError::Domain("zeroth root"));
    }
    if n == 1 {
        return Ok((x.clone(), Apint::zero(radix)));
    }
    if n < 0 {
        if x.is_zero() {
            return Err(ApError::Domain("inverse root of zero"));
        }
        if *x == Apint::one(radix) {
            // One is its own root of any order.
            return Ok((Apint::one(radix), Apint::zero(radix)));
        }
        // Every other inverse root truncates to zero.
        return Ok((Apint::zero(radix), x.clone()));
    }
    if x.is_zero() {
        return Ok((Apint::zero(radix), Apint::zero(radix)));
    }
    if x.signum() < 0 {
        if n % 2 == 0 {
            return Err(ApError::Domain("even root of a negative number"));
        }
        let (q, r) = root(&x.abs(), n)?;
        return Ok((q.negate(), r.negate()));
    }

    // Approximate x^(1/n) = x * (x^(-1/n))^(n-1) in floating point; the
    // inverse-root form needs no division.
    #[allow(clippy::cast_sign_loss)]
    let precision = extend_precision((x.scale() as u64) / n.unsigned_abs(), EXTRA_PRECISION);
    let a = x.to_float(precision);
    let y = inverse_root(&a, n)?;
    let approx = a.multiply(&int_pow(&y, n.unsigned_abs() - 1)?)?;

    let mut q = Apint::from_float_truncated(&approx);
    let mut qn = pow(&q, n)?;
    let mut r = x.subtract(&qn)?;
    loop {
        if r.signum() < 0 {
            qn = pow_x_minus1(&qn, &q, n)?;
            q = q.subtract(&Apint::one(radix))?;
            r = x.subtract(&qn)?;
            continue;
        }
        let next = pow_x_plus1(&qn, &q, n)?;
        if r.compare_to(&next.subtract(&qn)?) != Ordering::Less {
            q = q.add(&Apint::one(radix))?;
            qn = next;
            r = x.subtract(&qn)?;
            continue;
        }
        return Ok((q, r));
    }
}

/// Square root with remainder.
///
/// # Errors
///
/// Domain for negative input.
pub fn sqrt(x: &Apint) -> Result<(Apint, Apint), ApError> {
    root(x, 2)
}

/// Cube root with remainder.
///
/// # Errors
///
/// Propagates storage failures.
pub fn cbrt(x: &Apint) -> Result<(Apint, Apint), ApError> {
    root(x, 3)
}

/// Integer division with remainder: `(q, r)` such that `x = q*y + r`,
/// `sign(r) = sign(x)` and `|r| < |y|`.
///
/// # Errors
///
/// Domain for a zero divisor.
pub fn div(x: &Apint, y: &Apint) -> Result<(Apint, Apint), ApError> {
    let radix = x.radix();
    if y.is_zero() {
        return Err(ApError::Domain("division by zero"));
    }
    if x.is_zero() {
        return Ok((Apint::zero(radix), Apint::zero(radix)));
    }
    let xa = x.abs();
    let ya = y.abs();
    if xa.compare_to(&ya) == Ordering::Less {
        return Ok((Apint::zero(radix), x.clone()));
    }

    // Floating quotient at just enough precision, then correct by one.
    #[allow(clippy::cast_sign_loss)]
    let precision = extend_precision((xa.scale() - ya.scale()).max(0) as u64, EXTRA_PRECISION);
    let fx = xa.to_float(precision);
    let inv = inverse_root(&ya.to_float(precision), 1)?;
    let mut qa = Apint::from_float_truncated(&fx.multiply(&inv)?);
    let mut ra = xa.subtract(&qa.multiply(&ya)?)?;
    while ra.signum() < 0 {
        qa = qa.subtract(&Apint::one(radix))?;
        ra = ra.add(&ya)?;
    }
    while ra.compare_to(&ya) != Ordering::Less {
        qa = qa.add(&Apint::one(radix))?;
        ra = ra.subtract(&ya)?;
    }

    let q_sign = x.signum() * y.signum();
    let q = if q_sign < 0 { qa.negate() } else { qa };
    let r = if x.signum() < 0 { ra.negate() } else { ra };
    Ok((q, r))
}

/// `x mod y` with the sign of `x`.
///
/// # Errors
///
/// Domain for a zero divisor.
pub fn rem(x: &Apint, y: &Apint) -> Result<Apint, ApError> {
    Ok(div(x, y)?.1)
}

/// `|x|` with the sign of `y`; zero when `y` is zero.
#[must_use]
pub fn copy_sign(x: &Apint, y: &Apint) -> Apint {
    if y.is_zero() {
        Apint::zero(x.radix())
    } else if x.signum() != y.signum() {
        x.negate()
    } else {
        x.clone()
    }
}

/// Greatest common divisor by Euclid's algorithm; non-negative.
///
/// # Errors
///
/// Propagates storage failures.
pub fn gcd(a: &Apint, b: &Apint) -> Result<Apint, ApError> {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let r = rem(&a, &b)?;
        a = b;
        b = r;
    }
    Ok(a)
}

/// Least common multiple: `|a*b| / gcd(a, b)`, with `lcm(0, 0) = 0`.
///
/// # Errors
///
/// Propagates storage failures.
pub fn lcm(a: &Apint, b: &Apint) -> Result<Apint, ApError> {
    if a.is_zero() && b.is_zero() {
        return Ok(Apint::zero(a.radix()));
    }
    let g = gcd(a, b)?;
    Ok(div(&a.multiply(b)?.abs(), &g)?.0)
}

/// Modular reduction into `[0, |m|)`.
fn mod_positive(x: &Apint, m: &Apint) -> Result<Apint, ApError> {
    let r = rem(x, &m.abs())?;
    if r.signum() < 0 {
        r.add(&m.abs())
    } else {
        Ok(r)
    }
}

/// `a^b mod m` for `b >= 0`, in `[0, |m|)`. A zero exponent yields one
/// for any non-zero base; a zero modulus yields zero.
///
/// A floating inverse of the modulus is computed once and reused by every
/// reduction inside the square-and-multiply loop.
///
/// # Errors
///
/// Domain for a negative exponent (the modulus cannot be factored);
/// ZeroToZero for `0^0`.
pub fn mod_pow(a: &Apint, b: &Apint, m: &Apint) -> Result<Apint, ApError> {
    let radix = a.radix();
    if b.is_zero() {
        if a.is_zero() {
            return Err(ApError::ZeroToZero);
        }
        return Ok(Apint::one(radix));
    }
    if m.is_zero() {
        return Ok(m.clone());
    }
    if b.signum() < 0 {
        return Err(ApError::Domain("negative exponent in modular power"));
    }

    let ma = m.abs();
    #[allow(clippy::cast_sign_loss)]
    let precision = extend_precision(ma.scale().max(1) as u64, EXTRA_PRECISION);
    let inverse_modulus = inverse_root(&ma.to_float(precision), 1)?;

    // Reduction of a product of two already-reduced values, multiplying
    // by the precomputed inverse instead of a fresh division each step.
    // The inverse is sized for quotients below m^2 / m only, so the
    // initial operand goes through a full division instead.
    let reduce = |t: &Apint| -> Result<Apint, ApError> {
        debug_assert!(t.signum() >= 0);
        let tf = t.to_float(extend_precision(precision, precision));
        let q = Apint::from_float_truncated(&tf.multiply(&inverse_modulus)?);
        let mut r = t.subtract(&q.multiply(&ma)?)?;
        while r.signum() < 0 {
            r = r.add(&ma)?;
        }
        while r.compare_to(&ma) != Ordering::Less {
            r = r.subtract(&ma)?;
        }
        Ok(r)
    };

    let mut base = mod_positive(a, m)?;
    let mut exponent = b.clone();
    // Strip trailing zero bits of the exponent.
    loop {
        let (half, bit) = exponent.div_rem_word(2)?;
        if bit != 0 {
            break;
        }
        base = reduce(&base.multiply(&base)?)?;
        exponent = half;
    }

    let mut result = base.clone();
    let mut exponent = exponent.div_rem_word(2)?.0;
    while !exponent.is_zero() {
        base = reduce(&base.multiply(&base)?)?;
        let (half, bit) = exponent.div_rem_word(2)?;
        if bit != 0 {
            result = reduce(&result.multiply(&base)?)?;
        }
        exponent = half;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(s: &str) -> Apint {
        Apint::parse(s, 10).unwrap()
    }

    #[test]
    fn pow_two_to_one_hundred() {
        assert_eq!(
            pow(&int("2"), 100).unwrap().to_string(),
            "1267650600228229401496703205376"
        );
    }

    #[test]
    fn pow_edges() {
        assert_eq!(pow(&int("7"), 0).unwrap().to_string(), "1");
        assert!(matches!(pow(&int("0"), 0), Err(ApError::ZeroToZero)));
        assert_eq!(pow(&int("0"), 5).unwrap().to_string(), "0");
        assert_eq!(pow(&int("-3"), 3).unwrap().to_string(), "-27");
        assert_eq!(pow(&int("-3"), 4).unwrap().to_string(), "81");
        // Negative exponents truncate to zero.
        assert_eq!(pow(&int("2"), -5).unwrap().to_string(), "0");
        assert_eq!(pow(&int("1"), -5).unwrap().to_string(), "0");
        assert_eq!(pow(&int("-1"), i64::MIN).unwrap().to_string(), "0");
        assert!(matches!(pow(&int("0"), -1), Err(ApError::Domain(_))));
    }

    #[test]
    fn root_cube_of_ten_billion() {
        let (q, r) = root(&int("10000000000"), 3).unwrap();
        assert_eq!(q.to_string(), "2154");
        assert_eq!(r.to_string(), "6051736");
        // q^3 + r = x.
        let check = pow(&q, 3).unwrap().add(&r).unwrap();
        assert_eq!(check.to_string(), "10000000000");
    }

    #[test]
    fn root_exact_and_near() {
        let (q, r) = sqrt(&int("144")).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("12".into(), "0".into()));
        let (q, r) = sqrt(&int("145")).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("12".into(), "1".into()));
        let (q, r) = sqrt(&int("143")).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("11".into(), "22".into()));
    }

    #[test]
    fn root_negative_odd() {
        let (q, r) = cbrt(&int("-30")).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("-3".into(), "-3".into()));
        assert!(matches!(sqrt(&int("-4")), Err(ApError::Domain(_))));
    }

    #[test]
    fn root_edges() {
        assert!(matches!(root(&int("5"), 0), Err(ApError::Domain(_))));
        let (q, r) = root(&int("5"), 1).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("5".into(), "0".into()));
        let (q, r) = root(&int("0"), 4).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("0".into(), "0".into()));
        // Inverse roots of anything but one truncate to zero with the
        // operand as remainder.
        let (q, r) = root(&int("9"), -2).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("0".into(), "9".into()));
        let (q, r) = root(&int("-1"), -3).unwrap();
        assert_eq!((q.to_string(), r.to_string()), ("0".into(), "-1".into()));
        let (q, _) = root(&int("1"), i64::MIN).unwrap();
        assert_eq!(q.to_string(), "1");
    }

    #[test]
    fn root_large_power_of_ten() {
        // A 60-digit operand seeds through the rescaled double path.
        let x = pow(&int("10"), 60).unwrap();
        let (q, r) = root(&x, 4).unwrap();
        assert_eq!(q.to_string(), format!("1{}", "0".repeat(15)));
        assert_eq!(r.to_string(), "0");
    }

    #[test]
    fn div_matches_contract() {
        let x = int("123456789012345678901234567890");
        let y = int("987654321");
        let (q, r) = div(&x, &y).unwrap();
        assert_eq!(q.to_string(), "124999998873437499901");
        assert_eq!(r.to_string(), "574845669");
        let check = q.multiply(&y).unwrap().add(&r).unwrap();
        assert_eq!(check.compare_to(&x), Ordering::Equal);
    }

    #[test]
    fn div_sign_cases() {
        for (x, y, eq, er) in [
            ("7", "3", "2", "1"),
            ("-7", "3", "-2", "-1"),
            ("7", "-3", "-2", "1"),
            ("-7", "-3", "2", "-1"),
            ("2", "5", "0", "2"),
        ] {
            let (q, r) = div(&int(x), &int(y)).unwrap();
            assert_eq!((q.to_string(), r.to_string()), (eq.into(), er.into()), "{x}/{y}");
        }
        assert!(matches!(div(&int("1"), &int("0")), Err(ApError::Domain(_))));
    }

    #[test]
    fn copy_sign_cases() {
        assert_eq!(copy_sign(&int("5"), &int("-2")).to_string(), "-5");
        assert_eq!(copy_sign(&int("-5"), &int("-2")).to_string(), "-5");
        assert_eq!(copy_sign(&int("-5"), &int("3")).to_string(), "5");
        assert_eq!(copy_sign(&int("5"), &int("0")).to_string(), "0");
    }

    #[test]
    fn gcd_lcm_identities() {
        assert_eq!(gcd(&int("462"), &int("1071")).unwrap().to_string(), "21");
        assert_eq!(gcd(&int("-12"), &int("18")).unwrap().to_string(), "6");
        assert_eq!(gcd(&int("0"), &int("5")).unwrap().to_string(), "5");
        assert_eq!(lcm(&int("4"), &int("6")).unwrap().to_string(), "12");
        assert_eq!(lcm(&int("0"), &int("0")).unwrap().to_string(), "0");
        // gcd * lcm = |a*b|
        let a = int("123456");
        let b = int("789012");
        let product = gcd(&a, &b)
            .unwrap()
            .multiply(&lcm(&a, &b).unwrap())
            .unwrap();
        assert_eq!(product, a.multiply(&b).unwrap().abs());
    }

    #[test]
    fn mod_pow_carmichael_witness() {
        let result = mod_pow(&int("7"), &int("560"), &int("561")).unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn mod_pow_matches_naive() {
        // 3^20 = 3486784401; mod 1000 = 401.
        assert_eq!(
            mod_pow(&int("3"), &int("20"), &int("1000")).unwrap().to_string(),
            "401"
        );
        // Negative base normalizes into [0, m).
        assert_eq!(
            mod_pow(&int("-2"), &int("3"), &int("5")).unwrap().to_string(),
            "2"
        );
        assert!(matches!(
            mod_pow(&int("2"), &int("-1"), &int("5")),
            Err(ApError::Domain(_))
        ));
    }

    #[test]
    fn mod_pow_zero_precedence() {
        // A zero exponent wins over a zero or unit modulus.
        assert_eq!(mod_pow(&int("5"), &int("0"), &int("0")).unwrap().to_string(), "1");
        assert_eq!(mod_pow(&int("2"), &int("0"), &int("1")).unwrap().to_string(), "1");
        assert!(matches!(
            mod_pow(&int("0"), &int("0"), &int("0")),
            Err(ApError::ZeroToZero)
        ));
        // With a non-zero exponent, a zero modulus yields zero.
        assert_eq!(mod_pow(&int("2"), &int("5"), &int("0")).unwrap().to_string(), "0");
    }

    #[test]
    fn mod_pow_large_modulus() {
        // A multi-word modulus exercises the precomputed-inverse reduction.
        let m = int("123456789012345678901234567891");
        let result = mod_pow(&int("987654321"), &int("123"), &m).unwrap();
        // Verify against repeated multiplication with plain rem.
        let mut check = Apint::one(10);
        let base = rem(&int("987654321"), &m).unwrap();
        for _ in 0..123 {
            check = rem(&check.multiply(&base).unwrap(), &m).unwrap();
        }
        assert_eq!(result, check);
    }
}
