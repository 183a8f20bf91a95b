//! Arithmetic modulo one NTT prime.
//!
//! The modulus is fixed at construction. Parallel workers each build their
//! own `ModMath` rather than sharing one; the struct is trivially `Copy`.

use crate::limb::NttLimb;

/// Elementary arithmetic modulo a single prime below `2^63`.
#[derive(Debug, Clone, Copy)]
pub struct ModMath {
    modulus: u64,
}

impl ModMath {
    /// Create an instance for the modulus at `modulus_idx` of the element
    /// type's prime triple.
    #[must_use]
    pub fn new<L: NttLimb>(modulus_idx: usize) -> Self {
        Self {
            modulus: L::MODULI[modulus_idx],
        }
    }

    /// Create an instance for an explicit prime modulus.
    #[must_use]
    pub fn with_modulus(modulus: u64) -> Self {
        debug_assert!(modulus < 1 << 63);
        Self { modulus }
    }

    /// The modulus this instance reduces by.
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// `a + b mod m`. Operands must already be reduced.
    #[must_use]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        let sum = a + b;
        if sum >= self.modulus {
            sum - self.modulus
        } else {
            sum
        }
    }

    /// `a - b mod m`. Operands must already be reduced.
    #[must_use]
    pub fn subtract(&self, a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a + self.modulus - b
        }
    }

    /// `a * b mod m`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn multiply(&self, a: u64, b: u64) -> u64 {
        (u128::from(a) * u128::from(b) % u128::from(self.modulus)) as u64
    }

    /// `-a mod m`.
    #[must_use]
    pub fn negate(&self, a: u64) -> u64 {
        if a == 0 {
            0
        } else {
            self.modulus - a
        }
    }

    /// `a^n mod m` for a signed exponent. A negative exponent is taken
    /// modulo the group order (Fermat), so `pow(a, -n) = pow(a, p-1-n)`.
    ///
    /// `pow(0, 0)` is a caller error.
    #[must_use]
    pub fn pow(&self, a: u64, n: i64) -> u64 {
        debug_assert!(a != 0 || n != 0);
        if n >= 0 {
            self.pow_unsigned(a, n.unsigned_abs())
        } else {
            self.pow_unsigned(self.inverse(a), n.unsigned_abs())
        }
    }

    /// `a^n mod m` for an unsigned exponent.
    #[must_use]
    pub fn pow_unsigned(&self, mut a: u64, mut n: u64) -> u64 {
        if n == 0 {
            return 1;
        }

        // Square away trailing zero bits before entering the main loop.
        while n & 1 == 0 {
            a = self.multiply(a, a);
            n >>= 1;
        }

        let mut r = a;
        loop {
            n >>= 1;
            if n == 0 {
                return r;
            }
            a = self.multiply(a, a);
            if n & 1 != 0 {
                r = self.multiply(r, a);
            }
        }
    }

    /// `a^-1 mod m`. The modulus must be prime.
    #[must_use]
    pub fn inverse(&self, a: u64) -> u64 {
        self.pow_unsigned(a, self.modulus - 2)
    }

    /// `a / b mod m`. The modulus must be prime.
    #[must_use]
    pub fn divide(&self, a: u64, b: u64) -> u64 {
        self.multiply(a, self.inverse(b))
    }

    /// Forward n:th root of unity `w` from the primitive root, i.e.
    /// `g^(p-1-(p-1)/n)`. `n` must divide `p - 1`.
    #[must_use]
    pub fn forward_nth_root(&self, primitive_root: u64, n: u64) -> u64 {
        debug_assert_eq!((self.modulus - 1) % n, 0);
        self.pow_unsigned(primitive_root, self.modulus - 1 - (self.modulus - 1) / n)
    }

    /// Inverse n:th root of unity `w^-1`, i.e. `g^((p-1)/n)`.
    /// `n` must divide `p - 1`.
    #[must_use]
    pub fn inverse_nth_root(&self, primitive_root: u64, n: u64) -> u64 {
        debug_assert_eq!((self.modulus - 1) % n, 0);
        self.pow_unsigned(primitive_root, (self.modulus - 1) / n)
    }

    /// Twiddle table `[w^0, w^1, ..., w^(n-1)]`.
    #[must_use]
    pub fn create_w_table(&self, w: u64, n: usize) -> Vec<u64> {
        let mut table = Vec::with_capacity(n);
        let mut t = 1;
        for _ in 0..n {
            table.push(t);
            t = self.multiply(t, w);
        }
        table
    }
}
