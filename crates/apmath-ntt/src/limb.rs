//! Element types for the transform engine.
//!
//! Each element type pairs a storage word with a triple of NTT primes of the
//! form `k*2^m + 1`. All three primes of a triple have `3 | p - 1`, so
//! transform lengths of three times a power of two are supported. Transform
//! arithmetic itself is always done in `u64` with `u128` widening; the
//! element type governs the storage word width, the prime triple, and the
//! largest per-word digit base.

use std::fmt::Debug;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// A storage word type together with its NTT prime triple.
pub trait NttLimb: Copy + Send + Sync + 'static {
    /// The machine word digits of this element type are stored in.
    type Word: Copy + PartialEq + Default + Debug + Send + Sync + 'static;

    /// Element type name, used in logs.
    const NAME: &'static str;

    /// The three NTT primes.
    const MODULI: [u64; 3];

    /// A primitive root for each modulus.
    const PRIMITIVE_ROOTS: [u64; 3];

    /// Largest `m` such that `2^m` divides `p - 1` for every modulus.
    const TWO_ADICITY: u32;

    /// Largest digit base a word may hold. Constrained by the word width
    /// (and for `f64`, exact integer representability) and by the CRT bound
    /// `N*(base-1)^2 < p0*p1*p2` at the maximum transform length.
    const MAX_BASE: u64;

    /// Widen a word to the transform domain.
    fn to_u64(word: Self::Word) -> u64;

    /// Narrow a transform-domain value back to a word.
    fn from_u64(value: u64) -> Self::Word;

    /// Write one word in little-endian form.
    fn write_word<W: Write>(writer: &mut W, word: Self::Word) -> std::io::Result<()>;

    /// Read one word in little-endian form.
    fn read_word<R: Read>(reader: &mut R) -> std::io::Result<Self::Word>;

    /// Maximum supported transform length: three times the shared
    /// power-of-two part of `p - 1`.
    #[must_use]
    fn max_transform_length() -> u64 {
        3 << Self::TWO_ADICITY
    }

    /// Largest power of `radix` not exceeding [`Self::MAX_BASE`], returned
    /// as `(digits_per_word, base)`.
    #[must_use]
    fn base_digits(radix: u32) -> (u32, u64) {
        debug_assert!((2..=36).contains(&radix));
        let radix = u64::from(radix);
        let mut digits = 1;
        let mut base = radix;
        while base <= Self::MAX_BASE / radix {
            base *= radix;
            digits += 1;
        }
        (digits, base)
    }
}

/// 32-bit element type. Primes just below `2^31`.
#[derive(Debug, Clone, Copy)]
pub struct IntLimb;

impl NttLimb for IntLimb {
    type Word = u32;

    const NAME: &'static str = "int";
    const MODULI: [u64; 3] = [2_113_929_217, 2_013_265_921, 1_811_939_329];
    const PRIMITIVE_ROOTS: [u64; 3] = [5, 31, 13];
    const TWO_ADICITY: u32 = 25;
    const MAX_BASE: u64 = 1 << 31;

    fn to_u64(word: u32) -> u64 {
        u64::from(word)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_u64(value: u64) -> u32 {
        debug_assert!(value <= u64::from(u32::MAX));
        value as u32
    }

    fn write_word<W: Write>(writer: &mut W, word: u32) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(word)
    }

    fn read_word<R: Read>(reader: &mut R) -> std::io::Result<u32> {
        reader.read_u32::<LittleEndian>()
    }
}

/// 64-bit element type. Primes just below `2^63`, so modular addition can
/// never overflow the word.
#[derive(Debug, Clone, Copy)]
pub struct LongLimb;

impl NttLimb for LongLimb {
    type Word = u64;

    const NAME: &'static str = "long";
    const MODULI: [u64; 3] = [
        9_211_409_350_344_572_929,
        9_203_387_313_508_319_233,
        9_194_520_851_741_933_569,
    ];
    const PRIMITIVE_ROOTS: [u64; 3] = [7, 5, 19];
    const TWO_ADICITY: u32 = 47;
    const MAX_BASE: u64 = 1 << 62;

    fn to_u64(word: u64) -> u64 {
        word
    }

    fn from_u64(value: u64) -> u64 {
        value
    }

    fn write_word<W: Write>(writer: &mut W, word: u64) -> std::io::Result<()> {
        writer.write_u64::<LittleEndian>(word)
    }

    fn read_word<R: Read>(reader: &mut R) -> std::io::Result<u64> {
        reader.read_u64::<LittleEndian>()
    }
}

/// Floating-point element type. Words hold exact integers below `2^51`, one
/// bit under the largest prime, so every residue is exactly representable.
#[derive(Debug, Clone, Copy)]
pub struct DoubleLimb;

impl NttLimb for DoubleLimb {
    type Word = f64;

    const NAME: &'static str = "double";
    const MODULI: [u64; 3] = [2_251_366_021_988_353, 2_251_340_252_184_577, 2_251_172_748_460_033];
    const PRIMITIVE_ROOTS: [u64; 3] = [5, 5, 5];
    const TWO_ADICITY: u32 = 32;
    const MAX_BASE: u64 = 1 << 51;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_u64(word: f64) -> u64 {
        debug_assert!(word >= 0.0 && word < (1u64 << 52) as f64);
        word as u64
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_u64(value: u64) -> f64 {
        debug_assert!(value < 1 << 52);
        value as f64
    }

    fn write_word<W: Write>(writer: &mut W, word: f64) -> std::io::Result<()> {
        writer.write_f64::<LittleEndian>(word)
    }

    fn read_word<R: Read>(reader: &mut R) -> std::io::Result<f64> {
        reader.read_f64::<LittleEndian>()
    }
}
