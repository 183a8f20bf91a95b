//! In-cache table FNT.
//!
//! Decimation-in-time radix-2 Cooley-Tukey over a precomputed twiddle
//! table. This is the kernel every other strategy bottoms out in; it is
//! selected on its own when the transform plus w-table fit in half the L1
//! cache.

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::modmath::ModMath;
use crate::storage::DataStorage;

/// Bit-reversal permutation of a power-of-two length slice.
pub(crate) fn bit_reverse<W>(data: &mut [W]) {
    let n = data.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// In-place FNT of a power-of-two length slice. `w_table[i]` must hold
/// `w^i` for the forward or inverse n:th root `w`; the same code serves
/// both directions. No normalization is applied.
pub(crate) fn fnt_slice<L: NttLimb>(data: &mut [L::Word], mm: &ModMath, w_table: &[u64]) {
    let n = data.len();
    debug_assert!(n.is_power_of_two() || n <= 1);
    debug_assert!(w_table.len() >= n);
    if n <= 1 {
        return;
    }

    bit_reverse(data);

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = n / size;
        for block in (0..n).step_by(size) {
            for j in 0..half {
                let w = w_table[j * step];
                let a = L::to_u64(data[block + j]);
                let b = mm.multiply(L::to_u64(data[block + j + half]), w);
                data[block + j] = L::from_u64(mm.add(a, b));
                data[block + j + half] = L::from_u64(mm.subtract(a, b));
            }
        }
        size *= 2;
    }
}

/// Twiddle table for a length-`n` pass over modulus `modulus_idx`.
pub(crate) fn w_table<L: NttLimb>(modulus_idx: usize, n: usize, forward: bool) -> Vec<u64> {
    let mm = ModMath::new::<L>(modulus_idx);
    let g = L::PRIMITIVE_ROOTS[modulus_idx];
    let w = if forward {
        mm.forward_nth_root(g, n as u64)
    } else {
        mm.inverse_nth_root(g, n as u64)
    };
    mm.create_w_table(w, n)
}

/// Forward transform of the `[offset, offset + len)` region.
pub(crate) fn transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
) -> Result<(), NttError> {
    let mm = ModMath::new::<L>(modulus_idx);
    let table = w_table::<L>(modulus_idx, len, true);
    let data = storage.as_mut_slice().ok_or(NttError::NotCached)?;
    fnt_slice::<L>(&mut data[offset..offset + len], &mm, &table);
    Ok(())
}

/// Inverse transform of the `[offset, offset + len)` region, scaling by
/// `1/total_length` as the final step. `total_length` is the full transform
/// length, which exceeds `len` when a factor-3 decorator drives three
/// subtransforms.
pub(crate) fn inverse_transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
    total_length: u64,
) -> Result<(), NttError> {
    let mm = ModMath::new::<L>(modulus_idx);
    let table = w_table::<L>(modulus_idx, len, false);
    let data = storage.as_mut_slice().ok_or(NttError::NotCached)?;
    let region = &mut data[offset..offset + len];
    fnt_slice::<L>(region, &mm, &table);
    let n_inv = mm.inverse(total_length);
    for word in region.iter_mut() {
        *word = L::from_u64(mm.multiply(L::to_u64(*word), n_inv));
    }
    Ok(())
}
