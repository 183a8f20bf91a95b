//! Six-step FNT for transforms that fit in main memory but not in cache.
//!
//! The length-N data is treated as an n1 x n2 matrix (n1 <= n2, both powers
//! of two). The forward transform runs column FFTs through a blockwise
//! transpose buffer, multiplies element (k1, j) by the twiddle w^(j*k1),
//! then runs contiguous row FFTs. The block buffer keeps each column group
//! cache-resident between the two transpose halves; the final transpose is
//! omitted, leaving the output in the matrix-permuted order that the
//! inverse undoes symmetrically. Pointwise products between two transforms
//! are unaffected by the shared permutation.
//!
//! Row FFTs run on the worker pool when the parallel predicate holds.

use rayon::prelude::*;

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::modmath::ModMath;
use crate::parallel::{can_parallelize, ParallelRunner};
use crate::storage::DataStorage;
use crate::table_fnt::fnt_slice;

/// Columns gathered per transpose block.
const BLOCK_COLUMNS: usize = 64;

/// Split a power-of-two length into matrix dimensions (n1, n2), n1 <= n2.
pub(crate) fn matrix_dims(n: usize) -> (usize, usize) {
    debug_assert!(n.is_power_of_two());
    let log = n.trailing_zeros();
    let n1 = 1usize << (log / 2);
    (n1, n / n1)
}

pub(crate) struct Pass {
    pub(crate) mm: ModMath,
    /// Twiddle base: the forward or inverse N:th root of unity.
    pub(crate) w: u64,
    pub(crate) col_table: Vec<u64>,
    pub(crate) row_table: Vec<u64>,
    pub(crate) n1: usize,
    pub(crate) n2: usize,
}

impl Pass {
    pub(crate) fn new<L: NttLimb>(modulus_idx: usize, n: usize, forward: bool) -> Self {
        let (n1, n2) = matrix_dims(n);
        let mm = ModMath::new::<L>(modulus_idx);
        let g = L::PRIMITIVE_ROOTS[modulus_idx];
        let w = if forward {
            mm.forward_nth_root(g, n as u64)
        } else {
            mm.inverse_nth_root(g, n as u64)
        };
        // Sub-transform roots are powers of the full root, so the column
        // and row tables stay consistent with the twiddle base.
        let col_table = mm.create_w_table(mm.pow_unsigned(w, n2 as u64), n1);
        let row_table = mm.create_w_table(mm.pow_unsigned(w, n1 as u64), n2);
        Self {
            mm,
            w,
            col_table,
            row_table,
            n1,
            n2,
        }
    }

    /// Column FFTs plus twiddles, through a blockwise transpose buffer.
    /// `twiddle_first` reverses the internal order for the inverse pass.
    fn column_pass<L: NttLimb>(&self, data: &mut [L::Word], twiddle_first: bool) {
        let (n1, n2) = (self.n1, self.n2);
        let mm = &self.mm;
        let mut scratch = vec![L::Word::default(); n1 * BLOCK_COLUMNS.min(n2)];
        let mut wj = 1u64; // w^j for the leftmost column of the block

        for j0 in (0..n2).step_by(BLOCK_COLUMNS) {
            let width = BLOCK_COLUMNS.min(n2 - j0);

            // Transpose in: scratch column c holds matrix column j0 + c.
            for r in 0..n1 {
                let row = &data[r * n2 + j0..r * n2 + j0 + width];
                for (c, &word) in row.iter().enumerate() {
                    scratch[c * n1 + r] = word;
                }
            }

            for c in 0..width {
                let column = &mut scratch[c * n1..(c + 1) * n1];
                if twiddle_first {
                    Self::twiddle_column::<L>(mm, column, wj);
                    fnt_slice::<L>(column, mm, &self.col_table);
                } else {
                    fnt_slice::<L>(column, mm, &self.col_table);
                    Self::twiddle_column::<L>(mm, column, wj);
                }
                wj = mm.multiply(wj, self.w);
            }

            // Transpose out.
            for r in 0..n1 {
                let row = &mut data[r * n2 + j0..r * n2 + j0 + width];
                for (c, word) in row.iter_mut().enumerate() {
                    *word = scratch[c * n1 + r];
                }
            }
        }
    }

    /// Multiply column entry k1 by w^(j*k1), with wj = w^j.
    pub(crate) fn twiddle_column<L: NttLimb>(mm: &ModMath, column: &mut [L::Word], wj: u64) {
        let mut acc = wj;
        for word in column.iter_mut().skip(1) {
            *word = L::from_u64(mm.multiply(L::to_u64(*word), acc));
            acc = mm.multiply(acc, wj);
        }
    }

    /// Contiguous row FFTs, parallel when allowed.
    fn row_pass<L: NttLimb>(&self, data: &mut [L::Word], runner: Option<&ParallelRunner>) {
        let mm = self.mm;
        let table = &self.row_table;
        match runner {
            Some(runner) if self.n1 > 1 => runner.install(|| {
                data.par_chunks_mut(self.n2)
                    .for_each(|row| fnt_slice::<L>(row, &mm, table));
            }),
            _ => {
                for row in data.chunks_mut(self.n2) {
                    fnt_slice::<L>(row, &mm, table);
                }
            }
        }
    }
}

/// Forward six-step transform of the `[offset, offset + len)` region.
pub(crate) fn transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
    runner: Option<&ParallelRunner>,
) -> Result<(), NttError> {
    let parallel = can_parallelize(len, &[&*storage]);
    let pass = Pass::new::<L>(modulus_idx, len, true);
    let data = storage.as_mut_slice().ok_or(NttError::NotCached)?;
    let region = &mut data[offset..offset + len];
    pass.column_pass::<L>(region, false);
    pass.row_pass::<L>(region, runner.filter(|_| parallel));
    Ok(())
}

/// Inverse six-step transform, scaling by `1/total_length` as the final
/// step.
pub(crate) fn inverse_transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
    total_length: u64,
    runner: Option<&ParallelRunner>,
) -> Result<(), NttError> {
    let parallel = can_parallelize(len, &[&*storage]);
    let pass = Pass::new::<L>(modulus_idx, len, false);
    let data = storage.as_mut_slice().ok_or(NttError::NotCached)?;
    let region = &mut data[offset..offset + len];
    pass.row_pass::<L>(region, runner.filter(|_| parallel));
    pass.column_pass::<L>(region, true);

    let mm = pass.mm;
    let n_inv = mm.inverse(total_length);
    for word in region.iter_mut() {
        *word = L::from_u64(mm.multiply(L::to_u64(*word), n_inv));
    }
    Ok(())
}
