//! Two-pass FNT for transforms that exceed the memory budget.
//!
//! Structurally the same matrix decomposition as the six-step transform,
//! but the data lives in disk-backed storage and only one block of columns
//! (or one row) is resident at a time. Pass one fetches column blocks into
//! a cached buffer, transforms and twiddle-multiplies them, and writes them
//! back; pass two transforms the contiguous rows. Disk transforms always
//! run sequentially; the parallel predicate rejects uncached storage.

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::six_step::Pass;
use crate::storage::DataStorage;
use crate::table_fnt::fnt_slice;

/// Column-block pass against storage. `twiddle_first` reverses the
/// FFT/twiddle order for the inverse direction.
fn column_pass<L: NttLimb>(
    pass: &Pass,
    storage: &mut DataStorage<L>,
    offset: usize,
    block_words: usize,
    twiddle_first: bool,
) -> Result<(), NttError> {
    let (n1, n2) = (pass.n1, pass.n2);
    let mm = &pass.mm;
    let block_columns = (block_words / n1).clamp(1, n2);
    let mut scratch = vec![L::Word::default(); n1 * block_columns];
    let mut row_buf = vec![L::Word::default(); block_columns];
    let mut wj0 = 1u64; // w^j for the leftmost column of the block

    for j0 in (0..n2).step_by(block_columns) {
        let width = block_columns.min(n2 - j0);

        // Fetch: one strided read per matrix row, transposing into scratch.
        for r in 0..n1 {
            storage.read_block(offset + r * n2 + j0, &mut row_buf[..width])?;
            for (c, &word) in row_buf[..width].iter().enumerate() {
                scratch[c * n1 + r] = word;
            }
        }

        let mut wj = wj0;
        for c in 0..width {
            let column = &mut scratch[c * n1..(c + 1) * n1];
            if twiddle_first {
                Pass::twiddle_column::<L>(mm, column, wj);
                fnt_slice::<L>(column, mm, &pass.col_table);
            } else {
                fnt_slice::<L>(column, mm, &pass.col_table);
                Pass::twiddle_column::<L>(mm, column, wj);
            }
            wj = mm.multiply(wj, pass.w);
        }
        wj0 = wj;

        // Write back.
        for r in 0..n1 {
            for c in 0..width {
                row_buf[c] = scratch[c * n1 + r];
            }
            storage.write_block(offset + r * n2 + j0, &row_buf[..width])?;
        }
    }
    Ok(())
}

/// Row pass: each row is contiguous on disk.
fn row_pass<L: NttLimb>(
    pass: &Pass,
    storage: &mut DataStorage<L>,
    offset: usize,
) -> Result<(), NttError> {
    let mut row = vec![L::Word::default(); pass.n2];
    for r in 0..pass.n1 {
        storage.read_block(offset + r * pass.n2, &mut row)?;
        fnt_slice::<L>(&mut row, &pass.mm, &pass.row_table);
        storage.write_block(offset + r * pass.n2, &row)?;
    }
    Ok(())
}

/// Forward two-pass transform of the `[offset, offset + len)` region.
pub(crate) fn transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
    block_words: usize,
) -> Result<(), NttError> {
    let pass = Pass::new::<L>(modulus_idx, len, true);
    column_pass(&pass, storage, offset, block_words, false)?;
    row_pass(&pass, storage, offset)
}

/// Inverse two-pass transform, scaling by `1/total_length` as the final
/// step.
pub(crate) fn inverse_transform_region<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    len: usize,
    modulus_idx: usize,
    total_length: u64,
    block_words: usize,
) -> Result<(), NttError> {
    let pass = Pass::new::<L>(modulus_idx, len, false);
    row_pass(&pass, storage, offset)?;
    column_pass(&pass, storage, offset, block_words, true)?;

    let n_inv = pass.mm.inverse(total_length);
    let mm = pass.mm;
    storage.update_range(offset, offset + len, |v| mm.multiply(v, n_inv))
}
