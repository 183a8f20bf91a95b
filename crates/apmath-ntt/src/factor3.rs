//! Factor-3 transform step.
//!
//! Glues three power-of-two subtransforms into a length 3*2^k transform.
//! The data is split into contiguous thirds; a 3-point Winograd butterfly
//! runs down the columns (one element from each third), with per-column
//! twiddles w^j and w^2j applied after the butterfly on the forward
//! direction and before it on the inverse. The power-of-two subtransforms
//! are then delegated to the wrapped strategy.
//!
//! All access requires external synchronization, as with every strategy.

use rayon::prelude::*;

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::modmath::ModMath;
use crate::parallel::{can_parallelize, ParallelRunner};
use crate::storage::DataStorage;

/// Column chunk processed per worker or per disk fetch.
const COLUMN_CHUNK: usize = 4096;

/// Precomputed butterfly constants for one direction and modulus.
struct Wfta {
    mm: ModMath,
    /// Forward or inverse root of unity for the full length.
    w: u64,
    /// w^2, the twiddle base for the third sub-sequence.
    ww: u64,
    /// -3/2 mod p.
    w1: u64,
    /// w^(N/3) + 1/2 mod p.
    w2: u64,
    inverse: bool,
}

impl Wfta {
    fn new<L: NttLimb>(modulus_idx: usize, power2length: usize, inverse: bool) -> Self {
        let mm = ModMath::new::<L>(modulus_idx);
        let g = L::PRIMITIVE_ROOTS[modulus_idx];
        let length = 3 * power2length as u64;
        let w = if inverse {
            mm.inverse_nth_root(g, length)
        } else {
            mm.forward_nth_root(g, length)
        };
        let w3 = mm.pow_unsigned(w, power2length as u64);
        Self {
            mm,
            w,
            ww: mm.multiply(w, w),
            w1: mm.negate(mm.divide(3, 2)),
            w2: mm.add(w3, mm.divide(1, 2)),
            inverse,
        }
    }

    /// Butterfly a run of columns. `tmp1` and `tmp2` are the twiddles
    /// w^start and w^2*start for the first column of the run.
    fn columns<L: NttLimb>(
        &self,
        x0: &mut [L::Word],
        x1: &mut [L::Word],
        x2: &mut [L::Word],
        mut tmp1: u64,
        mut tmp2: u64,
    ) {
        let mm = &self.mm;
        for i in 0..x0.len() {
            let mut c0 = L::to_u64(x0[i]);
            let mut c1 = L::to_u64(x1[i]);
            let mut c2 = L::to_u64(x2[i]);

            if self.inverse {
                c1 = mm.multiply(c1, tmp1);
                c2 = mm.multiply(c2, tmp2);
            }

            let mut t = mm.add(c1, c2);
            c2 = mm.subtract(c1, c2);
            c0 = mm.add(c0, t);
            t = mm.multiply(t, self.w1);
            c2 = mm.multiply(c2, self.w2);
            t = mm.add(t, c0);
            c1 = mm.add(t, c2);
            c2 = mm.subtract(t, c2);

            if !self.inverse {
                c1 = mm.multiply(c1, tmp1);
                c2 = mm.multiply(c2, tmp2);
            }

            x0[i] = L::from_u64(c0);
            x1[i] = L::from_u64(c1);
            x2[i] = L::from_u64(c2);

            tmp1 = mm.multiply(tmp1, self.w);
            tmp2 = mm.multiply(tmp2, self.ww);
        }
    }
}

/// Run the 3-point butterfly across all columns of the
/// `[offset, offset + 3 * power2length)` region.
pub(crate) fn transform_columns<L: NttLimb>(
    storage: &mut DataStorage<L>,
    offset: usize,
    power2length: usize,
    modulus_idx: usize,
    inverse: bool,
    runner: Option<&ParallelRunner>,
) -> Result<(), NttError> {
    let m = power2length;
    let wfta = Wfta::new::<L>(modulus_idx, m, inverse);
    let parallel = can_parallelize(m, &[&*storage]) && runner.is_some();

    if let Some(data) = storage.as_mut_slice() {
        let region = &mut data[offset..offset + 3 * m];
        let (x0, rest) = region.split_at_mut(m);
        let (x1, x2) = rest.split_at_mut(m);

        if parallel {
            let runner = runner.expect("checked above");
            runner.install(|| {
                x0.par_chunks_mut(COLUMN_CHUNK)
                    .zip(x1.par_chunks_mut(COLUMN_CHUNK))
                    .zip(x2.par_chunks_mut(COLUMN_CHUNK))
                    .enumerate()
                    .for_each(|(chunk, ((c0, c1), c2))| {
                        let start = (chunk * COLUMN_CHUNK) as u64;
                        let tmp1 = wfta.mm.pow_unsigned(wfta.w, start);
                        let tmp2 = wfta.mm.pow_unsigned(wfta.ww, start);
                        wfta.columns::<L>(c0, c1, c2, tmp1, tmp2);
                    });
            });
        } else {
            wfta.columns::<L>(x0, x1, x2, 1, 1);
        }
        return Ok(());
    }

    // Disk-backed: fetch column runs from the three thirds.
    let mut b0 = vec![L::Word::default(); COLUMN_CHUNK.min(m)];
    let mut b1 = b0.clone();
    let mut b2 = b0.clone();
    let mut start = 0usize;
    while start < m {
        let len = COLUMN_CHUNK.min(m - start);
        storage.read_block(offset + start, &mut b0[..len])?;
        storage.read_block(offset + m + start, &mut b1[..len])?;
        storage.read_block(offset + 2 * m + start, &mut b2[..len])?;

        let tmp1 = wfta.mm.pow_unsigned(wfta.w, start as u64);
        let tmp2 = wfta.mm.pow_unsigned(wfta.ww, start as u64);
        wfta.columns::<L>(&mut b0[..len], &mut b1[..len], &mut b2[..len], tmp1, tmp2);

        storage.write_block(offset + start, &b0[..len])?;
        storage.write_block(offset + m + start, &b1[..len])?;
        storage.write_block(offset + 2 * m + start, &b2[..len])?;
        start += len;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{IntLimb, LongLimb};
    use crate::table_fnt;

    /// Reference length-3m DFT by the O(n^2) definition.
    fn direct_dft<L: NttLimb>(input: &[u64], modulus_idx: usize) -> Vec<u64> {
        let n = input.len() as u64;
        let mm = ModMath::new::<L>(modulus_idx);
        let w = mm.forward_nth_root(L::PRIMITIVE_ROOTS[modulus_idx], n);
        (0..n)
            .map(|k| {
                let mut acc = 0;
                for (j, &x) in input.iter().enumerate() {
                    let tw = mm.pow_unsigned(w, j as u64 * k % n);
                    acc = mm.add(acc, mm.multiply(x, tw));
                }
                acc
            })
            .collect()
    }

    /// Forward factor-3 transform with a table FNT inner, returning bins in
    /// natural order for comparison against the direct DFT. Output third q
    /// at sub-position k holds bin 3k + q.
    fn factor3_forward_bins(input: &[u64], modulus_idx: usize) -> Vec<u64> {
        let n = input.len();
        let m = n / 3;
        let mut storage = DataStorage::<LongLimb>::cached(n);
        let words: Vec<u64> = input.to_vec();
        storage.write_block(0, &words).unwrap();

        transform_columns(&mut storage, 0, m, modulus_idx, false, None).unwrap();
        for third in 0..3 {
            table_fnt::transform_region(&mut storage, third * m, m, modulus_idx).unwrap();
        }

        let out = storage.to_words().unwrap();
        let mut bins = vec![0u64; n];
        for q in 0..3 {
            for k in 0..m {
                bins[3 * k + q] = out[q * m + k];
            }
        }
        bins
    }

    #[test]
    fn forward_matches_direct_dft() {
        let n = 12usize;
        let input: Vec<u64> = (0..n as u64).map(|v| v * v + 7).collect();
        for modulus_idx in 0..3 {
            assert_eq!(
                factor3_forward_bins(&input, modulus_idx),
                direct_dft::<LongLimb>(&input, modulus_idx),
                "modulus {modulus_idx}"
            );
        }
    }

    fn roundtrip<L: NttLimb>(m: usize, parallel: bool) {
        let runner = ParallelRunner::new(2).unwrap();
        let runner = parallel.then_some(&runner);
        let n = 3 * m;
        for modulus_idx in 0..3 {
            let mut storage = DataStorage::<L>::cached(n);
            let words: Vec<L::Word> = (0..n as u64).map(|v| L::from_u64(v * 5 + 1)).collect();
            storage.write_block(0, &words).unwrap();

            transform_columns(&mut storage, 0, m, modulus_idx, false, runner).unwrap();
            for third in 0..3 {
                table_fnt::transform_region(&mut storage, third * m, m, modulus_idx).unwrap();
            }
            for third in 0..3 {
                table_fnt::inverse_transform_region(
                    &mut storage,
                    third * m,
                    m,
                    modulus_idx,
                    n as u64,
                )
                .unwrap();
            }
            transform_columns(&mut storage, 0, m, modulus_idx, true, runner).unwrap();

            let expected: Vec<u64> = (0..n as u64).map(|v| v * 5 + 1).collect();
            assert_eq!(storage.to_words().unwrap(), expected, "modulus {modulus_idx}");
        }
    }

    #[test]
    fn roundtrip_cached() {
        roundtrip::<LongLimb>(8, false);
        roundtrip::<IntLimb>(64, false);
    }

    #[test]
    fn roundtrip_parallel() {
        roundtrip::<LongLimb>(256, true);
    }

    #[test]
    fn disk_columns_match_cached() {
        let m = 128usize;
        let n = 3 * m;
        let words: Vec<u64> = (0..n as u64).map(|v| v * 3 + 2).collect();

        let mut cached = DataStorage::<LongLimb>::cached(n);
        cached.write_block(0, &words).unwrap();
        transform_columns(&mut cached, 0, m, 0, false, None).unwrap();

        let mut disk = DataStorage::<LongLimb>::disk(n).unwrap();
        disk.write_block(0, &words).unwrap();
        transform_columns(&mut disk, 0, m, 0, false, None).unwrap();

        assert_eq!(cached.to_words().unwrap(), disk.to_words().unwrap());
    }
}
