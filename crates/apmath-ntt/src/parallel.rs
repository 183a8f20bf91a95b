//! Worker pool for transform step kernels.
//!
//! Parallelism is exploited only inside NTT step kernels (row passes and
//! factor-3 column butterflies); each pass is bulk-synchronous, so all
//! workers finish before the next pass begins.

use rayon::ThreadPool;

use crate::error::NttError;
use crate::limb::NttLimb;
use crate::storage::DataStorage;

/// A sized worker pool the step kernels run on.
pub struct ParallelRunner {
    pool: ThreadPool,
}

impl ParallelRunner {
    /// Build a pool with the given number of worker threads.
    ///
    /// # Errors
    ///
    /// Fails when worker threads cannot be spawned.
    pub fn new(num_threads: usize) -> Result<Self, NttError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .build()
            .map_err(|e| NttError::Storage(std::io::Error::other(e)))?;
        Ok(Self { pool })
    }

    /// Run `f` inside the pool so rayon iterators in kernels use these
    /// workers.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Whether a column pass may run in parallel: only when the column count
/// fits a 32-bit signed integer and every storage supports random access.
#[must_use]
pub fn can_parallelize<L: NttLimb>(columns: usize, storages: &[&DataStorage<L>]) -> bool {
    columns <= i32::MAX as usize && storages.iter().all(|s| s.is_cached())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::LongLimb;

    #[test]
    fn runner_executes_in_pool() {
        let runner = ParallelRunner::new(2).unwrap();
        assert_eq!(runner.num_threads(), 2);
        let sum: u64 = runner.install(|| (0..100u64).sum());
        assert_eq!(sum, 4950);
    }

    #[test]
    fn predicate_requires_cached() {
        let cached = DataStorage::<LongLimb>::cached(16);
        let disk = DataStorage::<LongLimb>::disk(16).unwrap();
        assert!(can_parallelize(16, &[&cached]));
        assert!(!can_parallelize(16, &[&cached, &disk]));
        assert!(!can_parallelize(i32::MAX as usize + 1, &[&cached]));
    }
}
