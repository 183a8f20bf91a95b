//! Engine configuration.
//!
//! A [`Context`] carries the machine parameters the strategy builder and the
//! convolution engine consult: cache size, memory budget, processor count
//! and the shared-memory threshold. A process-global default is available
//! through [`Context::global`]; operations take `&Context` so callers can
//! override it locally.

use std::sync::OnceLock;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

/// Default L1 data cache size in bytes.
pub const DEFAULT_CACHE_L1_SIZE: usize = 32_768;

/// Default largest block of memory a single transform may allocate.
pub const DEFAULT_MAX_MEMORY_BLOCK_SIZE: usize = 256 << 20;

/// Default data size above which a transform must hold the shared-memory
/// lock.
pub const DEFAULT_SHARED_MEMORY_THRESHOLD: usize = 64 << 20;

/// Default size above which at-rest storage is spilled to disk.
pub const DEFAULT_MEMORY_THRESHOLD: usize = 4 << 20;

/// Default disk I/O block size in words.
pub const DEFAULT_BLOCK_SIZE: usize = 65_536;

static GLOBAL: OnceLock<Context> = OnceLock::new();

// One lock per process: two memory-heavy transforms must not run at once,
// whichever contexts they were configured from.
static SHARED_MEMORY_LOCK: Mutex<()> = Mutex::new(());

/// Machine parameters for the transform engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// L1 data cache size in bytes.
    pub cache_l1_size: usize,
    /// Largest block of memory a single transform may allocate, in bytes.
    /// Transforms above this size go through disk-backed two-pass storage.
    pub max_memory_block_size: usize,
    /// Worker thread count for parallel transform kernels.
    pub number_of_processors: usize,
    /// Data size in bytes above which a transform must acquire the
    /// process-wide shared-memory lock.
    pub shared_memory_threshold: usize,
    /// Size in bytes above which at-rest storage (a number or a finished
    /// residue stream, as opposed to transform scratch) is kept on disk.
    pub memory_threshold: usize,
    /// Disk I/O block size in words.
    pub block_size: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cache_l1_size: DEFAULT_CACHE_L1_SIZE,
            max_memory_block_size: DEFAULT_MAX_MEMORY_BLOCK_SIZE,
            number_of_processors: std::thread::available_parallelism()
                .map_or(1, std::num::NonZeroUsize::get),
            shared_memory_threshold: DEFAULT_SHARED_MEMORY_THRESHOLD,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Context {
    /// The process-global default context. Initialized on first use;
    /// [`Context::set_global`] may install a configured context before that.
    #[must_use]
    pub fn global() -> &'static Context {
        GLOBAL.get_or_init(Context::default)
    }

    /// Install the process-global context. Returns `Err` with the rejected
    /// context if a global context was already initialized.
    ///
    /// # Errors
    ///
    /// Returns the context back when the global has already been set.
    pub fn set_global(ctx: Context) -> Result<(), Context> {
        GLOBAL.set(ctx)
    }

    /// Acquire the process-wide shared-memory lock. The guard releases the
    /// lock when dropped, on every exit path.
    #[must_use]
    pub fn lock_shared_memory(&self) -> MutexGuard<'static, ()> {
        SHARED_MEMORY_LOCK.lock()
    }

    /// Builder-style setter for the cache size.
    #[must_use]
    pub fn with_cache_l1_size(mut self, bytes: usize) -> Self {
        self.cache_l1_size = bytes;
        self
    }

    /// Builder-style setter for the memory budget.
    #[must_use]
    pub fn with_max_memory_block_size(mut self, bytes: usize) -> Self {
        self.max_memory_block_size = bytes;
        self
    }

    /// Builder-style setter for the worker thread count.
    #[must_use]
    pub fn with_number_of_processors(mut self, n: usize) -> Self {
        self.number_of_processors = n.max(1);
        self
    }

    /// Builder-style setter for the shared-memory threshold.
    #[must_use]
    pub fn with_shared_memory_threshold(mut self, bytes: usize) -> Self {
        self.shared_memory_threshold = bytes;
        self
    }
}
