//! Error type for the transform engine.

/// Error type for NTT and convolution operations.
#[derive(Debug, thiserror::Error)]
pub enum NttError {
    /// Requested transform length exceeds what the element type supports.
    #[error("transform length {requested} exceeds maximum {maximum}")]
    TransformLength {
        /// The length that was requested.
        requested: u64,
        /// The maximum supported length for the element type.
        maximum: u64,
    },

    /// A scratch storage could not be allocated or accessed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// An operation was invoked on an unsupported storage variant.
    #[error("operation requires cached storage")]
    NotCached,
}
