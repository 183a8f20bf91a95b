//! Error type for the numeric layer.
//!
//! Domain conditions are ordinary result variants, not panics; every
//! fallible operation surfaces its error to the caller.

use apmath_ntt::NttError;

/// Error type for arbitrary-precision arithmetic.
#[derive(Debug, thiserror::Error)]
pub enum ApError {
    /// Input outside the function's mathematical domain.
    #[error("domain error: {0}")]
    Domain(&'static str),

    /// Zero raised to the zeroth power.
    #[error("zero to the zeroth power")]
    ZeroToZero,

    /// A transcendental function was requested of an operand with infinite
    /// precision, or a precision-dependent invariant failed.
    #[error("precision error: {0}")]
    Precision(&'static str),

    /// The result is too large to represent.
    #[error("overflow")]
    Overflow,

    /// The requested precision collapsed to nothing.
    #[error("complete loss of accurate digits")]
    LossOfAccuracy,

    /// Failure in the transform engine or its storage.
    #[error(transparent)]
    Resource(#[from] NttError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ApError::Domain("even root of a negative number").to_string(),
            "domain error: even root of a negative number"
        );
        assert_eq!(ApError::ZeroToZero.to_string(), "zero to the zeroth power");
        assert_eq!(ApError::Overflow.to_string(), "overflow");
    }
}
