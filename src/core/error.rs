//! Error types for the network engine.

use thiserror::Error;

/// Engine error type.
///
/// Every variant is recoverable: the operation that produced it left the
/// network untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A pattern or state vector does not have one entry per unit.
    #[error("pattern length mismatch: expected {expected} units, got {actual}")]
    PatternLengthMismatch { expected: usize, actual: usize },

    /// A unit index past the end of the unit buffer.
    #[error("unit {index} out of range (network has {count} units)")]
    UnitOutOfRange { index: usize, count: usize },

    /// An archive position with no stored pattern.
    #[error("pattern {index} not found (archive holds {len})")]
    PatternNotFound { index: usize, len: usize },

    /// A grid whose unit count overflows or exceeds the supported maximum.
    #[error("grid {rows}x{cols} exceeds the limit of {max} units")]
    TooManyUnits { rows: usize, cols: usize, max: usize },
}

pub type Result<T> = core::result::Result<T, NetworkError>;

/// Check that a vector carries exactly one entry per unit.
#[inline]
pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(NetworkError::PatternLengthMismatch { expected, actual });
    }
    Ok(())
}
