//! Error types for address construction and address algebra.

use thiserror::Error;

/// Errors returned by section, address and range operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Malformed or out-of-range construction input
    #[error("Invalid address value: {0}")]
    AddressValue(String),

    /// Operands of a binary operation have different segment counts
    #[error("Segment count mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Segment count of the receiver
        expected: usize,
        /// Segment count of the other operand
        actual: usize,
    },

    /// The result cannot be expressed as a lower/upper pair per segment
    #[error("Incompatible address: {0}")]
    IncompatibleAddress(String),
}

/// Result alias for address operations
pub type AddressResult<T> = Result<T, AddressError>;

impl AddressError {
    pub(crate) fn value(msg: impl Into<String>) -> Self {
        Self::AddressValue(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleAddress(msg.into())
    }

    pub(crate) fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AddressError::size_mismatch(4, 8).to_string(),
            "Segment count mismatch: expected 4, got 8"
        );
        assert_eq!(
            AddressError::value("prefix 40 exceeds 32 bits").to_string(),
            "Invalid address value: prefix 40 exceeds 32 bits"
        );
        assert!(matches!(
            AddressError::incompatible("masked range"),
            AddressError::IncompatibleAddress(_)
        ));
    }
}
