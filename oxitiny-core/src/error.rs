//! Error types for OxiTiny operations.
//!
//! Only hard failures are represented here. A coder declining a block is
//! not an error: it is reported as `None` (or `Encoded::NotApplicable`) and
//! absorbed by the mode-selection fallback chain.

use std::io;
use thiserror::Error;

/// The main error type for OxiTiny operations.
#[derive(Debug, Error)]
pub enum TinyError {
    /// I/O error from the surrounding driver.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Block length outside the range an entry point accepts.
    #[error("Invalid block length {length}: expected 1..={max}")]
    InvalidLength {
        /// The rejected length.
        length: usize,
        /// Largest length the entry point accepts.
        max: usize,
    },

    /// Encoded data is structurally invalid (bad tag, bad header, bad reference).
    #[error("Corrupted data at offset {offset}: {message}")]
    StructuralDecode {
        /// Byte offset (or bit offset inside a block) where the problem was found.
        offset: usize,
        /// Description of the inconsistency.
        message: String,
    },

    /// Encoded data ended before the decoder was done with it.
    #[error("Unexpected end of data at bit position {bit_position}")]
    UnexpectedEof {
        /// Bit position of the read that ran off the end.
        bit_position: usize,
    },
}

/// Result type alias for OxiTiny operations.
pub type Result<T> = std::result::Result<T, TinyError>;

impl TinyError {
    /// Create an invalid length error.
    pub fn invalid_length(length: usize, max: usize) -> Self {
        Self::InvalidLength { length, max }
    }

    /// Create a structural decode error.
    pub fn corrupted(offset: usize, message: impl Into<String>) -> Self {
        Self::StructuralDecode {
            offset,
            message: message.into(),
        }
    }

    /// Create an unexpected end-of-data error.
    pub fn unexpected_eof(bit_position: usize) -> Self {
        Self::UnexpectedEof { bit_position }
    }

    /// Process exit code used by the command-line driver for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::NotFound => 9,
            Self::Io(_) => 1,
            Self::InvalidLength { .. } => 2,
            Self::StructuralDecode { .. } => 3,
            Self::UnexpectedEof { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TinyError::invalid_length(0, 512);
        assert!(err.to_string().contains("Invalid block length 0"));

        let err = TinyError::corrupted(7, "unknown mode tag 6");
        assert!(err.to_string().contains("offset 7"));
        assert!(err.to_string().contains("unknown mode tag 6"));

        let err = TinyError::unexpected_eof(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TinyError = io_err.into();
        assert!(matches!(err, TinyError::Io(_)));
        assert_eq!(err.exit_code(), 9);
    }
}
