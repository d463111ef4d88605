//! Error types for reading reanalysis archives.

use thiserror::Error;

/// Result type for archive reading operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Error types for archive reading.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// A required channel is absent from the archive
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Flat spatial index beyond the archive's extent
    #[error("Location index {index} out of range (archive holds {limit} locations)")]
    IndexOutOfRange { index: usize, limit: usize },

    /// Archive layout does not match expectations
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
