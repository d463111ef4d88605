//! Error types for grid addressing and calendar conversion.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while addressing the grid or converting calendar days.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    #[error("Invalid day of year: {0} (expected 1..=365)")]
    InvalidDayOfYear(i64),
}

impl GridError {
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }
}
