//! Error types for the output grid store.

use powgen_common::EnergyKind;
use thiserror::Error;

/// Errors that can occur while creating or writing output stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The cell already holds generation data.
    #[error("cell ({lat_idx}, {lon_idx}) of the {kind} store is already written")]
    OutputStoreWriteConflict {
        kind: EnergyKind,
        lat_idx: usize,
        lon_idx: usize,
    },

    /// Shape mismatch between request and store.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Zarr format error.
    #[error("Zarr format error: {0}")]
    Zarr(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Store does not exist.
    #[error("store not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    pub fn zarr(msg: impl Into<String>) -> Self {
        Self::Zarr(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
