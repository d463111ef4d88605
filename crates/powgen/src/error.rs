//! Error types for the generation pipeline.

use powgen_common::{EnergyKind, GridError};
use thiserror::Error;

/// Errors that can occur while building resources, simulating or aggregating.
#[derive(Error, Debug)]
pub enum PowGenError {
    #[error("Invalid wind sample: {0}")]
    InvalidWindSample(String),

    #[error("Failed to write resource file: {0}")]
    ResourceFileWriteFailure(String),

    #[error("{kind} simulation failed: {message}")]
    SimulationInvocationFailure { kind: EnergyKind, message: String },

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Invalid resume log: {0}")]
    ResumeLog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Reader(#[from] merra_reader::ReaderError),

    #[error(transparent)]
    Store(#[from] grid_store::StoreError),

    #[error(transparent)]
    Irradiance(#[from] irradiance::IrradianceError),
}

impl PowGenError {
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    pub fn simulation(kind: EnergyKind, msg: impl Into<String>) -> Self {
        Self::SimulationInvocationFailure {
            kind,
            message: msg.into(),
        }
    }

    pub fn resource_write(msg: impl Into<String>) -> Self {
        Self::ResourceFileWriteFailure(msg.into())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PowGenError>;
