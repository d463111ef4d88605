//! Error types for irradiance decomposition.

use thiserror::Error;

pub type IrradianceResult<T> = Result<T, IrradianceError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrradianceError {
    /// Parallel input series differ in length
    #[error("Length mismatch: {what} has {got} values, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// Day of year outside the representable range
    #[error("Invalid day of year: {0}")]
    InvalidDayOfYear(u32),
}
