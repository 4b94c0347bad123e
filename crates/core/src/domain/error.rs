// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid signal strength: {0} dBm (RSSI must be <= 0)")]
    InvalidStrength(i32),

    #[error("Unknown frequency band: {0}")]
    UnknownBand(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
