// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Parse error: {0}")]
    Parse(#[from] crate::port::ParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
