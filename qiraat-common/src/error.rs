//! Common error types for the qiraat services

use thiserror::Error;

/// Common result type for qiraat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across qiraat services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
