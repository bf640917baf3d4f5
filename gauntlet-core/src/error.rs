//! Core error types for gauntlet
//!
//! Per-request failures are data ([`crate::FailureMode`]) and never appear
//! here. These errors cover the few conditions that stop a run from
//! starting at all.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum GauntletError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] gauntlet_config::ConfigError),

    /// Nothing to run
    #[error("Invalid run: {0}")]
    InvalidRun(String),

    /// Async runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gauntlet
pub type Result<T> = std::result::Result<T, GauntletError>;
