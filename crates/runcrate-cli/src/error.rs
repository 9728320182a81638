//! Error types for the CLI application.

use runcrate_recorder::RecorderError;
use runcrate_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Recording failed
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    /// Reading the crate metadata failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The wrapped command could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
