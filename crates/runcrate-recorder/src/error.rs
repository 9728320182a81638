//! Error types for the recorder.

use runcrate_domain::DomainError;
use runcrate_store::StoreError;
use thiserror::Error;

/// Recording errors
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Invalid descriptor, role mapping or path outside the crate
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Loading or saving the metadata document failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid recorder configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Filesystem error outside the metadata document (crate dir, cwd)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// None of `USER`, `LOGNAME`, `USERNAME` is set and no user was given
    #[error("Cannot determine the current user; set USER or pass one explicitly")]
    UnknownUser,
}

/// Result type alias for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;
