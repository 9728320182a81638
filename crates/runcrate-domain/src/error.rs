//! Error types for graph construction and merging

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors raised while turning an execution into a crate graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The execution description is inconsistent (e.g. a role names an
    /// undeclared parameter). Raised before any filesystem probe.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A file argument resolves to a location outside the crate root
    #[error("Path '{path}' is outside the crate root '{root}'")]
    OutsideCrateRoot {
        /// The offending path as supplied
        path: PathBuf,
        /// The crate root it was resolved against
        root: PathBuf,
    },

    /// Existing document content is not a recognisable crate graph
    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    /// A graph violates a structural invariant (duplicate ids, dangling references)
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),
}
