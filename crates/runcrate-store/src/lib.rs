//! Runcrate Storage Layer
//!
//! Loads and persists `ro-crate-metadata.json` for a crate directory and
//! probes the files the crate describes.
//!
//! # Guarantees
//!
//! - A document that is not valid JSON, or not a crate graph, is reported as
//!   a merge conflict and is never overwritten
//! - Saving writes a temporary file next to the target and renames it over
//!   the target, so a crash never leaves a truncated document behind
//! - No locking: concurrent recorders on one crate are the caller's problem
//!
//! # Examples
//!
//! ```no_run
//! use runcrate_store::CrateStore;
//!
//! let store = CrateStore::new("/data/run-42");
//! let commands = store.playback().unwrap();
//! for command in commands {
//!     println!("{}", command);
//! }
//! ```

#![warn(missing_docs)]

mod probe;

pub use probe::FsProbe;

use runcrate_domain::traits::DocumentStore;
use runcrate_domain::{CrateDocument, METADATA_FILE};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The existing document could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The existing document is not a recognisable crate graph
    #[error("Refusing to overwrite {path}: {reason}")]
    MergeConflict {
        /// Document path
        path: PathBuf,
        /// What is wrong with the content
        reason: String,
    },

    /// Persisting the document failed; the previous file is left untouched
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// File-backed document store for one crate directory
#[derive(Debug, Clone)]
pub struct CrateStore {
    root: PathBuf,
}

impl CrateStore {
    /// Create a store for the crate rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The crate directory
    pub fn crate_root(&self) -> &Path {
        &self.root
    }

    /// Location of the metadata document
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Load the existing document, `None` when the crate has none yet
    pub fn load(&self) -> Result<Option<CrateDocument>> {
        let path = self.metadata_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No existing document at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::MergeConflict {
                path: path.clone(),
                reason: format!("not valid JSON ({})", e),
            })?;
        let document = CrateDocument::from_value(&value).map_err(|e| StoreError::MergeConflict {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            "Loaded {} nodes from {}",
            document.graph.len(),
            path.display()
        );
        Ok(Some(document))
    }

    /// Persist the document atomically
    ///
    /// The JSON is written to a temporary file in the crate directory,
    /// flushed to disk, then renamed over the metadata file.
    pub fn save(&self, document: &CrateDocument) -> Result<()> {
        let path = self.metadata_path();
        let mut contents = serde_json::to_string_pretty(&document.to_value())?;
        contents.push('\n');

        let write_err = |source: io::Error| StoreError::Write {
            path: path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&self.root).map_err(write_err)?;
        temp.write_all(contents.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&path).map_err(|e| write_err(e.error))?;

        info!(
            "Wrote {} nodes to {}",
            document.graph.len(),
            path.display()
        );
        Ok(())
    }

    /// Recorded command lines, oldest first; empty when there is no document
    pub fn playback(&self) -> Result<Vec<String>> {
        Ok(self
            .load()?
            .map(|document| document.recorded_commands())
            .unwrap_or_default())
    }
}

impl DocumentStore for CrateStore {
    type Error = StoreError;

    fn load(&self) -> Result<Option<CrateDocument>> {
        CrateStore::load(self)
    }

    fn save(&self, document: &CrateDocument) -> Result<()> {
        CrateStore::save(self, document)
    }
}
