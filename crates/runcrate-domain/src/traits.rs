//! Trait definitions for external interactions
//!
//! These traits define the boundaries between graph-building logic and the
//! outside world. Implementations live in other crates (argument-parsing
//! adapters in runcrate-recorder, filesystem probing in runcrate-store).

use crate::descriptor::Parameter;
use crate::entity::CrateDocument;
use std::path::Path;

/// A parsed command line, independent of the library that parsed it
///
/// Implemented by the adapter layer (runcrate-recorder)
pub trait ArgumentSource {
    /// Raw command-line tokens, program name first
    fn argv(&self) -> Vec<String>;

    /// Look up a declared parameter by name
    ///
    /// Returns `None` when no parameter of that name was declared at all.
    /// A declared parameter that was not supplied is returned with an
    /// absent value.
    fn lookup(&self, name: &str) -> Option<Parameter>;

    /// Program name, derived from the first token by default
    fn program_name(&self) -> Option<String> {
        self.argv().first().map(|first| {
            Path::new(first)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| first.clone())
        })
    }

    /// Human-readable description of the program, if the parser carries one
    fn program_description(&self) -> Option<String> {
        None
    }
}

/// Size information about a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Exact length in bytes
    pub size: u64,
}

/// Filesystem probe used while building File nodes
///
/// Implemented by the infrastructure layer (runcrate-store)
pub trait FileProbe {
    /// Stat a file; `None` when it is missing or unreadable
    fn probe(&self, path: &Path) -> Option<FileStat>;
}

/// Trait for loading and persisting the crate document
///
/// Implemented by the infrastructure layer (runcrate-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Load the previously persisted document, `None` if there is none yet
    fn load(&self) -> Result<Option<CrateDocument>, Self::Error>;

    /// Persist a fully merged document, replacing any previous one
    fn save(&self, document: &CrateDocument) -> Result<(), Self::Error>;
}
