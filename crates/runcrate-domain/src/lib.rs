//! Runcrate Domain Layer
//!
//! This crate turns a description of one command-line execution into a
//! linked-data crate graph (RO-Crate with the Process Run Crate profile) and
//! folds it into the document left behind by earlier runs.
//!
//! ## Key Concepts
//!
//! - **ExecutionDescriptor**: argv, file parameters and their roles, times,
//!   software, user, license. A pure value.
//! - **EntityFactory**: builds root, file, software, person, action,
//!   descriptor and profile nodes
//! - **GraphAssembler**: orders the nodes into a deterministic document
//! - **GraphMerger**: reconciles the new graph with an existing one by `@id`
//!
//! ## Architecture
//!
//! - No I/O: files are probed through the [`FileProbe`] trait and parsed
//!   command lines arrive through [`ArgumentSource`]
//! - Clock and OS user are resolved by the caller and passed in
//! - Persistence lives in runcrate-store, the entry point in runcrate-recorder
//!
//! ## Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use runcrate_domain::{
//!     ExecutionDescriptor, FileProbe, FileStat, GraphAssembler, GraphMerger, Parameter, Role,
//!     Software,
//! };
//! use std::path::Path;
//!
//! struct NoFiles;
//! impl FileProbe for NoFiles {
//!     fn probe(&self, _path: &Path) -> Option<FileStat> {
//!         None
//!     }
//! }
//!
//! let utc = FixedOffset::east_opt(0).unwrap();
//! let descriptor = ExecutionDescriptor::new(
//!     vec!["example-cli".into(), "out.txt".into()],
//!     Software::new("example-cli").with_version("1.2.3"),
//!     utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap(),
//!     utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 5).unwrap(),
//!     "alice",
//! )
//! .with_parameter("output", Parameter::single("out.txt"))
//! .with_role("output", Role::Output);
//!
//! let graph = GraphAssembler::new("/tmp/crate", &NoFiles).assemble(&descriptor).unwrap();
//! let merged = GraphMerger::new().merge(&graph, None);
//! assert_eq!(merged.action_ids, vec!["example-cli out.txt"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod factory;
pub mod merger;
pub mod traits;

// Re-exports for convenience
pub use assembler::GraphAssembler;
pub use descriptor::{ExecutionDescriptor, IoPath, Parameter, ParameterValue, Role, Software, STDIO_SENTINEL};
pub use entity::{CrateDocument, Entity, METADATA_FILE, ROOT_ID};
pub use error::{DomainError, Result};
pub use factory::{EntityFactory, FileNode};
pub use merger::{GraphMerger, MergeOutcome};
pub use traits::{ArgumentSource, DocumentStore, FileProbe, FileStat};
