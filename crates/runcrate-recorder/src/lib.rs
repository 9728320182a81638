//! Runcrate Recorder
//!
//! Entry point for recording a finished command-line run into the
//! `ro-crate-metadata.json` of a crate directory.
//!
//! The recorder resolves what the caller left out (end time, user, crate
//! directory, license, software version), then assembles the run's graph,
//! merges it with the existing document and saves the result.
//!
//! # Example
//!
//! ```no_run
//! use runcrate_recorder::{RecordRequest, Recorder, RecorderConfig, StaticArguments};
//!
//! let start = chrono::Local::now().fixed_offset();
//! // ... run the program ...
//! let args = StaticArguments::new(["example-cli", "--input", "in.txt", "--output", "out.txt"])
//!     .path("input", "in.txt")
//!     .path("output", "out.txt");
//!
//! let report = Recorder::new(RecorderConfig::load().unwrap())
//!     .record(RecordRequest::new(args, start).input("input").output("output"))
//!     .unwrap();
//! println!("recorded {}", report.action_id);
//! ```

#![warn(missing_docs)]

mod adapters;
mod config;
pub mod environment;
mod error;
mod recorder;

pub use adapters::{ClapArguments, StaticArguments};
pub use config::RecorderConfig;
pub use error::{RecorderError, Result};
pub use recorder::{RecordReport, RecordRequest, Recorder};
