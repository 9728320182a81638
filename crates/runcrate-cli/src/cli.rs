//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Runcrate CLI - Record command-line runs as RO-Crate provenance.
#[derive(Debug, Parser)]
#[command(name = "runcrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Crate directory (defaults to the configured one, then the working directory)
    #[arg(long, global = true, env = "RUNCRATE_DIR")]
    pub crate_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids and command lines only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a command and record it in the crate
    Record(RecordArgs),

    /// Print recorded command lines in execution order
    Playback,

    /// Summarize the actions recorded in the crate
    Show,
}

/// Arguments for the record command.
#[derive(Debug, Parser)]
pub struct RecordArgs {
    /// File the command reads (repeatable)
    #[arg(short = 'i', long = "input")]
    pub inputs: Vec<String>,

    /// File the command writes (repeatable)
    #[arg(short = 'o', long = "output")]
    pub outputs: Vec<String>,

    /// Software name (defaults to the program name)
    #[arg(long)]
    pub software: Option<String>,

    /// Software version (detected with `--version` when omitted)
    #[arg(long)]
    pub software_version: Option<String>,

    /// Dataset license for the crate
    #[arg(long)]
    pub license: Option<String>,

    /// User who ran the command (defaults to $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Description of this run
    #[arg(short, long)]
    pub description: Option<String>,

    /// Record without running the command
    #[arg(long)]
    pub no_exec: bool,

    /// The command line to run, after `--`
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}
