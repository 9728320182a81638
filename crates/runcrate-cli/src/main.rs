//! Runcrate CLI - record command-line runs as RO-Crate provenance.

use anyhow::Context;
use clap::Parser;
use runcrate_cli::commands;
use runcrate_cli::{Cli, Command, Config, Formatter};
use runcrate_recorder::Recorder;
use runcrate_store::CrateStore;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `-v` flags take precedence over `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let crate_dir = cli.crate_dir.or_else(|| config.recorder.crate_dir.clone());

    match cli.command {
        Command::Record(args) => {
            let recorder = Recorder::new(config.recorder);
            Ok(commands::execute_record(
                args,
                &recorder,
                crate_dir.as_deref(),
                &formatter,
            )?)
        }
        Command::Playback => {
            let store = CrateStore::new(resolve_crate_dir(crate_dir)?);
            commands::execute_playback(&store, &formatter)?;
            Ok(0)
        }
        Command::Show => {
            let store = CrateStore::new(resolve_crate_dir(crate_dir)?);
            commands::execute_show(&store, &formatter)?;
            Ok(0)
        }
    }
}

fn resolve_crate_dir(dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => env::current_dir().context("Cannot determine the working directory"),
    }
}
