//! Record command implementation.

use crate::cli::RecordArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{DateTime, FixedOffset};
use runcrate_domain::STDIO_SENTINEL;
use runcrate_recorder::{environment, RecordRequest, Recorder, StaticArguments};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Execute the record command.
///
/// Returns the wrapped command's exit code. Runs that exit non-zero are not
/// recorded.
pub fn execute_record(
    args: RecordArgs,
    recorder: &Recorder,
    crate_dir: Option<&Path>,
    formatter: &Formatter,
) -> Result<i32> {
    let start_time = environment::now();

    let exit_code = if args.no_exec {
        0
    } else {
        run_command(&args.command)?
    };
    if exit_code != 0 {
        warn!("Command exited with code {}, not recording", exit_code);
        eprintln!(
            "{}",
            formatter.warning(&format!("Command exited with code {}; not recorded", exit_code))
        );
        return Ok(exit_code);
    }

    let mut request = build_request(args, start_time)?;
    if let Some(dir) = crate_dir {
        request = request.crate_dir(dir);
    }

    let report = recorder.record(request)?;
    println!("{}", formatter.format_report(&report)?);
    Ok(exit_code)
}

/// Turn the parsed flags into a recorder request.
///
/// `-i`/`-o` paths are taken relative to the working directory the wrapped
/// command runs in, not to the crate directory.
pub fn build_request(
    args: RecordArgs,
    start_time: DateTime<FixedOffset>,
) -> Result<RecordRequest<'static>> {
    let source = StaticArguments::new(args.command)
        .paths("input", absolute_paths(args.inputs)?)
        .paths("output", absolute_paths(args.outputs)?);

    let mut request = RecordRequest::new(source, start_time)
        .input("input")
        .output("output");
    if let Some(name) = args.software {
        request = request.software_name(name);
    }
    if let Some(version) = args.software_version {
        request = request.software_version(version);
    }
    if let Some(license) = args.license {
        request = request.license(license);
    }
    if let Some(user) = args.user {
        request = request.current_user(user);
    }
    if let Some(description) = args.description {
        request = request.description(description);
    }
    Ok(request)
}

fn absolute_paths(paths: Vec<String>) -> Result<Vec<String>> {
    paths
        .into_iter()
        .map(|path| {
            if path.is_empty() || path == STDIO_SENTINEL {
                return Ok(path);
            }
            let absolute = std::path::absolute(&path)?;
            Ok(absolute.to_string_lossy().into_owned())
        })
        .collect()
}

fn run_command(argv: &[String]) -> Result<i32> {
    let (program, rest) = argv
        .split_first()
        .ok_or_else(|| CliError::InvalidInput("no command given".into()))?;

    debug!("Running {:?}", argv);
    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|source| CliError::Spawn {
            program: program.clone(),
            source,
        })?;

    // No code when the process was killed by a signal
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command as CliCommand};
    use crate::config::OutputFormat;
    use clap::Parser;
    use runcrate_domain::DomainError;
    use runcrate_recorder::{RecorderConfig, RecorderError};
    use runcrate_store::CrateStore;

    fn record_args(argv: &[&str]) -> RecordArgs {
        let mut full = vec!["runcrate", "record"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            CliCommand::Record(args) => args,
            _ => panic!("Expected Record command"),
        }
    }

    fn recorder() -> Recorder {
        Recorder::new(RecorderConfig {
            detect_version: false,
            ..Default::default()
        })
    }

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    #[test]
    fn test_no_exec_records_declared_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "hello").unwrap();
        let args = record_args(&[
            "--no-exec",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--user",
            "alice",
            "--software-version",
            "1.2.3",
            "--",
            "example-cli",
            "in.txt",
            "out.txt",
        ]);

        let code = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap();
        assert_eq!(code, 0);

        let doc = CrateStore::new(dir.path()).load().unwrap().unwrap();
        assert!(doc.get("example-cli in.txt out.txt").is_some());
        assert!(doc.get("example-cli@1.2.3").is_some());
        assert_eq!(doc.root().unwrap().references("hasPart"), vec!["in.txt", "out.txt"]);
    }

    #[test]
    fn test_build_request_without_files() {
        let args = record_args(&["--no-exec", "--user", "alice", "--", "example-cli"]);
        let dir = tempfile::tempdir().unwrap();
        let report = recorder()
            .record(
                build_request(args, environment::now())
                    .unwrap()
                    .crate_dir(dir.path()),
            )
            .unwrap();
        assert!(report.files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let args = record_args(&["--user", "alice", "--", "sh", "-c", "exit 3"]);

        let code = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap();
        assert_eq!(code, 3);
        assert!(CrateStore::new(dir.path()).load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let args = record_args(&["--user", "alice", "--", "true"]);

        let code = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap();
        assert_eq!(code, 0);
        assert_eq!(CrateStore::new(dir.path()).playback().unwrap(), vec!["true"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_crate_dir_with_executed_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "hello").unwrap();
        let input = input.to_str().unwrap();
        let args = record_args(&["--user", "alice", "-i", input, "--", "cat", input]);

        let code = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap();
        assert_eq!(code, 0);

        let doc = CrateStore::new(dir.path()).load().unwrap().unwrap();
        assert_eq!(doc.root().unwrap().references("hasPart"), vec!["in.txt"]);
        assert_eq!(
            doc.get("in.txt").unwrap().get("contentSize"),
            Some(&serde_json::json!(5))
        );
    }

    #[test]
    fn test_relative_paths_follow_working_directory() {
        // Cargo.toml exists next to the test process, never in the fresh crate dir
        let dir = tempfile::tempdir().unwrap();
        let args = record_args(&[
            "--no-exec",
            "--user",
            "alice",
            "-i",
            "Cargo.toml",
            "--",
            "example-cli",
        ]);

        let err = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Recorder(RecorderError::Domain(DomainError::OutsideCrateRoot { .. }))
        ));
        assert!(CrateStore::new(dir.path()).load().unwrap().is_none());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = record_args(&["--", "runcrate-definitely-not-installed"]);
        let err = execute_record(args, &recorder(), Some(dir.path()), &formatter()).unwrap_err();
        assert!(matches!(err, CliError::Spawn { .. }));
    }
}
