//! Ambient values the domain layer never reads itself: clock, OS user and
//! the version string of the recorded program.

use chrono::{DateTime, FixedOffset, Local};
use std::env;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const USER_VARIABLES: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Current local time with its UTC offset
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Login name from the first non-blank of `USER`, `LOGNAME`, `USERNAME`
pub fn current_user() -> Option<String> {
    USER_VARIABLES.iter().find_map(|key| {
        env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Run `<program> --version` and keep the last whitespace-separated token
///
/// Returns `None` when the program cannot be started, exits unsuccessfully,
/// prints nothing or misses the deadline. A program still running at the
/// deadline is killed.
pub fn detect_software_version(program: &str, timeout: Duration) -> Option<String> {
    let mut child = match Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!("Cannot run '{} --version': {}", program, e);
            return None;
        }
    };

    // Drain stdout while waiting so a chatty program cannot fill the pipe
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!("'{} --version' did not finish within {:?}", program, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                warn!("Waiting for '{} --version' failed: {}", program, e);
                return None;
            }
        }
    };

    if !status.success() {
        warn!("'{} --version' exited with {}", program, status);
        return None;
    }

    let output = match reader?.join() {
        Ok(Ok(buf)) => buf,
        Ok(Err(e)) => {
            warn!("Reading '{} --version' output failed: {}", program, e);
            return None;
        }
        Err(_) => return None,
    };
    let version = last_token(&String::from_utf8_lossy(&output));
    debug!("Detected {} version {:?}", program, version);
    version
}

fn last_token(output: &str) -> Option<String> {
    output.split_whitespace().last().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_token() {
        assert_eq!(last_token("example-cli 1.2.3\n"), Some("1.2.3".into()));
        assert_eq!(last_token("  v2  "), Some("v2".into()));
        assert_eq!(last_token("\n\n"), None);
    }

    #[test]
    fn test_missing_program_has_no_version() {
        let version = detect_software_version(
            "runcrate-definitely-not-installed",
            Duration::from_secs(1),
        );
        assert_eq!(version, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_has_no_version() {
        assert_eq!(detect_software_version("false", Duration::from_secs(5)), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_large_version_output_is_drained() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("chatty");
        std::fs::write(
            &script,
            "#!/bin/sh\nhead -c 262144 /dev/zero | tr '\\0' 'x'\necho\necho chatty 7.0.1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let started = Instant::now();
        let version = detect_software_version(&script.to_string_lossy(), Duration::from_secs(10));
        assert_eq!(version.as_deref(), Some("7.0.1"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_now_has_offset() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
