//! Configuration management for the CLI.
//!
//! One TOML file holds both the recorder defaults (top-level keys) and the
//! CLI's display settings (`[settings]` table).

use crate::error::Result;
use runcrate_recorder::RecorderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Defaults passed to the recorder
    #[serde(flatten)]
    pub recorder: RecorderConfig,

    /// Display settings
    #[serde(default)]
    pub settings: Settings,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; an explicitly named file
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = RecorderConfig::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        config.recorder.validate()?;
        Ok(config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: default_true(),
            format: default_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert!(config.recorder.detect_version);
    }

    #[test]
    fn test_load_combined_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
dataset_license = "CC-BY-4.0"
detect_version = false

[settings]
color = false
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.recorder.dataset_license.as_deref(), Some("CC-BY-4.0"));
        assert!(!config.recorder.detect_version);
        assert!(!config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_invalid_recorder_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "version_timeout_secs = 0\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(CliError::Recorder(_))
        ));
    }
}
