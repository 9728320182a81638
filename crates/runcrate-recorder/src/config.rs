//! Recorder configuration
//!
//! Read from `runcrate/config.toml` under the platform config directory.
//! Every field is optional in the file.

use crate::error::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Defaults applied to every recording
///
/// # Examples
///
/// ```
/// use runcrate_recorder::RecorderConfig;
///
/// let config: RecorderConfig = toml::from_str(r#"dataset_license = "CC-BY-4.0""#).unwrap();
/// assert_eq!(config.dataset_license.as_deref(), Some("CC-BY-4.0"));
/// assert!(config.detect_version);
/// assert_eq!(config.version_timeout_secs, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Crate directory; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crate_dir: Option<PathBuf>,

    /// License attached to the crate when a recording gives none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_license: Option<String>,

    /// Run `<program> --version` when no software version is given
    /// Default: true
    #[serde(default = "default_detect_version")]
    pub detect_version: bool,

    /// Deadline for version detection (in seconds)
    /// Default: 5
    #[serde(default = "default_version_timeout")]
    pub version_timeout_secs: u64,
}

fn default_detect_version() -> bool {
    true
}

fn default_version_timeout() -> u64 {
    5
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            crate_dir: None,
            dataset_license: None,
            detect_version: default_detect_version(),
            version_timeout_secs: default_version_timeout(),
        }
    }
}

impl RecorderConfig {
    /// Default configuration file location
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| RecorderError::Config("Could not find config directory".into()))?;
        Ok(base.join("runcrate").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::from_file(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: RecorderConfig = toml::from_str(&contents)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make every recording fail or mislead
    pub fn validate(&self) -> Result<()> {
        if self.version_timeout_secs == 0 {
            return Err(RecorderError::Config(
                "version_timeout_secs must be greater than 0".into(),
            ));
        }
        if let Some(license) = &self.dataset_license {
            if license.trim().is_empty() {
                return Err(RecorderError::Config("dataset_license cannot be blank".into()));
            }
        }
        Ok(())
    }

    /// Version detection deadline
    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }
}
