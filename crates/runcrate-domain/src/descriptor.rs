//! Execution descriptor - everything needed to describe one run
//!
//! The descriptor is a plain value: ambient state (clock, OS user) has already
//! been resolved by the caller, so graph construction stays deterministic.

use crate::error::{DomainError, Result};
use crate::traits::ArgumentSource;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use std::fmt;

/// Conventional token meaning "standard input/output" rather than a file
pub const STDIO_SENTINEL: &str = "-";

/// Whether a parameter names files consumed or produced by the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// File read by the program (`object` of the action)
    Input,
    /// File written by the program (`result` of the action)
    Output,
}

impl Role {
    /// Lowercase name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Input => "input",
            Role::Output => "output",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved value of a declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterValue {
    /// Declared but not supplied on the command line
    #[default]
    Absent,
    /// A single path token
    Single(String),
    /// Several path tokens (repeated or multi-valued flags)
    Multiple(Vec<String>),
}

impl ParameterValue {
    /// Path tokens carried by this value, sentinel included
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            ParameterValue::Absent => Vec::new(),
            ParameterValue::Single(token) => vec![token.as_str()],
            ParameterValue::Multiple(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Option<String>> for ParameterValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(token) => ParameterValue::Single(token),
            None => ParameterValue::Absent,
        }
    }
}

/// A declared parameter of the program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameter {
    /// What the command line resolved it to
    pub value: ParameterValue,
    /// Help text, recorded as the file's description
    pub help: Option<String>,
}

impl Parameter {
    /// Create a parameter without help text
    pub fn new(value: ParameterValue) -> Self {
        Self { value, help: None }
    }

    /// Create a parameter resolved to a single path
    pub fn single(path: impl Into<String>) -> Self {
        Self::new(ParameterValue::Single(path.into()))
    }

    /// Create a declared-but-absent parameter
    pub fn absent() -> Self {
        Self::new(ParameterValue::Absent)
    }

    /// Attach help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// The program that ran (the action's instrument)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Software {
    /// Program name
    pub name: String,
    /// Version, when known
    pub version: Option<String>,
    /// Program description, when known
    pub description: Option<String>,
}

impl Software {
    /// Create a software description without version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
        }
    }

    /// Set the version; blank strings count as unknown
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = if version.trim().is_empty() { None } else { Some(version) };
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One file argument of the run, in role-declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoPath {
    /// Parameter the path came from
    pub parameter: String,
    /// Input or output
    pub role: Role,
    /// Path token as supplied
    pub path: String,
    /// Help text of the parameter
    pub help: Option<String>,
}

/// Description of a single execution of a command-line program
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionDescriptor {
    /// Raw command-line tokens, program first
    pub argv: Vec<String>,
    /// Declared parameters by name
    pub parameters: IndexMap<String, Parameter>,
    /// Parameters that name files, in declaration order
    pub roles: IndexMap<String, Role>,
    /// When the run started
    pub start_time: DateTime<FixedOffset>,
    /// When the run ended
    pub end_time: DateTime<FixedOffset>,
    /// Program that ran
    pub software: Software,
    /// Optional description of this particular run
    pub description: Option<String>,
    /// Account that ran the program
    pub current_user: String,
    /// License to declare on the crate
    pub dataset_license: Option<String>,
}

impl ExecutionDescriptor {
    /// Create a descriptor with no parameters or roles
    pub fn new(
        argv: Vec<String>,
        software: Software,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
        current_user: impl Into<String>,
    ) -> Self {
        Self {
            argv,
            parameters: IndexMap::new(),
            roles: IndexMap::new(),
            start_time,
            end_time,
            software,
            description: None,
            current_user: current_user.into(),
            dataset_license: None,
        }
    }

    /// Build a descriptor from an argument-parsing adapter
    ///
    /// Only the parameters named in `roles` are looked up. A role naming a
    /// parameter the adapter does not know is a configuration error.
    pub fn from_source<S: ArgumentSource + ?Sized>(
        source: &S,
        roles: IndexMap<String, Role>,
        software: Software,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
        current_user: impl Into<String>,
    ) -> Result<Self> {
        let mut descriptor = Self::new(source.argv(), software, start_time, end_time, current_user);

        for (name, role) in roles {
            let parameter = source.lookup(&name).ok_or_else(|| {
                DomainError::Configuration(format!(
                    "{} role '{}' does not match any declared parameter",
                    role, name
                ))
            })?;
            descriptor.parameters.insert(name.clone(), parameter);
            descriptor.roles.insert(name, role);
        }

        Ok(descriptor)
    }

    /// Add or replace a parameter
    pub fn with_parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Declare a parameter as naming input or output files
    pub fn with_role(mut self, name: impl Into<String>, role: Role) -> Self {
        self.roles.insert(name.into(), role);
        self
    }

    /// Set the run description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the dataset license
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.dataset_license = Some(license.into());
        self
    }

    /// Check the descriptor is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.argv.is_empty() {
            return Err(DomainError::Configuration(
                "argv must contain at least the program name".to_string(),
            ));
        }
        if self.software.name.trim().is_empty() {
            return Err(DomainError::Configuration("software name cannot be empty".to_string()));
        }
        if self.current_user.trim().is_empty() {
            return Err(DomainError::Configuration("current user cannot be empty".to_string()));
        }
        for (name, role) in &self.roles {
            if !self.parameters.contains_key(name) {
                return Err(DomainError::Configuration(format!(
                    "{} role '{}' does not match any declared parameter",
                    role, name
                )));
            }
        }
        if self.end_time < self.start_time {
            return Err(DomainError::Configuration(format!(
                "end time {} precedes start time {}",
                self.end_time.to_rfc3339(),
                self.start_time.to_rfc3339()
            )));
        }
        Ok(())
    }

    /// Command line rendered as a shell-like string; also the action's `@id`
    pub fn action_id(&self) -> String {
        self.argv
            .iter()
            .map(|token| shell_quote(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// File arguments in role-declaration order
    ///
    /// Absent values and the stdio sentinel are skipped.
    pub fn io_paths(&self) -> Vec<IoPath> {
        let mut paths = Vec::new();
        for (name, role) in &self.roles {
            let Some(parameter) = self.parameters.get(name) else {
                continue;
            };
            for token in parameter.value.tokens() {
                if token.is_empty() || token == STDIO_SENTINEL {
                    continue;
                }
                paths.push(IoPath {
                    parameter: name.clone(),
                    role: *role,
                    path: token.to_string(),
                    help: parameter.help.clone(),
                });
            }
        }
        paths
    }
}

/// Quote a token so the joined command line reads back as the same argv
pub fn shell_quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }
    let safe = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r#"'"'"'"#))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time(secs: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 16, 12, 0, secs)
            .unwrap()
    }

    fn descriptor() -> ExecutionDescriptor {
        ExecutionDescriptor::new(
            vec!["example-cli".into(), "--input".into(), "in.txt".into()],
            Software::new("example-cli").with_version("1.2.3"),
            time(0),
            time(5),
            "alice",
        )
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain-token_1.txt"), "plain-token_1.txt");
        assert_eq!(shell_quote("with space"), "'with space'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_action_id_joins_argv() {
        let d = descriptor();
        assert_eq!(d.action_id(), "example-cli --input in.txt");
    }

    #[test]
    fn test_validate_unknown_role() {
        let d = descriptor().with_role("input", Role::Input);
        let err = d.validate().unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(err.to_string().contains("'input'"));
    }

    #[test]
    fn test_validate_empty_argv() {
        let mut d = descriptor();
        d.argv.clear();
        assert!(matches!(d.validate(), Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_validate_time_order() {
        let mut d = descriptor();
        d.end_time = time(0);
        d.start_time = time(5);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_io_paths_skip_absent_and_stdio() {
        let d = descriptor()
            .with_parameter("input", Parameter::single("in.txt").with_help("Input file"))
            .with_parameter("output", Parameter::single(STDIO_SENTINEL))
            .with_parameter("log", Parameter::absent())
            .with_parameter(
                "extra",
                Parameter::new(ParameterValue::Multiple(vec!["a.csv".into(), "b.csv".into()])),
            )
            .with_role("input", Role::Input)
            .with_role("output", Role::Output)
            .with_role("log", Role::Output)
            .with_role("extra", Role::Input);

        assert!(d.validate().is_ok());
        let paths: Vec<_> = d.io_paths().into_iter().map(|p| (p.path, p.role)).collect();
        assert_eq!(
            paths,
            vec![
                ("in.txt".to_string(), Role::Input),
                ("a.csv".to_string(), Role::Input),
                ("b.csv".to_string(), Role::Input),
            ]
        );
    }

    #[test]
    fn test_software_blank_version_is_unknown() {
        let software = Software::new("tool").with_version("  ");
        assert_eq!(software.version, None);
    }
}
