//! In-memory argument source

use indexmap::IndexMap;
use runcrate_domain::{ArgumentSource, Parameter, ParameterValue};

/// A command line with its file parameters declared by hand
///
/// Used when the caller did its own argument parsing, and by the CLI's
/// `record` command where paths come from `--input`/`--output` flags.
///
/// # Examples
///
/// ```
/// use runcrate_domain::ArgumentSource;
/// use runcrate_recorder::StaticArguments;
///
/// let args = StaticArguments::new(["example-cli", "in.txt"])
///     .path("input", "in.txt")
///     .absent("output");
/// assert!(args.lookup("input").is_some());
/// assert!(args.lookup("unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticArguments {
    argv: Vec<String>,
    parameters: IndexMap<String, Parameter>,
    description: Option<String>,
}

impl StaticArguments {
    /// Create a source over `argv`, program name first
    pub fn new<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            parameters: IndexMap::new(),
            description: None,
        }
    }

    /// Declare a parameter
    pub fn parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Declare a parameter holding one path
    pub fn path(self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.parameter(name, Parameter::single(path))
    }

    /// Declare a parameter holding several paths; none at all is absent
    pub fn paths<I, T>(self, name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut tokens: Vec<String> = paths.into_iter().map(Into::into).collect();
        let value = match tokens.len() {
            0 => ParameterValue::Absent,
            1 => ParameterValue::Single(tokens.remove(0)),
            _ => ParameterValue::Multiple(tokens),
        };
        self.parameter(name, Parameter::new(value))
    }

    /// Declare a parameter that was not supplied
    pub fn absent(self, name: impl Into<String>) -> Self {
        self.parameter(name, Parameter::absent())
    }

    /// Set the program description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ArgumentSource for StaticArguments {
    fn argv(&self) -> Vec<String> {
        self.argv.clone()
    }

    fn lookup(&self, name: &str) -> Option<Parameter> {
        self.parameters.get(name).cloned()
    }

    fn program_description(&self) -> Option<String> {
        self.description.clone()
    }
}
