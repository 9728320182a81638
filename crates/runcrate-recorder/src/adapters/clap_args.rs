//! Argument source over a clap parse

use clap::{Arg, ArgMatches, Command};
use runcrate_domain::{ArgumentSource, Parameter, ParameterValue};
use std::env;

/// Parameters read from a clap `Command` and the `ArgMatches` it produced
///
/// Values are read raw, so arguments parsed into `PathBuf` or any other type
/// are reported with the tokens the user typed. Defaults count as values.
/// When a subcommand is active its arguments shadow the parent's.
///
/// # Examples
///
/// ```
/// use clap::{Arg, Command};
/// use runcrate_domain::{ArgumentSource, ParameterValue};
/// use runcrate_recorder::ClapArguments;
///
/// let command = Command::new("example-cli")
///     .about("Converts files")
///     .arg(Arg::new("input").long("input").help("Input file"));
/// let argv = ["example-cli", "--input", "in.txt"];
/// let matches = command.clone().try_get_matches_from(argv).unwrap();
///
/// let args = ClapArguments::new(&command, &matches, argv);
/// let input = args.lookup("input").unwrap();
/// assert_eq!(input.value, ParameterValue::Single("in.txt".into()));
/// assert_eq!(input.help.as_deref(), Some("Input file"));
/// ```
#[derive(Debug, Clone)]
pub struct ClapArguments<'a> {
    command: &'a Command,
    matches: &'a ArgMatches,
    argv: Vec<String>,
}

impl<'a> ClapArguments<'a> {
    /// Wrap a parse of `argv`
    pub fn new<I, T>(command: &'a Command, matches: &'a ArgMatches, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            command,
            matches,
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Wrap a parse of the process's own command line
    pub fn from_env(command: &'a Command, matches: &'a ArgMatches) -> Self {
        Self::new(command, matches, env::args())
    }

    /// Command/matches pairs from the top level down to the active subcommand
    fn levels(&self) -> Vec<(&'a Command, &'a ArgMatches)> {
        let mut levels = vec![(self.command, self.matches)];
        let mut current = (self.command, self.matches);
        while let Some((name, sub_matches)) = current.1.subcommand() {
            match current.0.find_subcommand(name) {
                Some(sub_command) => {
                    current = (sub_command, sub_matches);
                    levels.push(current);
                }
                None => break,
            }
        }
        levels
    }
}

fn read_parameter(arg: &Arg, matches: &ArgMatches) -> Parameter {
    let id = arg.get_id().as_str();
    let mut tokens: Vec<String> = match matches.try_get_raw(id) {
        Ok(Some(raw)) => raw.map(|v| v.to_string_lossy().into_owned()).collect(),
        _ => Vec::new(),
    };

    let value = match tokens.len() {
        0 => ParameterValue::Absent,
        1 => ParameterValue::Single(tokens.remove(0)),
        _ => ParameterValue::Multiple(tokens),
    };
    let help = arg
        .get_help()
        .or_else(|| arg.get_long_help())
        .map(|help| help.to_string());

    Parameter { value, help }
}

impl ArgumentSource for ClapArguments<'_> {
    fn argv(&self) -> Vec<String> {
        self.argv.clone()
    }

    fn lookup(&self, name: &str) -> Option<Parameter> {
        self.levels().into_iter().rev().find_map(|(command, matches)| {
            command
                .get_arguments()
                .find(|arg| arg.get_id().as_str() == name)
                .map(|arg| read_parameter(arg, matches))
        })
    }

    fn program_name(&self) -> Option<String> {
        Some(self.command.get_name().to_string())
    }

    fn program_description(&self) -> Option<String> {
        self.command
            .get_about()
            .or_else(|| self.command.get_long_about())
            .map(|about| about.to_string())
    }
}
