//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use runcrate_domain::Entity;
use runcrate_recorder::RecordReport;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One recorded action, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSummary {
    /// Action id (the command line, possibly suffixed)
    pub id: String,
    /// Start timestamp as stored
    pub start_time: String,
    /// End timestamp as stored
    pub end_time: String,
    /// Person id
    pub agent: String,
    /// Software id
    pub instrument: String,
    /// Number of input files
    pub inputs: usize,
    /// Number of output files
    pub outputs: usize,
}

impl ActionSummary {
    /// Summarize a `CreateAction` node.
    pub fn from_entity(action: &Entity) -> Self {
        let first = |key: &str| action.references(key).into_iter().next().unwrap_or_default();
        Self {
            id: action.id.clone(),
            start_time: action.get_str("startTime").unwrap_or_default().to_string(),
            end_time: action.get_str("endTime").unwrap_or_default().to_string(),
            agent: first("agent"),
            instrument: first("instrument"),
            inputs: action.references("object").len(),
            outputs: action.references("result").len(),
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a recording.
    pub fn format_report(&self, report: &RecordReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "metadata_path": report.metadata_path.display().to_string(),
                "action_id": report.action_id,
                "files": report.files,
            }))?),
            OutputFormat::Table => Ok(self.success(&format!(
                "Recorded '{}' ({} file(s)) in {}",
                report.action_id,
                report.files.len(),
                report.metadata_path.display()
            ))),
            OutputFormat::Quiet => Ok(report.action_id.clone()),
        }
    }

    /// Format recorded command lines.
    pub fn format_commands(&self, commands: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(commands)?),
            OutputFormat::Table if commands.is_empty() => {
                Ok(self.colorize("No recorded commands.", "yellow"))
            }
            OutputFormat::Table | OutputFormat::Quiet => Ok(commands.join("\n")),
        }
    }

    /// Format action summaries.
    pub fn format_actions(&self, actions: &[ActionSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(actions)?),
            OutputFormat::Table => Ok(self.format_actions_table(actions)),
            OutputFormat::Quiet => Ok(actions
                .iter()
                .map(|a| a.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_actions_table(&self, actions: &[ActionSummary]) -> String {
        if actions.is_empty() {
            return self.colorize("No actions recorded.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Action", "Start", "End", "Agent", "Instrument", "In", "Out"]);

        for action in actions {
            builder.push_record([
                action.id.clone(),
                action.start_time.clone(),
                action.end_time.clone(),
                action.agent.clone(),
                action.instrument.clone(),
                action.inputs.to_string(),
                action.outputs.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn action() -> Entity {
        Entity::new("example-cli --input in.txt --output out.txt", "CreateAction")
            .with("startTime", "2026-01-16T12:00:00+00:00")
            .with("endTime", "2026-01-16T12:00:05+00:00")
            .with("agent", json!({"@id": "alice"}))
            .with("instrument", json!({"@id": "example-cli@1.2.3"}))
            .with("object", json!({"@id": "in.txt"}))
            .with("result", json!([{"@id": "out.txt"}, {"@id": "log.txt"}]))
    }

    fn report() -> RecordReport {
        RecordReport {
            metadata_path: PathBuf::from("/data/run/ro-crate-metadata.json"),
            action_id: "example-cli out.txt".into(),
            files: vec!["out.txt".into()],
        }
    }

    #[test]
    fn test_action_summary() {
        let summary = ActionSummary::from_entity(&action());
        assert_eq!(summary.agent, "alice");
        assert_eq!(summary.instrument, "example-cli@1.2.3");
        assert_eq!(summary.inputs, 1);
        assert_eq!(summary.outputs, 2);
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_actions(&[ActionSummary::from_entity(&action())])
            .unwrap();
        assert!(output.contains("Instrument"));
        assert!(output.contains("example-cli@1.2.3"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_actions(&[ActionSummary::from_entity(&action())])
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["agent"], "alice");
    }

    #[test]
    fn test_quiet_formats() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_report(&report()).unwrap(), "example-cli out.txt");
        assert_eq!(
            formatter.format_commands(&["a".into(), "b".into()]).unwrap(),
            "a\nb"
        );
    }

    #[test]
    fn test_empty_tables() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_actions(&[]).unwrap().contains("No actions"));
        assert!(formatter.format_commands(&[]).unwrap().contains("No recorded"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert!(formatter
            .format_report(&report())
            .unwrap()
            .starts_with("✓ Recorded 'example-cli out.txt'"));
    }
}
