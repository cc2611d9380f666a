use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use motion_core::forms::{preset_label_options, priority_options, status_options, DropdownOption};
use motion_core::{Priority, Status};

#[derive(Parser, Debug)]
#[command(name = "motion")]
#[command(about = "Manage Motion tasks from the terminal")]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "MOTION_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    #[command(after_help = add_choices())]
    Add(AddArgs),
    /// Edit an existing task
    #[command(after_help = edit_choices())]
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// List tasks in the workspace
    List,
    /// Print one task as JSON
    Show { id: String },
    /// Delete a task
    Delete { id: String },
    /// List projects in the workspace
    Projects,
    /// Print the raw workspace listing
    Workspaces,
    /// List the labels defined on the workspace
    Labels,
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Task name
    pub name: String,

    #[arg(long, short)]
    pub description: Option<String>,

    /// Due date: YYYY-MM-DD (local midnight), RFC 3339, or "none"
    #[arg(long, value_parser = parse_due)]
    pub due: Option<Due>,

    #[arg(long, short)]
    pub priority: Option<Priority>,

    #[arg(long, short)]
    pub status: Option<Status>,

    #[arg(long, short)]
    pub label: Option<String>,

    /// Project id
    #[arg(long)]
    pub project: Option<String>,
}

/// Fields left out keep the task's current value. Pass an empty string to
/// clear the description.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    #[arg(long, short)]
    pub name: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    /// Due date: YYYY-MM-DD (local midnight), RFC 3339, or "none"
    #[arg(long, value_parser = parse_due)]
    pub due: Option<Due>,

    #[arg(long, short)]
    pub priority: Option<Priority>,

    #[arg(long, short)]
    pub status: Option<Status>,

    #[arg(long, short)]
    pub label: Option<String>,

    /// Project id
    #[arg(long)]
    pub project: Option<String>,
}

fn values(options: &[DropdownOption]) -> String {
    options
        .iter()
        .map(|option| option.value.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn edit_choices() -> String {
    format!(
        "Priorities: {}\nStatuses: {}",
        values(&priority_options(None)),
        values(&status_options(None))
    )
}

fn add_choices() -> String {
    let labels = preset_label_options();
    format!("{}\nLabels: {}", edit_choices(), values(&labels[1..]))
}

/// A parsed `--due` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    At(DateTime<Utc>),
    Cleared,
}

impl Due {
    pub fn into_date(self) -> Option<DateTime<Utc>> {
        match self {
            Due::At(at) => Some(at),
            Due::Cleared => None,
        }
    }
}

pub fn parse_due(value: &str) -> Result<Due, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(Due::Cleared);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(Due::At(at.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid due date `{value}`, expected YYYY-MM-DD or RFC 3339"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or_else(|| format!("`{value}` has no local midnight"))?;
    Ok(Due::At(midnight.with_timezone(&Utc)))
}
