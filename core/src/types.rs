//! Domain types for the Motion API.
//!
//! # Design
//! Field names follow the service's camelCase JSON. Optional fields are
//! skipped when `None` so an unset value never reaches the service as `null`.
//! An explicitly empty string is still sent: the edit flow relies on that to
//! clear a description.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Labels offered when the workspace's own label set is not available.
pub const LABEL_PRESETS: &[&str] = &[
    "House",
    "Personal",
    "St Faith's",
    "Westside",
    "Goals",
    "BAU",
    "ACA",
    "Job hunt",
    "Boys",
    "Board",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Asap,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Asap];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Asap => "ASAP",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Asap => "ASAP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

/// Error returned when parsing an unknown priority or status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError { kind: "priority", value: s.to_string() })
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', ' '], "_");
        Status::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParseEnumError { kind: "status", value: s.to_string() })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel durations the service accepts in place of a number of minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationSentinel {
    None,
    Reminder,
}

/// Task duration: minutes, or one of the sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskDuration {
    Minutes(u32),
    Sentinel(DurationSentinel),
}

/// A task as the service represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TaskDuration>,
}

impl Task {
    /// A task with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            due_date: None,
            priority: None,
            status: None,
            label: None,
            project_id: None,
            workspace_id: None,
            duration: None,
        }
    }
}

/// Read a priority or status the service returned, as a string or as an
/// object with a `name`. Values outside the known set (such as `URGENT`) read
/// as unset, so they are never sent back on update.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Name(String),
        Named { name: String },
        Other(serde_json::Value),
    }

    let name = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::Name(name) | Raw::Named { name }) => name,
        Some(Raw::Other(value)) => {
            tracing::warn!(%value, "ignoring unreadable task field");
            return Ok(None);
        }
    };
    match name.parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            tracing::warn!(value = %name, "ignoring unrecognized task field value");
            Ok(None)
        }
    }
}

/// One element of a task listing.
///
/// Listings are normalized from several response shapes, and the last-resort
/// shape wraps whatever object the service returned. Elements that do not
/// look like a task are kept verbatim rather than failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskEntry {
    Task(Task),
    Unrecognized(serde_json::Value),
}

impl TaskEntry {
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            TaskEntry::Task(task) => Some(task),
            TaskEntry::Unrecognized(_) => None,
        }
    }
}

/// Caller input for `MotionClient::create_task`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub label: Option<String>,
    pub project_id: Option<String>,
    pub duration: Option<TaskDuration>,
}

impl CreateTaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_uses_camel_case_and_skips_unset_fields() {
        let mut task = Task::named("Write report");
        task.project_id = Some("p1".to_string());
        task.priority = Some(Priority::Asap);
        task.status = Some(Status::InProgress);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Write report",
                "projectId": "p1",
                "priority": "ASAP",
                "status": "IN_PROGRESS",
            })
        );
    }

    #[test]
    fn explicit_empty_description_is_serialized() {
        let mut task = Task::named("x");
        task.description = Some(String::new());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["description"], "");
    }

    #[test]
    fn duration_accepts_minutes_and_sentinels() {
        let minutes: TaskDuration = serde_json::from_str("30").unwrap();
        assert_eq!(minutes, TaskDuration::Minutes(30));
        let none: TaskDuration = serde_json::from_str(r#""NONE""#).unwrap();
        assert_eq!(none, TaskDuration::Sentinel(DurationSentinel::None));
        let reminder: TaskDuration = serde_json::from_str(r#""REMINDER""#).unwrap();
        assert_eq!(reminder, TaskDuration::Sentinel(DurationSentinel::Reminder));
        assert!(serde_json::from_str::<TaskDuration>(r#""LATER""#).is_err());
    }

    #[test]
    fn urgent_is_not_a_priority() {
        assert!(serde_json::from_str::<Priority>(r#""URGENT""#).is_err());
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn task_with_urgent_priority_still_reads() {
        let task: Task =
            serde_json::from_str(r#"{"id":"t1","name":"Old","priority":"URGENT","status":"DONE"}"#).unwrap();
        assert_eq!(task.priority, None);
        assert_eq!(task.status, Some(Status::Done));
        assert!(serde_json::to_value(&task).unwrap().get("priority").is_none());
    }

    #[test]
    fn status_object_reads_by_name() {
        let task: Task = serde_json::from_str(
            r#"{"name":"A","status":{"name":"In Progress","isDefaultStatus":false,"isResolvedStatus":false}}"#,
        )
        .unwrap();
        assert_eq!(task.status, Some(Status::InProgress));

        let task: Task =
            serde_json::from_str(r#"{"name":"B","status":{"name":"Blocked"},"priority":7}"#).unwrap();
        assert_eq!(task.status, None);
        assert_eq!(task.priority, None);
    }

    #[test]
    fn priority_and_status_parse_case_insensitively() {
        assert_eq!("asap".parse::<Priority>().unwrap(), Priority::Asap);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("DONE".parse::<Status>().unwrap(), Status::Done);
        let err = "later".parse::<Status>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status `later`");
    }

    #[test]
    fn task_entry_keeps_unrecognized_objects() {
        let entries: Vec<TaskEntry> =
            serde_json::from_str(r#"[{"id":"t1","name":"A"},{"foo":"bar"}]"#).unwrap();
        assert_eq!(entries[0].as_task().unwrap().name, "A");
        assert_eq!(
            entries[1],
            TaskEntry::Unrecognized(serde_json::json!({"foo": "bar"}))
        );
    }

    #[test]
    fn task_ignores_unknown_fields() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","name":"A","dueDate":"2026-10-19T00:00:00Z","creator":{"id":"u"}}"#,
        )
        .unwrap();
        assert_eq!(task.id.as_deref(), Some("t1"));
        assert_eq!(task.due_date.unwrap().to_rfc3339(), "2026-10-19T00:00:00+00:00");
    }
}
