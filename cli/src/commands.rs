//! One function per subcommand. Plain listings go to `out`; the form-driven
//! commands report through the `TerminalHost` and return whether the task
//! was saved.

use std::io::Write;

use anyhow::{bail, Result};
use motion_core::forms::{
    preset_label_options, CreateTaskForm, EditTaskForm, EditTaskValues, SubmitOutcome,
};
use motion_core::{MotionClient, Task, TaskEntry, Transport};

use crate::args::{AddArgs, EditArgs};
use crate::host::TerminalHost;

pub fn add<T, O, E>(client: &MotionClient<T>, host: &TerminalHost<O, E>, args: AddArgs) -> Result<bool>
where
    T: Transport,
    O: Write,
    E: Write,
{
    if let Some(label) = args.label.as_deref().filter(|l| !l.is_empty()) {
        let presets = preset_label_options();
        if !presets.iter().any(|option| option.value == label) {
            let names: Vec<_> = presets.iter().skip(1).map(|o| o.title.as_str()).collect();
            bail!("unknown label `{label}`, choose one of: {}", names.join(", "));
        }
    }

    let form = CreateTaskForm::new(client, host);
    let mut values = form.initial_values();
    values.name = args.name;
    if let Some(description) = args.description {
        values.description = description;
    }
    if let Some(due) = args.due {
        values.due_date = due.into_date();
    }
    if let Some(priority) = args.priority {
        values.priority = priority;
    }
    if let Some(status) = args.status {
        values.status = status;
    }
    if let Some(label) = args.label {
        values.label = label;
    }
    if let Some(project) = args.project {
        values.project_id = project;
    }

    Ok(finish(form.submit(&values)))
}

pub fn edit<T, O, E>(
    client: &MotionClient<T>,
    host: &TerminalHost<O, E>,
    id: &str,
    args: EditArgs,
) -> Result<bool>
where
    T: Transport,
    O: Write,
    E: Write,
{
    let task = client.get_task_by_id(id)?;
    let mut form = EditTaskForm::new(client, host, task, |updated| {
        tracing::info!(id = updated.id.as_deref().unwrap_or_default(), "task updated");
    });
    form.mount();

    if let Some(label) = args.label.as_deref().filter(|l| !l.is_empty()) {
        if !form.labels().is_empty() && !form.labels().iter().any(|known| known == label) {
            bail!("unknown label `{label}`, choose one of: {}", form.labels().join(", "));
        }
    }
    if let Some(project) = args.project.as_deref().filter(|p| !p.is_empty()) {
        if !form.projects().is_empty() && !form.projects().iter().any(|known| known.id == project) {
            bail!("unknown project `{project}`, run `motion projects` to list them");
        }
    }

    let values = apply_edits(form.initial_values(), args);
    Ok(finish(form.submit(&values)))
}

fn apply_edits(mut values: EditTaskValues, args: EditArgs) -> EditTaskValues {
    if let Some(name) = args.name {
        values.name = name;
    }
    if let Some(description) = args.description {
        values.description = description;
    }
    if let Some(due) = args.due {
        values.due_date = due.into_date();
    }
    if args.priority.is_some() {
        values.priority = args.priority;
    }
    if args.status.is_some() {
        values.status = args.status;
    }
    if let Some(label) = args.label {
        values.label = label;
    }
    if let Some(project) = args.project {
        values.project_id = project;
    }
    values
}

fn finish(outcome: SubmitOutcome) -> bool {
    match outcome {
        SubmitOutcome::Saved(_) => true,
        SubmitOutcome::Failed(message) => {
            tracing::debug!(%message, "submit failed");
            false
        }
        SubmitOutcome::Busy => {
            tracing::warn!("submit skipped, another is in flight");
            false
        }
    }
}

pub fn list<T: Transport>(client: &MotionClient<T>, out: &mut impl Write) -> Result<()> {
    let entries = client.get_tasks()?;
    if entries.is_empty() {
        writeln!(out, "No tasks")?;
    }
    for entry in &entries {
        match entry {
            TaskEntry::Task(task) => writeln!(out, "{}", task_line(task))?,
            TaskEntry::Unrecognized(raw) => writeln!(out, "?\t{raw}")?,
        }
    }
    Ok(())
}

pub fn show<T: Transport>(client: &MotionClient<T>, id: &str, out: &mut impl Write) -> Result<()> {
    let task = client.get_task_by_id(id)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?;
    Ok(())
}

pub fn delete<T: Transport>(client: &MotionClient<T>, id: &str, out: &mut impl Write) -> Result<()> {
    client.delete_task(id)?;
    writeln!(out, "Deleted task {id}")?;
    Ok(())
}

pub fn projects<T: Transport>(client: &MotionClient<T>, out: &mut impl Write) -> Result<()> {
    for project in client.get_projects()? {
        writeln!(out, "{}\t{}", project.id, project.name)?;
    }
    Ok(())
}

pub fn workspaces<T: Transport>(client: &MotionClient<T>, out: &mut impl Write) -> Result<()> {
    let listing = client.get_workspaces()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&listing)?)?;
    Ok(())
}

pub fn labels<T: Transport>(client: &MotionClient<T>, out: &mut impl Write) -> Result<()> {
    for label in client.get_labels()? {
        writeln!(out, "{label}")?;
    }
    Ok(())
}

/// `id  name  status  priority  due  label`, with `-` for unset fields.
fn task_line(task: &Task) -> String {
    let dash = || "-".to_string();
    [
        task.id.clone().unwrap_or_else(dash),
        task.name.clone(),
        task.status.map(|s| s.title().to_string()).unwrap_or_else(dash),
        task.priority.map(|p| p.title().to_string()).unwrap_or_else(dash),
        task.due_date
            .map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(dash),
        task.label.clone().unwrap_or_else(dash),
    ]
    .join("\t")
}
