use chrono::{DateTime, Utc};

use super::{non_empty, BusyFlag, DropdownOption, Navigator, Notifier, SubmitOutcome, Toast};
use crate::client::MotionClient;
use crate::http::Transport;
use crate::types::{Priority, Project, Status, Task};

/// Values collected by the edit form.
///
/// `description` is always sent, so clearing the field clears the
/// description on the service. Empty `label` and `project_id` mean "not set".
#[derive(Debug, Clone, PartialEq)]
pub struct EditTaskValues {
    pub name: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub label: String,
    pub project_id: String,
}

impl EditTaskValues {
    /// Seed the form from the task being edited.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            label: task.label.clone().unwrap_or_default(),
            project_id: task.project_id.clone().unwrap_or_default(),
        }
    }
}

/// Controller for the "edit task" form.
pub struct EditTaskForm<'a, T, H> {
    client: &'a MotionClient<T>,
    host: &'a H,
    task: Task,
    projects: Vec<Project>,
    labels: Vec<String>,
    on_task_updated: Box<dyn Fn(&Task) + 'a>,
    busy: BusyFlag,
}

impl<'a, T, H> EditTaskForm<'a, T, H>
where
    T: Transport,
    H: Notifier + Navigator,
{
    pub fn new(
        client: &'a MotionClient<T>,
        host: &'a H,
        task: Task,
        on_task_updated: impl Fn(&Task) + 'a,
    ) -> Self {
        Self {
            client,
            host,
            task,
            projects: Vec::new(),
            labels: Vec::new(),
            on_task_updated: Box::new(on_task_updated),
            busy: BusyFlag::default(),
        }
    }

    /// Load the project list and the workspace label set.
    ///
    /// Neither failure blocks the form: a project failure is reported to the
    /// user, a label failure just leaves the label list empty.
    pub fn mount(&mut self) {
        match self.client.get_projects() {
            Ok(projects) => self.projects = projects,
            Err(err) => {
                tracing::error!(error = %err, "error loading projects");
                self.host
                    .show_toast(Toast::failure("Failed to load projects", err.to_string()));
            }
        }

        match self.client.get_labels() {
            Ok(labels) => self.labels = labels,
            Err(err) => {
                tracing::warn!(error = %err, "error loading labels, continuing without them");
                self.labels = Vec::new();
            }
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn initial_values(&self) -> EditTaskValues {
        EditTaskValues::from_task(&self.task)
    }

    pub fn project_options(&self) -> Vec<DropdownOption> {
        super::project_options(&self.projects)
    }

    pub fn label_options(&self) -> Vec<DropdownOption> {
        super::label_options(&self.labels, "No Label")
    }

    pub fn is_loading(&self) -> bool {
        self.busy.is_busy()
    }

    /// The task as it will be sent for `values`.
    pub fn updated_task(&self, values: &EditTaskValues) -> Task {
        Task {
            id: self.task.id.clone(),
            name: values.name.clone(),
            description: Some(values.description.clone()),
            due_date: values.due_date,
            priority: values.priority,
            status: values.status,
            label: non_empty(&values.label),
            project_id: non_empty(&values.project_id),
            workspace_id: Some(self.client.get_workspace_id().to_string()),
            duration: self.task.duration,
        }
    }

    pub fn submit(&self, values: &EditTaskValues) -> SubmitOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::debug!("edit submit ignored, another is in flight");
            return SubmitOutcome::Busy;
        };

        match self.client.update_task(&self.updated_task(values)) {
            Ok(task) => {
                self.host.show_toast(Toast::success("Task updated"));
                (self.on_task_updated)(&task);
                self.host.pop();
                SubmitOutcome::Saved(task)
            }
            Err(err) => {
                tracing::error!(error = %err, "error updating task");
                let message = err.to_string();
                self.host
                    .show_toast(Toast::failure("Failed to update task", message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}
