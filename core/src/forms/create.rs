use chrono::{DateTime, Days, Local, Utc};

use super::{non_empty, BusyFlag, Notifier, SubmitOutcome, Toast};
use crate::client::MotionClient;
use crate::http::Transport;
use crate::types::{CreateTaskInput, Priority, Status};

/// Values collected by the create form.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskValues {
    pub name: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    pub label: String,
    pub project_id: String,
}

impl Default for CreateTaskValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            due_date: tomorrow_at_midnight(),
            priority: Priority::Medium,
            status: Status::Todo,
            label: String::new(),
            project_id: String::new(),
        }
    }
}

impl CreateTaskValues {
    /// Client payload. Empty optional fields are left unset.
    pub fn to_input(&self) -> CreateTaskInput {
        CreateTaskInput {
            title: self.name.clone(),
            description: non_empty(&self.description),
            due_date: self.due_date,
            priority: Some(self.priority),
            status: Some(self.status),
            label: non_empty(&self.label),
            project_id: non_empty(&self.project_id),
            duration: None,
        }
    }
}

/// Local midnight at the start of tomorrow, in UTC.
pub fn tomorrow_at_midnight() -> Option<DateTime<Utc>> {
    Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))?
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|midnight| midnight.with_timezone(&Utc))
}

/// Controller for the "create task" form.
pub struct CreateTaskForm<'a, T, N> {
    client: &'a MotionClient<T>,
    notifier: &'a N,
    busy: BusyFlag,
}

impl<'a, T: Transport, N: Notifier> CreateTaskForm<'a, T, N> {
    pub fn new(client: &'a MotionClient<T>, notifier: &'a N) -> Self {
        Self {
            client,
            notifier,
            busy: BusyFlag::default(),
        }
    }

    /// Defaults seeded into a fresh form.
    pub fn initial_values(&self) -> CreateTaskValues {
        CreateTaskValues::default()
    }

    /// Whether a submit is in flight.
    pub fn is_loading(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn submit(&self, values: &CreateTaskValues) -> SubmitOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::debug!("create submit ignored, another is in flight");
            return SubmitOutcome::Busy;
        };

        match self.client.create_task(&values.to_input()) {
            Ok(task) => {
                self.notifier.show_toast(
                    Toast::success("Task created")
                        .with_message(format!("\"{}\" has been added to Motion", values.name)),
                );
                SubmitOutcome::Saved(task)
            }
            Err(err) => {
                tracing::error!(error = %err, "error creating task");
                let message = err.to_string();
                self.notifier
                    .show_toast(Toast::failure("Failed to create task", message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Mutex;

    use chrono::Timelike;
    use serde_json::json;

    use super::*;
    use crate::config::Preferences;
    use crate::error::ApiError;
    use crate::forms::testing::RecordingHost;
    use crate::forms::ToastStyle;
    use crate::http::testing::ScriptedTransport;
    use crate::http::{HttpRequest, HttpResponse};

    fn prefs() -> Preferences {
        Preferences::new("key", "ws-1").with_base_url("http://localhost:3000/v1")
    }

    #[test]
    fn pay_rent_scenario_omits_empty_label_and_project() {
        let transport = ScriptedTransport::new()
            .respond(201, r#"{"id":"t1","name":"Pay rent","workspaceId":"ws-1"}"#);
        let client = MotionClient::with_transport(&prefs(), transport).unwrap();
        let host = RecordingHost::default();
        let form = CreateTaskForm::new(&client, &host);

        let due = tomorrow_at_midnight().unwrap();
        let values = CreateTaskValues {
            name: "Pay rent".to_string(),
            due_date: Some(due),
            ..form.initial_values()
        };
        let outcome = form.submit(&values);
        assert!(outcome.is_saved());

        let body = client.transport().last_body();
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert!(!keys.contains(&"label".to_string()));
        assert!(!keys.contains(&"projectId".to_string()));
        assert!(!keys.contains(&"description".to_string()));
        assert_eq!(body["name"], "Pay rent");
        assert_eq!(body["priority"], "MEDIUM");
        assert_eq!(body["status"], "TODO");
        assert_eq!(body["workspaceId"], "ws-1");
        assert_eq!(body["dueDate"], json!(due));

        let toast = host.last_toast();
        assert_eq!(toast.style, ToastStyle::Success);
        assert_eq!(toast.title, "Task created");
        assert!(toast.message.unwrap().contains("Pay rent"));
        assert!(!form.is_loading());
    }

    #[test]
    fn label_and_project_are_sent_when_chosen() {
        let transport = ScriptedTransport::new().respond(201, r#"{"id":"t1","name":"Gym"}"#);
        let client = MotionClient::with_transport(&prefs(), transport).unwrap();
        let host = RecordingHost::default();
        let form = CreateTaskForm::new(&client, &host);

        let values = CreateTaskValues {
            name: "Gym".to_string(),
            description: "Leg day".to_string(),
            priority: Priority::Asap,
            label: "Personal".to_string(),
            project_id: "p1".to_string(),
            ..CreateTaskValues::default()
        };
        form.submit(&values);

        let body = client.transport().last_body();
        assert_eq!(body["label"], "Personal");
        assert_eq!(body["projectId"], "p1");
        assert_eq!(body["description"], "Leg day");
        assert_eq!(body["priority"], "ASAP");
    }

    #[test]
    fn description_is_sent_as_typed() {
        let values = CreateTaskValues {
            name: "Minutes".to_string(),
            description: "  notes\n".to_string(),
            label: "   ".to_string(),
            ..CreateTaskValues::default()
        };
        let input = values.to_input();
        assert_eq!(input.description.as_deref(), Some("  notes\n"));
        assert_eq!(input.label, None);
    }

    #[test]
    fn failure_shows_error_and_keeps_values() {
        let transport = ScriptedTransport::new().respond(401, r#"{"message":"Unauthorized"}"#);
        let client = MotionClient::with_transport(&prefs(), transport).unwrap();
        let host = RecordingHost::default();
        let form = CreateTaskForm::new(&client, &host);

        let values = CreateTaskValues {
            name: "Pay rent".to_string(),
            ..CreateTaskValues::default()
        };
        let before = values.clone();
        let outcome = form.submit(&values);

        let SubmitOutcome::Failed(message) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(message.starts_with("failed to create task: 401 Unauthorized"));
        let toast = host.last_toast();
        assert_eq!(toast.style, ToastStyle::Failure);
        assert_eq!(toast.title, "Failed to create task");
        assert_eq!(toast.message.as_deref(), Some(message.as_str()));
        assert_eq!(values, before);
        assert!(!form.is_loading());
    }

    #[test]
    fn defaults_match_form_seed() {
        let values = CreateTaskValues::default();
        assert_eq!(values.priority, Priority::Medium);
        assert_eq!(values.status, Status::Todo);
        let due = values.due_date.unwrap().with_timezone(&Local);
        assert_eq!((due.hour(), due.minute(), due.second()), (0, 0, 0));
        assert!(due > Local::now());
    }

    /// Blocks inside `execute` until released, so a second submit can be
    /// attempted while the first is in flight.
    struct GateTransport {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Transport for GateTransport {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(HttpResponse {
                status: 201,
                body: r#"{"id":"t1","name":"Slow"}"#.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct SharedNotifier(Mutex<Vec<Toast>>);

    impl Notifier for SharedNotifier {
        fn show_toast(&self, toast: Toast) {
            self.0.lock().unwrap().push(toast);
        }
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let transport = GateTransport {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let client = MotionClient::with_transport(&prefs(), transport).unwrap();
        let notifier = SharedNotifier::default();
        let form = CreateTaskForm::new(&client, &notifier);
        let values = CreateTaskValues {
            name: "Slow".to_string(),
            ..CreateTaskValues::default()
        };

        std::thread::scope(|scope| {
            let first = scope.spawn(|| form.submit(&values));
            entered_rx.recv().unwrap();
            assert!(form.is_loading());
            assert_eq!(form.submit(&values), SubmitOutcome::Busy);
            release_tx.send(()).unwrap();
            assert!(first.join().unwrap().is_saved());
        });

        assert!(!form.is_loading());
        assert_eq!(notifier.0.lock().unwrap().len(), 1);
    }
}
