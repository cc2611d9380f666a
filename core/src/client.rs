//! Motion API client.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, both
//! free of I/O. The high-level methods (`create_task`, `get_tasks`, ...) run
//! the pair through the client's `Transport` and trace both sides of the
//! exchange.
//!
//! Writes never trust the caller's `workspaceId`: the client's
//! `WorkspaceProvider` supplies it for every write and every scoped read.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::Preferences;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::normalize::{normalize_list, PROJECT_LIST_SHAPES, TASK_LIST_SHAPES, WORKSPACE_LIST_SHAPES};
use crate::types::{CreateTaskInput, Project, Task, TaskEntry};
use crate::workspace::{WorkspaceProvider, WorkspaceSelection};

/// Candidate endpoints for workspace information, tried in order.
pub const WORKSPACE_ENDPOINTS: &[&str] = &["workspaces", "organizations"];

const API_KEY_HEADER: &str = "X-API-Key";

const CREATE_TASK: &str = "create task";
const GET_TASKS: &str = "get tasks";
const GET_TASK: &str = "get task";
const UPDATE_TASK: &str = "update task";
const DELETE_TASK: &str = "delete task";
const GET_PROJECTS: &str = "get projects";
const GET_WORKSPACES: &str = "get workspace information from any endpoint";

/// Client for the Motion REST API.
pub struct MotionClient<T = UreqTransport> {
    base_url: Url,
    api_key: String,
    workspace: Arc<dyn WorkspaceProvider>,
    transport: T,
}

impl MotionClient<UreqTransport> {
    /// Client over the default blocking transport.
    pub fn new(prefs: &Preferences) -> Result<Self, ApiError> {
        Self::with_transport(prefs, UreqTransport::new())
    }
}

impl<T: Transport> MotionClient<T> {
    pub fn with_transport(prefs: &Preferences, transport: T) -> Result<Self, ApiError> {
        let base_url = Url::parse(prefs.base_url.trim())
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", prefs.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(prefs.base_url.clone()));
        }
        Ok(Self {
            base_url,
            api_key: prefs.api_key.clone(),
            workspace: Arc::new(WorkspaceSelection::from_preferences(prefs)),
            transport,
        })
    }

    /// Replace the workspace resolution strategy.
    pub fn with_workspace_provider(mut self, provider: impl WorkspaceProvider + 'static) -> Self {
        self.workspace = Arc::new(provider);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The workspace id used for all writes and scoped reads.
    pub fn get_workspace_id(&self) -> &str {
        self.workspace.workspace_id()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn create_task(&self, input: &CreateTaskInput) -> Result<Task, ApiError> {
        let request = self.build_create_task(input)?;
        self.parse_create_task(self.execute(&request)?)
    }

    pub fn get_tasks(&self) -> Result<Vec<TaskEntry>, ApiError> {
        let request = self.build_get_tasks()?;
        self.parse_get_tasks(self.execute(&request)?)
    }

    pub fn get_task_by_id(&self, id: &str) -> Result<Task, ApiError> {
        let request = self.build_get_task(id)?;
        self.parse_get_task(self.execute(&request)?)
    }

    pub fn update_task(&self, task: &Task) -> Result<Task, ApiError> {
        let request = self.build_update_task(task)?;
        self.parse_update_task(self.execute(&request)?)
    }

    pub fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let request = self.build_delete_task(id)?;
        self.parse_delete_task(self.execute(&request)?)
    }

    pub fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        let request = self.build_get_projects()?;
        self.parse_get_projects(self.execute(&request)?)
    }

    /// Probe `WORKSPACE_ENDPOINTS` in order and return the first successful
    /// body. Fails only when every candidate failed.
    pub fn get_workspaces(&self) -> Result<Value, ApiError> {
        let mut last_failure = None;

        for endpoint in WORKSPACE_ENDPOINTS {
            let request = self.build_get_workspaces(endpoint)?;
            let result = self
                .execute(&request)
                .and_then(|response| self.parse_get_workspaces(response));
            match result {
                Ok(body) => {
                    tracing::debug!(endpoint, "workspace endpoint answered");
                    return Ok(body);
                }
                Err(err) => {
                    tracing::warn!(endpoint, error = %err, "workspace endpoint failed, trying next");
                    last_failure = Some(err);
                }
            }
        }

        // A last failure without a status (transport, decoding) is returned as is.
        Err(match last_failure {
            Some(ApiError::RequestFailed { status, body, .. }) => ApiError::RequestFailed {
                operation: GET_WORKSPACES,
                status,
                body,
            },
            Some(other) => other,
            None => ApiError::Transport("no workspace endpoints to try".to_string()),
        })
    }

    /// Labels defined on this client's workspace.
    pub fn get_labels(&self) -> Result<Vec<String>, ApiError> {
        let listing = self.get_workspaces()?;
        Ok(workspace_labels(&listing, self.get_workspace_id()))
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create_task(&self, input: &CreateTaskInput) -> Result<HttpRequest, ApiError> {
        let task = Task {
            id: None,
            name: input.title.clone(),
            description: input.description.clone(),
            due_date: input.due_date,
            priority: input.priority,
            status: input.status,
            label: input.label.clone(),
            project_id: input.project_id.clone(),
            workspace_id: Some(self.get_workspace_id().to_string()),
            duration: input.duration,
        };
        let url = self.endpoint(&["tasks"], false)?;
        self.json_request(HttpMethod::Post, url, &task)
    }

    pub fn build_get_tasks(&self) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["tasks"], true)?;
        Ok(self.request(HttpMethod::Get, url))
    }

    pub fn build_get_task(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["tasks", require_id(id)?], true)?;
        Ok(self.request(HttpMethod::Get, url))
    }

    pub fn build_update_task(&self, task: &Task) -> Result<HttpRequest, ApiError> {
        let id = require_id(task.id.as_deref().unwrap_or_default())?;
        let mut payload = task.clone();
        payload.workspace_id = Some(self.get_workspace_id().to_string());
        let url = self.endpoint(&["tasks", id], false)?;
        self.json_request(HttpMethod::Put, url, &payload)
    }

    pub fn build_delete_task(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["tasks", require_id(id)?], true)?;
        Ok(self.request(HttpMethod::Delete, url))
    }

    pub fn build_get_projects(&self) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["projects"], true)?;
        Ok(self.request(HttpMethod::Get, url))
    }

    pub fn build_get_workspaces(&self, endpoint: &str) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&[endpoint], false)?;
        Ok(self.request(HttpMethod::Get, url))
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, CREATE_TASK)?;
        parse_json(&response.body)
    }

    pub fn parse_get_tasks(&self, response: HttpResponse) -> Result<Vec<TaskEntry>, ApiError> {
        check_status(&response, GET_TASKS)?;
        let body: Value = parse_json(&response.body)?;
        normalize_list(body, TASK_LIST_SHAPES)
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| ApiError::Deserialization(e.to_string())))
            .collect()
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, GET_TASK)?;
        parse_json(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, UPDATE_TASK)?;
        parse_json(&response.body)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, DELETE_TASK)
    }

    pub fn parse_get_projects(&self, response: HttpResponse) -> Result<Vec<Project>, ApiError> {
        check_status(&response, GET_PROJECTS)?;
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let body: Value = parse_json(&response.body)?;
        normalize_list(body, PROJECT_LIST_SHAPES)
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| ApiError::Deserialization(e.to_string())))
            .collect()
    }

    pub fn parse_get_workspaces(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, GET_WORKSPACES)?;
        parse_json(&response.body)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str], scoped: bool) -> Result<String, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if scoped {
            url.query_pairs_mut()
                .append_pair("workspaceId", self.get_workspace_id());
        }
        Ok(url.into())
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![(API_KEY_HEADER.to_string(), self.api_key.clone())],
            body: None,
        }
    }

    fn json_request<B: serde::Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let mut request = self.request(method, url);
        request
            .headers
            .insert(0, ("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(serde_json::to_string(body)?);
        Ok(request)
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            headers = ?redacted_headers(request),
            body = request.body.as_deref().unwrap_or(""),
            "request"
        );
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, body = %response.body, "response");
        Ok(response)
    }
}

impl<T> fmt::Debug for MotionClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionClient")
            .field("base_url", &self.base_url.as_str())
            .field("workspace_id", &self.workspace.workspace_id())
            .finish_non_exhaustive()
    }
}

/// Extract the label set of `workspace_id` from a workspace listing.
///
/// Accepts the listing bare or wrapped, and label entries given either as
/// strings or as objects with a `name`.
pub fn workspace_labels(listing: &Value, workspace_id: &str) -> Vec<String> {
    let workspaces = normalize_list(listing.clone(), WORKSPACE_LIST_SHAPES);
    let Some(workspace) = workspaces
        .iter()
        .find(|ws| ws.get("id").and_then(Value::as_str) == Some(workspace_id))
    else {
        tracing::debug!(workspace_id, "workspace not present in listing");
        return Vec::new();
    };

    workspace
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| match label {
                    Value::String(name) => Some(name.clone()),
                    Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn require_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::MissingTaskId);
    }
    Ok(id)
}

fn redacted_headers(request: &HttpRequest) -> Vec<(&str, &str)> {
    request
        .headers
        .iter()
        .map(|(key, value)| {
            if key.eq_ignore_ascii_case(API_KEY_HEADER) {
                (key.as_str(), "<redacted>")
            } else {
                (key.as_str(), value.as_str())
            }
        })
        .collect()
}

/// Map a non-2xx status to `RequestFailed`.
fn check_status(response: &HttpResponse, operation: &'static str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::debug!(operation, status = response.status, "request failed");
    Err(ApiError::request_failed(operation, response.status, &response.body))
}

fn parse_json<D: DeserializeOwned>(body: &str) -> Result<D, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
