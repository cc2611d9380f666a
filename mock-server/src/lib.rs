//! In-memory stand-in for the subset of the Motion API the client uses.
//!
//! Tasks are listed wrapped as `{"tasks": [...], "meta": {...}}` and projects
//! as `{"projects": [...]}`, like the real service. The `/workspaces` route
//! can be switched off so callers can exercise fallback to `/organizations`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY: &str = "test-api-key";
pub const WORKSPACE_ID: &str = "ws-test";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
}

/// Body accepted by create and update. Only present fields are applied on
/// update.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub label: Option<String>,
    pub project_id: Option<String>,
    pub workspace_id: Option<String>,
    pub duration: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub labels: Vec<Label>,
}

/// Seed data and switches for a mock instance.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    pub workspaces: Vec<Workspace>,
    pub projects: Vec<Project>,
    /// When false, `/v1/workspaces` answers 404.
    pub serve_workspaces_route: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY.to_string(),
            workspaces: vec![Workspace {
                id: WORKSPACE_ID.to_string(),
                name: "Test workspace".to_string(),
                labels: ["House", "BAU", "Goals"]
                    .into_iter()
                    .map(|name| Label { name: name.to_string() })
                    .collect(),
            }],
            projects: vec![
                Project {
                    id: "proj-home".to_string(),
                    name: "Home".to_string(),
                    workspace_id: WORKSPACE_ID.to_string(),
                },
                Project {
                    id: "proj-work".to_string(),
                    name: "Work".to_string(),
                    workspace_id: WORKSPACE_ID.to_string(),
                },
            ],
            serve_workspaces_route: true,
        }
    }
}

pub type Db = Arc<RwLock<HashMap<String, Task>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    config: Arc<MockConfig>,
}

#[derive(Deserialize)]
pub struct WorkspaceQuery {
    #[serde(rename = "workspaceId")]
    pub workspace_id: Option<String>,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        config: Arc::new(config),
    };
    let api = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/projects", get(list_projects))
        .route("/workspaces", get(list_workspaces))
        .route("/organizations", get(list_organizations))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));
    Router::new().nest("/v1", api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if key != Some(state.config.api_key.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(request).await
}

fn known_workspace(state: &AppState, workspace_id: Option<&str>) -> Result<String, Response> {
    let Some(workspace_id) = workspace_id.filter(|id| !id.is_empty()) else {
        return Err(error(StatusCode::BAD_REQUEST, "workspaceId is required"));
    };
    if !state.config.workspaces.iter().any(|ws| ws.id == workspace_id) {
        return Err(error(StatusCode::BAD_REQUEST, "workspaceId does not exist"));
    }
    Ok(workspace_id.to_string())
}

async fn list_tasks(State(state): State<AppState>, Query(query): Query<WorkspaceQuery>) -> Response {
    let workspace_id = match known_workspace(&state, query.workspace_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let tasks: Vec<Task> = state
        .db
        .read()
        .await
        .values()
        .filter(|task| task.workspace_id == workspace_id)
        .cloned()
        .collect();
    let count = tasks.len();
    Json(json!({ "tasks": tasks, "meta": { "pageSize": count } })).into_response()
}

async fn create_task(State(state): State<AppState>, Json(input): Json<TaskInput>) -> Response {
    let workspace_id = match known_workspace(&state, input.workspace_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(name) = input.name.filter(|name| !name.trim().is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "name is required");
    };
    let task = Task {
        id: Uuid::new_v4().simple().to_string(),
        name,
        description: input.description,
        due_date: input.due_date,
        priority: input.priority,
        status: input.status,
        label: input.label,
        project_id: input.project_id,
        workspace_id,
        duration: input.duration,
    };
    state.db.write().await.insert(task.id.clone(), task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WorkspaceQuery>,
) -> Response {
    let tasks = state.db.read().await;
    match tasks.get(&id) {
        Some(task) if in_scope(task, &query) => Json(task.clone()).into_response(),
        _ => error(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Response {
    let workspace_id = match known_workspace(&state, input.workspace_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let mut tasks = state.db.write().await;
    let Some(task) = tasks.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    if let Some(name) = input.name {
        task.name = name;
    }
    if let Some(description) = input.description {
        task.description = Some(description);
    }
    if let Some(due_date) = input.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(priority) = input.priority {
        task.priority = Some(priority);
    }
    if let Some(status) = input.status {
        task.status = Some(status);
    }
    if let Some(label) = input.label {
        task.label = Some(label);
    }
    if let Some(project_id) = input.project_id {
        task.project_id = Some(project_id);
    }
    if let Some(duration) = input.duration {
        task.duration = Some(duration);
    }
    task.workspace_id = workspace_id;
    Json(task.clone()).into_response()
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<WorkspaceQuery>,
) -> Response {
    let mut tasks = state.db.write().await;
    if !tasks.get(&id).is_some_and(|task| in_scope(task, &query)) {
        return error(StatusCode::NOT_FOUND, "Task not found");
    }
    tasks.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_projects(State(state): State<AppState>, Query(query): Query<WorkspaceQuery>) -> Response {
    let workspace_id = match known_workspace(&state, query.workspace_id.as_deref()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let projects: Vec<&Project> = state
        .config
        .projects
        .iter()
        .filter(|project| project.workspace_id == workspace_id)
        .collect();
    Json(json!({ "projects": projects, "meta": {} })).into_response()
}

async fn list_workspaces(State(state): State<AppState>) -> Response {
    if !state.config.serve_workspaces_route {
        return error(StatusCode::NOT_FOUND, "Cannot GET /v1/workspaces");
    }
    Json(json!({ "workspaces": state.config.workspaces, "meta": {} })).into_response()
}

async fn list_organizations(State(state): State<AppState>) -> Response {
    Json(json!({ "workspaces": state.config.workspaces })).into_response()
}

/// Reads may omit the workspace; when given it must match.
fn in_scope(task: &Task, query: &WorkspaceQuery) -> bool {
    query
        .workspace_id
        .as_deref()
        .map_or(true, |workspace_id| workspace_id == task.workspace_id)
}
