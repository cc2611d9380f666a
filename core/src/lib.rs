//! Client core for the Motion task service.
//!
//! # Overview
//! `MotionClient` wraps the service's REST API: it builds authenticated
//! requests, injects the workspace id into every write, and normalizes the
//! service's varying list shapes into typed results. The `forms` module
//! layers the create/edit flows on top, talking to the host application only
//! through small traits.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`/`HttpResponse`);
//!   `build_*`/`parse_*` methods are pure and the `Transport` trait performs
//!   the I/O.
//! - Preferences are passed in at construction. The workspace id comes from a
//!   `WorkspaceProvider`, never from the caller's payload.
//! - One request per call: no retries, caching, or pagination.

pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod normalize;
pub mod types;
pub mod workspace;

pub use client::{workspace_labels, MotionClient, WORKSPACE_ENDPOINTS};
pub use config::{ConfigError, Preferences};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    CreateTaskInput, DurationSentinel, Priority, Project, Status, Task, TaskDuration, TaskEntry,
    LABEL_PRESETS,
};
pub use workspace::{FixedWorkspace, WorkspaceProvider, WorkspaceSelection};
