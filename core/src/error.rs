//! Error types for the Motion API client.
//!
//! # Design
//! Every non-2xx response from the service becomes `RequestFailed`, carrying
//! the status code and the response body (when there is one) so the
//! message shown to the user is enough to diagnose the problem. The remaining
//! variants cover failures that happen before or after the HTTP exchange.

use thiserror::Error;

/// Errors returned by `MotionClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("failed to {operation}: {}{}", status_text(.status), body_suffix(.body))]
    RequestFailed {
        operation: &'static str,
        status: u16,
        body: Option<String>,
    },

    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The configured base URL cannot have API paths appended to it.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// A task operation was given no identifier (or a blank one).
    #[error("task id is missing")]
    MissingTaskId,
}

impl ApiError {
    /// Build a `RequestFailed` from a raw status code and response body.
    /// Blank bodies are dropped.
    pub fn request_failed(operation: &'static str, status: u16, body: &str) -> Self {
        let body = body.trim();
        ApiError::RequestFailed {
            operation,
            status,
            body: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// HTTP status code carried by a `RequestFailed`, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// `"<code> <reason>"` when the code has a canonical reason phrase.
fn status_text(status: &u16) -> String {
    let reason = ureq::http::StatusCode::from_u16(*status)
        .ok()
        .and_then(|code| code.canonical_reason());
    match reason {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" - {body}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_includes_reason_and_body() {
        let err = ApiError::request_failed("create task", 400, r#"{"message":"bad"}"#);
        assert_eq!(
            err.to_string(),
            r#"failed to create task: 400 Bad Request - {"message":"bad"}"#
        );
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn status_is_kept_as_a_code() {
        let err = ApiError::request_failed("get task", 404, "gone");
        assert!(matches!(err, ApiError::RequestFailed { status: 404, .. }));
        assert_eq!(err.to_string(), "failed to get task: 404 Not Found - gone");
    }

    #[test]
    fn request_failed_drops_blank_body() {
        let err = ApiError::request_failed("delete task", 404, "  \n");
        assert_eq!(err.to_string(), "failed to delete task: 404 Not Found");
        assert!(err.is_not_found());
    }

    #[test]
    fn unknown_status_code_has_no_reason() {
        let err = ApiError::request_failed("get tasks", 599, "");
        assert_eq!(err.to_string(), "failed to get tasks: 599");
        assert_eq!(err.status_code(), Some(599));
    }

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(ApiError::MissingTaskId.status_code(), None);
        assert_eq!(ApiError::Transport("refused".into()).status_code(), None);
    }
}
