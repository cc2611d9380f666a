//! Resolution of the workspace id used for writes and scoped reads.
//!
//! Every write to the service must carry a workspace id, so the client asks a
//! `WorkspaceProvider` for it instead of trusting the caller's payload.

use crate::config::Preferences;

/// Supplies the single workspace id a client instance works in.
pub trait WorkspaceProvider: Send + Sync {
    fn workspace_id(&self) -> &str;
}

/// Workspace id chosen from preferences.
///
/// Uses the configured id, unless an override is set explicitly. An override
/// replaces the user's configuration for every request, so it is logged when
/// the selection is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSelection {
    configured: String,
    override_id: Option<String>,
}

impl WorkspaceSelection {
    pub fn new(configured: impl Into<String>, override_id: Option<String>) -> Self {
        let configured = configured.into();
        let override_id = override_id.filter(|id| !id.trim().is_empty());
        if let Some(forced) = override_id.as_deref() {
            if forced != configured {
                tracing::warn!(
                    configured = %configured,
                    override_id = %forced,
                    "workspace override replaces the configured workspace id"
                );
            }
        }
        Self {
            configured,
            override_id,
        }
    }

    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self::new(prefs.workspace_id.clone(), prefs.workspace_override.clone())
    }
}

impl WorkspaceProvider for WorkspaceSelection {
    fn workspace_id(&self) -> &str {
        self.override_id.as_deref().unwrap_or(&self.configured)
    }
}

/// A workspace id fixed at construction, regardless of preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWorkspace(pub String);

impl WorkspaceProvider for FixedWorkspace {
    fn workspace_id(&self) -> &str {
        &self.0
    }
}
