//! Client preferences: API key, workspace, and service location.
//!
//! Preferences come from a TOML document, with environment variables taking
//! precedence field by field. They are handed to `MotionClient` at
//! construction; nothing in the crate reads them from global state.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.usemotion.com/v1";

pub const ENV_API_KEY: &str = "MOTION_API_KEY";
pub const ENV_WORKSPACE_ID: &str = "MOTION_WORKSPACE_ID";
pub const ENV_WORKSPACE_OVERRIDE: &str = "MOTION_WORKSPACE_OVERRIDE";
pub const ENV_BASE_URL: &str = "MOTION_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

/// Resolved preferences.
#[derive(Clone, PartialEq, Eq)]
pub struct Preferences {
    pub api_key: String,
    pub workspace_id: String,
    pub workspace_override: Option<String>,
    pub base_url: String,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("api_key", &"<redacted>")
            .field("workspace_id", &self.workspace_id)
            .field("workspace_override", &self.workspace_override)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// On-disk form; every field may be left to the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PreferencesFile {
    api_key: Option<String>,
    workspace_id: Option<String>,
    workspace_override: Option<String>,
    base_url: Option<String>,
}

impl Preferences {
    pub fn new(api_key: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
            workspace_override: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_workspace_override(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_override = Some(workspace_id.into());
        self
    }

    /// Parse a TOML document, without consulting the environment.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: PreferencesFile = toml::from_str(contents)?;
        file.resolve(|_| None)
    }

    /// Load preferences from `path` (if it exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like `load`, with an explicit environment lookup.
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                toml::from_str(&contents)?
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "config file not found, using environment only");
                PreferencesFile::default()
            }
            None => PreferencesFile::default(),
        };
        file.resolve(env)
    }
}

impl PreferencesFile {
    fn resolve(self, env: impl Fn(&str) -> Option<String>) -> Result<Preferences, ConfigError> {
        let pick = |key: &str, fallback: Option<String>| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback)
                .filter(|value| !value.trim().is_empty())
        };

        let api_key = pick(ENV_API_KEY, self.api_key).ok_or(ConfigError::Missing("api_key"))?;
        let workspace_id =
            pick(ENV_WORKSPACE_ID, self.workspace_id).ok_or(ConfigError::Missing("workspace_id"))?;
        let workspace_override = pick(ENV_WORKSPACE_OVERRIDE, self.workspace_override);
        let base_url = pick(ENV_BASE_URL, self.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Preferences {
            api_key,
            workspace_id,
            workspace_override,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parses_full_document() {
        let prefs = Preferences::from_toml_str(
            r#"
            api_key = "key"
            workspace_id = "ws"
            workspace_override = "forced"
            base_url = "http://localhost:3000/v1"
            "#,
        )
        .unwrap();
        assert_eq!(prefs.api_key, "key");
        assert_eq!(prefs.workspace_id, "ws");
        assert_eq!(prefs.workspace_override.as_deref(), Some("forced"));
        assert_eq!(prefs.base_url, "http://localhost:3000/v1");
    }

    #[test]
    fn base_url_defaults_to_service() {
        let prefs = Preferences::from_toml_str("api_key = \"k\"\nworkspace_id = \"w\"").unwrap();
        assert_eq!(prefs.base_url, DEFAULT_BASE_URL);
        assert!(prefs.workspace_override.is_none());
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = Preferences::from_toml_str("workspace_id = \"w\"").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Preferences::from_toml_str("api_key = \"k\"\nworkspace_id = \"w\"\nworkspace = \"x\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_only_without_file() {
        let prefs = Preferences::load_with_env(
            None,
            env(&[(ENV_API_KEY, "env-key"), (ENV_WORKSPACE_ID, "env-ws")]),
        )
        .unwrap();
        assert_eq!(prefs.api_key, "env-key");
        assert_eq!(prefs.workspace_id, "env-ws");
    }

    #[test]
    fn environment_overrides_file() {
        let dir = std::env::temp_dir().join(format!("motion-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "api_key = \"file-key\"\nworkspace_id = \"file-ws\"\n").unwrap();

        let prefs = Preferences::load_with_env(
            Some(&path),
            env(&[(ENV_WORKSPACE_ID, "env-ws"), (ENV_API_KEY, "")]),
        )
        .unwrap();
        assert_eq!(prefs.api_key, "file-key");
        assert_eq!(prefs.workspace_id, "env-ws");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_falls_back_to_environment() {
        let path = std::env::temp_dir().join("motion-config-does-not-exist.toml");
        let err = Preferences::load_with_env(Some(&path), env(&[(ENV_API_KEY, "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("workspace_id")));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let prefs = Preferences::new("secret-key", "ws");
        assert!(!format!("{prefs:?}").contains("secret-key"));
    }
}
