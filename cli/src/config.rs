use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use motion_core::Preferences;

const APP_NAME: &str = "motion";

pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .context("Could not determine config directory")
}

/// `explicit` comes from `--config` or `MOTION_CONFIG_PATH`.
pub fn get_config_file(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(get_config_dir()?.join("config.toml")),
    }
}

pub fn load_preferences(explicit: Option<PathBuf>) -> Result<Preferences> {
    let config_file = get_config_file(explicit)?;
    tracing::debug!(path = %config_file.display(), "loading preferences");
    Preferences::load(Some(&config_file)).with_context(|| {
        format!(
            "Failed to load preferences (config file: {}; env: MOTION_API_KEY, MOTION_WORKSPACE_ID)",
            config_file.display()
        )
    })
}
