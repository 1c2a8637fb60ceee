//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the gateway base directory (~/.playbooks-gateway, or $PLAYBOOKS_HOME).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(env::vars::HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".playbooks-gateway"))
}

/// Get the main config file path (~/.playbooks-gateway/config.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("config.json5"))
}

/// Get the sessions directory (~/.playbooks-gateway/sessions).
pub fn sessions_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("sessions"))
}

/// Get the default playbooks directory (~/.playbooks-gateway/playbooks).
pub fn playbooks_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("playbooks"))
}

/// Ensure all required directories exist.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    for dir in [base_dir()?, sessions_dir()?, playbooks_dir()?] {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
