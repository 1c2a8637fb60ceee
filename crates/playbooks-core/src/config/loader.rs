//! Configuration loading and persistence.

use super::{Config, RuntimeProvider};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.gateway.port == 0 {
            errors.push("Gateway port cannot be 0".to_string());
        }

        if self.runtime.provider != RuntimeProvider::None {
            if self.runtime.model.trim().is_empty() {
                errors.push("Runtime model must not be empty".to_string());
            }
            if self.runtime.api_key_env.trim().is_empty() {
                errors.push("Runtime api_key_env must not be empty".to_string());
            }
        }

        if self.runtime.max_tokens == 0 {
            errors.push("Runtime max_tokens must be greater than 0".to_string());
        }

        if let Some(temperature) = self.runtime.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                errors.push(format!(
                    "Runtime temperature must be between 0 and 2, got {}",
                    temperature
                ));
            }
        }

        if self.session.idle_ttl_secs == Some(0) {
            errors.push("Session idle_ttl_secs must be greater than 0".to_string());
        }

        if self.session.sweep_interval_secs == 0 {
            errors.push("Session sweep_interval_secs must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load from an explicit path, or the default path falling back to defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::load_or_default()),
        }
    }

    /// Load configuration from the default path, falling back to defaults if no file exists.
    ///
    /// When no config file is found, environment variables are inspected so
    /// the gateway can start without any file.
    pub fn load_or_default() -> Self {
        match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::from_env_defaults(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable config file: {}", e);
                Self::from_env_defaults()
            }
        }
    }

    /// Create a Config from defaults, enhanced by environment variable detection.
    pub fn from_env_defaults() -> Self {
        let mut config = Self::default();

        if let Some(model) = env::get_var(env::vars::MODEL) {
            config.runtime.model = model;
        }

        if let Some(base_url) = env::get_var(env::vars::OPENAI_BASE_URL) {
            config.runtime.base_url = Some(base_url);
        }

        if let Some(port) = env::get_u16(env::vars::PORT) {
            config.gateway.port = port;
        }

        if let Some(dir) = env::get_var(env::vars::PLAYBOOKS_DIR) {
            config.playbooks.dir = Some(paths::expand_tilde(&dir));
        }

        config
    }

    /// Directory for file-backed session storage.
    pub fn sessions_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.session.dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::sessions_dir(),
        }
    }

    /// Directory scanned for example playbooks.
    pub fn playbooks_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.playbooks.dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::playbooks_dir(),
        }
    }
}
