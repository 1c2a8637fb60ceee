//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Agent runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Session storage settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Playbook catalog settings.
    #[serde(default)]
    pub playbooks: PlaybooksConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS for browser clients.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::default(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_port() -> u16 {
    18790
}

/// Bind mode for the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to loopback only (127.0.0.1).
    #[default]
    Loopback,

    /// Bind to all interfaces.
    Lan,
}

/// Agent runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime provider.
    #[serde(default)]
    pub provider: RuntimeProvider,

    /// Model identifier passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API base URL override (for compatible endpoints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum output tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Swap a live runtime for the stand-in after an invocation failure.
    #[serde(default = "default_true")]
    pub fallback_on_failure: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: RuntimeProvider::default(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: None,
            fallback_on_failure: true,
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

/// Agent runtime provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeProvider {
    /// OpenAI-compatible chat completions.
    #[default]
    Openai,

    /// No live runtime; every session uses the stand-in.
    None,
}

/// Session storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Durable storage backend.
    #[serde(default)]
    pub storage: StorageBackend,

    /// Directory for file storage (defaults to ~/.playbooks-gateway/sessions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Evict in-memory sessions idle for this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_ttl_secs: Option<u64>,

    /// How often the idle sweeper runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            dir: None,
            idle_ttl_secs: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

/// Durable session storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per session.
    #[default]
    File,

    /// Process memory only.
    Memory,
}

/// Playbook catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybooksConfig {
    /// Directory of example `*.md` playbooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn default_true() -> bool {
    true
}
