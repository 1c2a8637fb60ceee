//! Error types for the Playbooks gateway core.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON5 parse error: {0}")]
    Json5(String),
}

/// Errors raised while validating a playbook source.
///
/// These are caller input errors: a request carrying such a source is
/// rejected before any session state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybookError {
    #[error("Playbook content is required")]
    Empty,

    #[error("Playbook has no title: expected a '# Title' heading")]
    MissingTitle,

    #[error("Malformed playbook: {0}")]
    Malformed(String),
}
