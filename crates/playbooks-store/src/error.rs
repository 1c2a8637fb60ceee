//! Session store error types.

use std::io;
use thiserror::Error;

/// Errors raised by session storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] playbooks_core::error::ConfigError),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
