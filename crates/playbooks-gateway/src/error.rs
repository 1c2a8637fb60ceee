//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use playbooks_core::error::ConfigError;
use playbooks_core::PlaybookError;
use playbooks_runtime::RuntimeError;
use playbooks_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Method not found.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The playbook source cannot be used.
    #[error(transparent)]
    Playbook(#[from] PlaybookError),

    /// Agent runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Session storage error.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create an invalid parameters error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Whether the caller's input was rejected.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParams(_) | Self::Playbook(_) | Self::Json(_)
        )
    }

    /// Get the JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) | Self::Playbook(_) => -32602,
            Self::Json(_) => -32700,
            _ => -32603,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RuntimeError> for GatewayError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Playbook(e) => Self::Playbook(e),
            other => Self::Runtime(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
