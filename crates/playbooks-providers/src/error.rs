//! Error types for model providers.

use thiserror::Error;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider error types.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication error (invalid API key, etc.).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Invalid request (bad parameters, etc.).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server error from the provider.
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a server error.
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error stems from local configuration rather than a call.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit(_) | Self::Network(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ProviderError::RateLimit("slow down".into()).is_retryable());
        assert!(ProviderError::server_error(503, "").is_retryable());

        assert!(!ProviderError::auth("").is_retryable());
        assert!(!ProviderError::server_error(400, "").is_retryable());
    }

    #[test]
    fn test_is_config() {
        assert!(ProviderError::config("API key is required").is_config());
        assert!(!ProviderError::internal("boom").is_config());
    }
}
