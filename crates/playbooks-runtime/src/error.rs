//! Agent runtime error types.

use playbooks_core::PlaybookError;
use playbooks_providers::ProviderError;
use thiserror::Error;

/// Errors raised while constructing or invoking an agent runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime cannot be built in this environment (missing credentials,
    /// no provider configured). Sessions fall back to the stand-in.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The playbook source is unusable. This is a caller input error.
    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    /// A start or respond call failed.
    #[error("Runtime invocation failed: {0}")]
    Invocation(String),

    /// Upstream model provider error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invocation error.
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }

    /// Whether this error rejects the playbook rather than the environment.
    pub fn is_playbook(&self) -> bool {
        matches!(self, Self::Playbook(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playbook_errors_are_distinct() {
        assert!(RuntimeError::from(PlaybookError::MissingTitle).is_playbook());
        assert!(!RuntimeError::configuration("OPENAI_API_KEY not set").is_playbook());
        assert!(!RuntimeError::invocation("timeout").is_playbook());
    }

    #[test]
    fn test_provider_error_conversion() {
        let err: RuntimeError = ProviderError::auth("bad key").into();
        assert_eq!(err.to_string(), "Provider error: Authentication error: bad key");
    }
}
