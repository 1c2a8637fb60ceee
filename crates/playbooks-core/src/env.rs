//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Whether an API key variable is present and non-blank.
pub fn has_credentials(name: &str) -> bool {
    get_var(name).is_some()
}

/// Common environment variable names.
pub mod vars {
    /// API key for OpenAI.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// OpenAI-compatible base URL override.
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

    /// Model override for the live runtime.
    pub const MODEL: &str = "PLAYBOOKS_MODEL";

    /// Gateway port override.
    pub const PORT: &str = "PLAYBOOKS_PORT";

    /// Directory of example playbooks.
    pub const PLAYBOOKS_DIR: &str = "PLAYBOOKS_DIR";

    /// Gateway home directory override.
    pub const HOME: &str = "PLAYBOOKS_HOME";

    /// Log filter override.
    pub const LOG: &str = "PLAYBOOKS_LOG";
}
