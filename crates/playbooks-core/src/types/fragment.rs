//! Response fragments produced by the agent runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One piece of output from a single agent runtime invocation.
///
/// Every field is optional. Only a non-empty `reply` contributes to the
/// consolidated reply, and only a `diagnostic_note` contributes an extra
/// trace entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseFragment {
    /// Reply text addressed to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,

    /// Diagnostic note describing an internal step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_note: Option<String>,

    /// Result of a tool invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
}

impl ResponseFragment {
    /// Create a fragment carrying reply text.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a fragment carrying a diagnostic note.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            diagnostic_note: Some(text.into()),
            ..Default::default()
        }
    }

    /// Create a fragment carrying a tool result.
    pub fn tool_result(result: Value) -> Self {
        Self {
            tool_result: Some(result),
            ..Default::default()
        }
    }

    /// Reply text, if present and non-empty.
    pub fn reply_text(&self) -> Option<&str> {
        self.reply.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_skips_empty() {
        assert_eq!(ResponseFragment::reply("Hi").reply_text(), Some("Hi"));
        assert_eq!(ResponseFragment::reply("").reply_text(), None);
        assert_eq!(ResponseFragment::note("n").reply_text(), None);
    }

    #[test]
    fn test_deserialize_partial_fragment() {
        let fragment: ResponseFragment =
            serde_json::from_str(r#"{"diagnostic_note": "step 1"}"#).unwrap();
        assert!(fragment.reply.is_none());
        assert_eq!(fragment.diagnostic_note.as_deref(), Some("step 1"));
    }
}
