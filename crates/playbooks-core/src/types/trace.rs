//! Execution trace types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Label of the summarizing entry for a session's opening turn.
pub const INITIAL_GREETING_LABEL: &str = "Initial greeting";

/// Label of the summarizing entry for a user turn.
pub const USER_MESSAGE_LABEL: &str = "Process user message";

/// Label of entries recorded for runtime diagnostic notes.
pub const RUNTIME_NOTE_LABEL: &str = "Runtime note";

/// One recorded execution step.
///
/// Entries are built completely before they are appended to a session and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Unique entry identifier.
    pub id: String,

    /// Short human-readable step name.
    pub label: String,

    /// Step metadata.
    pub metadata: TraceMetadata,
}

impl TraceEntry {
    /// Create a completed step entry.
    pub fn step(label: impl Into<String>, input: Option<&str>, output: impl Into<String>) -> Self {
        Self {
            id: crate::id::uuid(),
            label: label.into(),
            metadata: TraceMetadata {
                status: TraceStatus::Completed,
                input: input.map(str::to_string),
                output: Some(output.into()),
                extra: BTreeMap::new(),
            },
        }
    }

    /// Create an entry for a runtime diagnostic note.
    pub fn note(note: impl Into<String>) -> Self {
        Self::step(RUNTIME_NOTE_LABEL, None, note)
    }

    /// Mark the entry as failed, recording the error detail.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.metadata.status = TraceStatus::Error;
        self.metadata
            .extra
            .insert("error".to_string(), Value::String(error.into()));
        self
    }

    /// Attach an extra metadata value.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the step completed successfully.
    pub fn is_completed(&self) -> bool {
        self.metadata.status == TraceStatus::Completed
    }
}

/// Metadata attached to a trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Step outcome.
    pub status: TraceStatus,

    /// Triggering user text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Produced reply text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Additional keys such as `duration` or `error`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Outcome of a trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Completed,
    Error,
}
