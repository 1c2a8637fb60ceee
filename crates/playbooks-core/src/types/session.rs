//! Session types for playbook conversations.

use super::{SessionId, TraceEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable state of a playbook session.
///
/// Only serializable fields live here; the runtime handle bound to a session
/// is held next to it by the session store and rebuilt after a restart.
/// Messages and trace entries are append-only: there is no API that removes
/// or reorders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,

    /// Playbook program bound to this session at creation.
    pub playbook_source: String,

    /// Dialogue transcript.
    #[serde(default)]
    messages: Vec<ChatMessage>,

    /// Execution trace.
    #[serde(default)]
    trace_log: Vec<TraceEntry>,

    /// Mode of the runtime last bound to this session.
    #[serde(default)]
    pub runtime_mode: RuntimeMode,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session bound to a playbook.
    pub fn new(id: SessionId, playbook_source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            playbook_source: playbook_source.into(),
            messages: Vec::new(),
            trace_log: Vec::new(),
            runtime_mode: RuntimeMode::Unbound,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the transcript.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Append trace entries in order.
    pub fn extend_trace(&mut self, entries: impl IntoIterator<Item = TraceEntry>) {
        self.updated_at = Utc::now();
        self.trace_log.extend(entries);
    }

    /// The dialogue transcript.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The execution trace.
    pub fn trace_log(&self) -> &[TraceEntry] {
        &self.trace_log
    }

    /// Latest assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Whether the session has fallen back to the stand-in runtime.
    pub fn is_degraded(&self) -> bool {
        self.runtime_mode == RuntimeMode::Degraded
    }
}

/// A message in the dialogue transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,

    /// Message text.
    pub content: String,

    /// Timestamp.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Binding state of the runtime attached to a session.
///
/// `Degraded` is sticky: a session never moves from `Degraded` back to `Live`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// No runtime has been constructed yet.
    #[default]
    Unbound,

    /// Backed by the real agent runtime.
    Live,

    /// Backed by the deterministic stand-in.
    Degraded,
}

impl RuntimeMode {
    /// Get the mode as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Live => "live",
            Self::Degraded => "degraded",
        }
    }
}
