//! Request and response shapes of the gateway operations.
//!
//! Field names follow the original playbooks HTTP API (snake_case).

use playbooks_core::{TraceEntry, TraceMetadata};
use serde::{Deserialize, Serialize};

/// Reply sent when a turn targets an unknown or expired session.
pub const SESSION_EXPIRED_REPLY: &str =
    "Session expired. This is a new session. How can I help you?";

/// Error detail sent alongside [`SESSION_EXPIRED_REPLY`].
pub const SESSION_EXPIRED_ERROR: &str = "Session expired";

/// Reply sent when the runtime fails to answer a turn.
pub const TURN_FAILED_REPLY: &str = "Error processing your message. Please try again.";

/// Error sent with the placeholder trace tree.
pub const TRACE_NOT_FOUND_ERROR: &str =
    "Session not found or expired. Please run the playbook again.";

/// Start (or resume) a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    /// Playbook program text.
    pub playbook: String,

    /// Session to resume instead of creating a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_session_id: Option<String>,
}

/// Outcome of a start request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    pub reply: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A user message for a session (REST body; the id comes from the path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// A user message addressed by session id (RPC params).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub message: String,
}

/// Outcome of one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub success: bool,
    pub reply: String,

    /// Summary trace entry recorded for the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_entry: Option<TraceEntry>,

    /// Fresh id offered when the requested session is gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TurnResponse {
    pub(crate) fn expired(replacement: String) -> Self {
        Self {
            success: false,
            reply: SESSION_EXPIRED_REPLY.to_string(),
            trace_entry: None,
            replacement_session_id: Some(replacement),
            error: Some(SESSION_EXPIRED_ERROR.to_string()),
        }
    }

    pub(crate) fn failed(detail: String) -> Self {
        Self {
            success: false,
            reply: TURN_FAILED_REPLY.to_string(),
            trace_entry: None,
            replacement_session_id: None,
            error: Some(detail),
        }
    }
}

/// Params naming one session (RPC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRef {
    pub session_id: String,
}

/// Kind of a trace tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Agent,
    Section,
    Step,
}

/// One node of the hierarchical trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraceNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TraceMetadata>,
}

impl TraceNode {
    fn branch(id: &str, name: String, kind: NodeKind, children: Vec<TraceNode>) -> Self {
        Self {
            id: id.to_string(),
            name,
            kind,
            children,
            metadata: None,
        }
    }

    /// A step node for a recorded trace entry.
    pub fn step(entry: &TraceEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.label.clone(),
            kind: NodeKind::Step,
            children: Vec::new(),
            metadata: Some(entry.metadata.clone()),
        }
    }
}

/// Trace tree rooted at the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceTree {
    pub root: TraceNode,
}

impl TraceTree {
    /// Build `agent -> section -> steps` for a session's trace log.
    pub fn build(title: &str, entries: &[TraceEntry]) -> Self {
        let steps = entries.iter().map(TraceNode::step).collect();
        let section = TraceNode::branch("section", title.to_string(), NodeKind::Section, steps);
        Self {
            root: TraceNode::branch("root", format!("{} Agent", title), NodeKind::Agent, vec![section]),
        }
    }

    /// Tree returned for unknown sessions.
    pub fn placeholder() -> Self {
        Self {
            root: TraceNode::branch("root", "Unknown Agent".to_string(), NodeKind::Agent, Vec::new()),
        }
    }

    /// All step nodes, in order.
    pub fn steps(&self) -> Vec<&TraceNode> {
        self.root
            .children
            .iter()
            .flat_map(|section| section.children.iter())
            .collect()
    }
}

/// Outcome of a trace request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResponse {
    pub success: bool,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: TraceTree,
}

/// Outcome of a stop request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: String,
}

impl Default for StopResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: "Playbook session stopped".to_string(),
        }
    }
}

/// Known session ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<String>,
}
