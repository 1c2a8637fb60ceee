//! Common types for model providers.

use serde::{Deserialize, Serialize};

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions).
    System,
    /// User message.
    User,
    /// Assistant message.
    Assistant,
}

impl MessageRole {
    /// Get the role as the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A text message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,

    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl ChatOptions {
    /// Create new chat options with max tokens.
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Default::default()
        }
    }

    /// Set temperature.
    pub fn temperature(mut self, temp: Option<f32>) -> Self {
        self.temperature = temp;
        self
    }
}

/// Tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUse {
    /// Unique ID for this tool call.
    pub id: String,

    /// Tool name.
    pub name: String,

    /// Tool arguments as JSON.
    pub input: serde_json::Value,
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response ID.
    pub id: String,

    /// Model used.
    pub model: String,

    /// Response text.
    pub content: String,

    /// Tool calls requested by the model.
    #[serde(default)]
    pub tool_calls: Vec<ToolUse>,

    /// Stop reason.
    pub stop_reason: StopReason,

    /// Token usage.
    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    /// Check if the model wants to use tools.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// Hit max tokens limit.
    MaxTokens,
    /// Model wants to use a tool.
    ToolUse,
    /// Content was filtered.
    ContentFilter,
    /// Unknown reason.
    Unknown,
}

impl StopReason {
    /// Map an OpenAI `finish_reason` string.
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => Self::EndTurn,
            Some("length") => Self::MaxTokens,
            Some("tool_calls") => Self::ToolUse,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Unknown,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input/prompt tokens.
    pub input_tokens: usize,

    /// Output/completion tokens.
    pub output_tokens: usize,
}

impl Usage {
    /// Get total tokens used.
    pub fn total_tokens(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let sys = Message::system("You are a helpful assistant.");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "You are a helpful assistant.");
        assert_eq!(Message::user("Hello!").role.as_str(), "user");
        assert_eq!(Message::assistant("Hi").role.as_str(), "assistant");
    }

    #[test]
    fn test_chat_options() {
        let opts = ChatOptions::with_max_tokens(1000).temperature(Some(0.7));
        assert_eq!(opts.max_tokens, Some(1000));
        assert_eq!(opts.temperature, Some(0.7));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_finish_reason(Some("stop")), StopReason::EndTurn);
        assert_eq!(StopReason::from_finish_reason(Some("length")), StopReason::MaxTokens);
        assert_eq!(StopReason::from_finish_reason(None), StopReason::Unknown);
    }

    #[test]
    fn test_usage() {
        let usage = Usage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total_tokens(), 150);
    }
}
