//! Model provider implementations for the Playbooks gateway.
//!
//! Providers turn a conversation into one chat completion. Only the
//! OpenAI-compatible chat completions API is implemented; the `Provider`
//! trait is the seam the agent runtime is written against so tests can
//! substitute scripted providers.
//!
//! # Example
//!
//! ```rust,ignore
//! use playbooks_providers::{Message, OpenAIProvider, Provider};
//!
//! let provider = OpenAIProvider::new("your-api-key")?;
//! let response = provider
//!     .chat("gpt-4o", &[Message::user("Hello!")], None)
//!     .await?;
//! println!("{}", response.content);
//! ```

mod error;
mod types;

pub mod openai;

pub use error::{ProviderError, Result};
pub use openai::OpenAIProvider;
pub use types::*;

use async_trait::async_trait;

/// A model provider that can generate chat completions.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get provider name.
    fn name(&self) -> &str;

    /// Generate a chat completion.
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<ChatOptions>,
    ) -> Result<ChatResponse>;
}
