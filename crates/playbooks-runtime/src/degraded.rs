//! Deterministic stand-in runtime.
//!
//! Used whenever a live runtime cannot be built or has failed. Replies are
//! derived only from the playbook title and the user's words, so every
//! session still greets and answers.

use crate::contract::{AgentRuntime, FragmentStream};
use crate::Result;
use async_trait::async_trait;
use playbooks_core::playbook::{extract_title, UNTITLED};
use playbooks_core::ResponseFragment;

const GREETING_WORDS: [&str; 3] = ["hello", "hi", "hey"];

/// Stand-in runtime with canned behavior.
#[derive(Debug, Clone)]
pub struct DegradedRuntime {
    title: String,
}

impl DegradedRuntime {
    /// Create a stand-in for a playbook source.
    pub fn new(playbook_source: &str) -> Self {
        Self {
            title: extract_title(playbook_source).unwrap_or_else(|| UNTITLED.to_string()),
        }
    }

    /// The playbook title used in the greeting.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opening greeting text.
    pub fn greeting(&self) -> String {
        format!("Hello! I'm {}. How can I help you today?", self.title)
    }

    /// Canned reply for one user message.
    pub fn reply_for(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        let has = |word: &str| words.iter().any(|w| *w == word);

        if GREETING_WORDS.iter().any(|g| has(g)) {
            "Hello there! How can I help you today?".to_string()
        } else if has("help") {
            "I'm here to help! You can ask me questions or give me tasks related to the playbook."
                .to_string()
        } else if has("weather") {
            "I can't check live weather right now, but I hope it's pleasant where you are!"
                .to_string()
        } else if words.iter().any(|w| w.starts_with("thank")) {
            "You're welcome! Is there anything else I can help with?".to_string()
        } else {
            format!(
                "I received your message: \"{}\". This is a simulated response from the playbook.",
                text
            )
        }
    }
}

fn single_reply(text: String) -> FragmentStream {
    Box::pin(futures::stream::iter([Ok(ResponseFragment::reply(text))]))
}

#[async_trait]
impl AgentRuntime for DegradedRuntime {
    fn name(&self) -> &str {
        "degraded"
    }

    async fn start(&self) -> Result<FragmentStream> {
        Ok(single_reply(self.greeting()))
    }

    async fn respond(&self, text: &str) -> Result<FragmentStream> {
        Ok(single_reply(self.reply_for(text)))
    }
}
