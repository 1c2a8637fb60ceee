//! Live runtime backed by an OpenAI-compatible chat model.
//!
//! The playbook becomes the system prompt and the session dialogue is kept
//! as chat history. Each call produces one reply fragment followed by
//! diagnostic notes for tool calls and truncated replies.

use crate::contract::{AgentRuntime, FragmentStream, RuntimeFactory};
use crate::{Result, RuntimeError};
use async_stream::stream;
use async_trait::async_trait;
use playbooks_core::config::RuntimeConfig;
use playbooks_core::{env, ChatMessage, Playbook, ResponseFragment, Role};
use playbooks_providers::{
    ChatOptions, ChatResponse, Message, OpenAIProvider, Provider, ProviderError, StopReason,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Factory building [`LlmRuntime`]s.
pub struct LlmRuntimeFactory {
    source: ProviderSource,
    model: String,
    options: ChatOptions,
}

enum ProviderSource {
    /// Build an OpenAI provider at construction time from an API key variable.
    Env {
        api_key_env: String,
        base_url: Option<String>,
    },

    /// Use a fixed provider.
    Fixed(Arc<dyn Provider>),
}

impl LlmRuntimeFactory {
    /// Create a factory from runtime configuration.
    ///
    /// Credentials are read when a runtime is constructed, not here, so a key
    /// exported after startup is picked up by new sessions.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            source: ProviderSource::Env {
                api_key_env: config.api_key_env.clone(),
                base_url: config.base_url.clone(),
            },
            model: config.model.clone(),
            options: ChatOptions::with_max_tokens(config.max_tokens).temperature(config.temperature),
        }
    }

    /// Create a factory around an existing provider.
    pub fn with_provider(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            source: ProviderSource::Fixed(provider),
            model: model.into(),
            options: ChatOptions::default(),
        }
    }

    /// Override the chat options sent with every request.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    fn provider(&self) -> Result<Arc<dyn Provider>> {
        match &self.source {
            ProviderSource::Fixed(provider) => Ok(provider.clone()),
            ProviderSource::Env {
                api_key_env,
                base_url,
            } => {
                let api_key = env::get_var(api_key_env).ok_or_else(|| {
                    RuntimeError::configuration(format!(
                        "{} environment variable not set",
                        api_key_env
                    ))
                })?;

                let mut provider = OpenAIProvider::new(api_key).map_err(|e| match e {
                    ProviderError::Config(msg) => RuntimeError::Configuration(msg),
                    other => RuntimeError::Provider(other),
                })?;
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url.clone());
                }
                Ok(Arc::new(provider))
            }
        }
    }
}

#[async_trait]
impl RuntimeFactory for LlmRuntimeFactory {
    async fn construct(&self, playbook_source: &str) -> Result<Arc<dyn AgentRuntime>> {
        let playbook = Playbook::parse(playbook_source)?;
        let provider = self.provider()?;

        debug!(
            "Constructed live runtime for '{}' using {}:{}",
            playbook.title(),
            provider.name(),
            self.model
        );

        Ok(Arc::new(LlmRuntime::new(
            provider,
            self.model.clone(),
            self.options.clone(),
            &playbook,
        )))
    }
}

/// A playbook agent driven by a chat model.
pub struct LlmRuntime {
    provider: Arc<dyn Provider>,
    model: String,
    options: ChatOptions,
    system_prompt: String,
    history: Arc<Mutex<Vec<Message>>>,
}

impl LlmRuntime {
    /// Create a runtime for a validated playbook.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: String,
        options: ChatOptions,
        playbook: &Playbook,
    ) -> Self {
        Self {
            provider,
            model,
            options,
            system_prompt: system_prompt(playbook),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of dialogue messages held (excluding the system prompt).
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Run one chat call. A user message is only kept in history when the
    /// call succeeds.
    fn turn(&self, user_text: Option<String>) -> FragmentStream {
        let provider = self.provider.clone();
        let model = self.model.clone();
        let options = self.options.clone();
        let system = Message::system(self.system_prompt.clone());
        let history = self.history.clone();

        Box::pin(stream! {
            let mut history = history.lock().await;

            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(system);
            messages.extend(history.iter().cloned());
            if let Some(text) = &user_text {
                messages.push(Message::user(text.clone()));
            }

            match provider.chat(&model, &messages, Some(options)).await {
                Ok(response) => {
                    if let Some(text) = user_text {
                        history.push(Message::user(text));
                    }
                    history.push(Message::assistant(response.content.clone()));
                    drop(history);

                    for fragment in fragments_from(response) {
                        yield Ok(fragment);
                    }
                }
                Err(e) => yield Err(RuntimeError::Provider(e)),
            }
        })
    }
}

#[async_trait]
impl AgentRuntime for LlmRuntime {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn start(&self) -> Result<FragmentStream> {
        Ok(self.turn(None))
    }

    async fn respond(&self, text: &str) -> Result<FragmentStream> {
        Ok(self.turn(Some(text.to_string())))
    }

    async fn restore(&self, transcript: &[ChatMessage]) -> Result<()> {
        let mut history = self.history.lock().await;
        history.clear();
        history.extend(transcript.iter().map(|m| match m.role {
            Role::User => Message::user(m.content.clone()),
            Role::Assistant => Message::assistant(m.content.clone()),
        }));
        Ok(())
    }
}

fn system_prompt(playbook: &Playbook) -> String {
    format!(
        "You are {}, an agent that executes the playbook program below. \
         Follow its steps in order, talk to the user in plain language, \
         and never mention that you are following a program.\n\n{}",
        playbook.title(),
        playbook.source()
    )
}

fn fragments_from(response: ChatResponse) -> Vec<ResponseFragment> {
    let mut fragments = vec![ResponseFragment::reply(response.content)];

    for call in &response.tool_calls {
        fragments.push(ResponseFragment::note(format!(
            "Model requested tool '{}' with arguments {}",
            call.name, call.input
        )));
    }

    match response.stop_reason {
        StopReason::MaxTokens => {
            fragments.push(ResponseFragment::note("Reply truncated at the token limit"))
        }
        StopReason::ContentFilter => {
            fragments.push(ResponseFragment::note("Reply stopped by the content filter"))
        }
        _ => {}
    }

    fragments
}
