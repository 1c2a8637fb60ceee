//! Runtime construction, invocation, and the degrade policy.

use crate::contract::{AgentRuntime, RuntimeFactory};
use crate::degraded::DegradedRuntime;
use crate::llm::LlmRuntimeFactory;
use crate::{Result, RuntimeError};
use futures::StreamExt;
use playbooks_core::config::{RuntimeConfig, RuntimeProvider};
use playbooks_core::{ResponseFragment, RuntimeMode, Session};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fully buffered output of one invocation. A failing sequence ends with its
/// error; nothing follows it.
pub type Fragments = Vec<Result<ResponseFragment>>;

/// The runtime bound to a session.
#[derive(Clone)]
pub enum RuntimeHandle {
    /// Backed by a live agent runtime.
    Live(Arc<dyn AgentRuntime>),

    /// Backed by the deterministic stand-in.
    Degraded(Arc<DegradedRuntime>),
}

impl RuntimeHandle {
    /// The binding mode recorded on the session.
    pub fn mode(&self) -> RuntimeMode {
        match self {
            Self::Live(_) => RuntimeMode::Live,
            Self::Degraded(_) => RuntimeMode::Degraded,
        }
    }

    /// Whether the handle is backed by a live runtime.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    fn runtime(&self) -> &dyn AgentRuntime {
        match self {
            Self::Live(runtime) => runtime.as_ref(),
            Self::Degraded(runtime) => runtime.as_ref(),
        }
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(runtime) => f.debug_tuple("Live").field(&runtime.name()).finish(),
            Self::Degraded(runtime) => f.debug_tuple("Degraded").field(&runtime.title()).finish(),
        }
    }
}

/// Builds runtime handles and invokes them.
///
/// Construction never fails for environmental reasons: anything other than
/// an unusable playbook yields a degraded handle. Once a handle is degraded
/// it is never promoted back to live.
pub struct RuntimeAdapter {
    factory: Option<Arc<dyn RuntimeFactory>>,
    fallback_on_failure: bool,
}

impl RuntimeAdapter {
    /// Create an adapter building live runtimes with `factory`.
    pub fn new(factory: Arc<dyn RuntimeFactory>) -> Self {
        Self {
            factory: Some(factory),
            fallback_on_failure: true,
        }
    }

    /// Create an adapter that only ever hands out the stand-in.
    pub fn degraded_only() -> Self {
        Self {
            factory: None,
            fallback_on_failure: true,
        }
    }

    /// Create an adapter from runtime configuration.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let adapter = match config.provider {
            RuntimeProvider::Openai => Self::new(Arc::new(LlmRuntimeFactory::from_config(config))),
            RuntimeProvider::None => Self::degraded_only(),
        };
        adapter.with_fallback_on_failure(config.fallback_on_failure)
    }

    /// Whether a failing live runtime is swapped for the stand-in.
    pub fn with_fallback_on_failure(mut self, enabled: bool) -> Self {
        self.fallback_on_failure = enabled;
        self
    }

    /// Whether live runtimes can be built at all.
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Build a handle for a playbook.
    ///
    /// Only [`RuntimeError::Playbook`] is returned; every other construction
    /// failure degrades.
    pub async fn construct(&self, playbook_source: &str) -> Result<RuntimeHandle> {
        let Some(factory) = &self.factory else {
            debug!("No runtime factory configured; using stand-in runtime");
            return Ok(self.degrade(playbook_source));
        };

        match factory.construct(playbook_source).await {
            Ok(runtime) => {
                info!("Constructed live runtime ({})", runtime.name());
                Ok(RuntimeHandle::Live(runtime))
            }
            Err(e) if e.is_playbook() => Err(e),
            Err(e) => {
                warn!("Live runtime unavailable, falling back to stand-in: {}", e);
                Ok(self.degrade(playbook_source))
            }
        }
    }

    /// Build the stand-in handle for a playbook.
    pub fn degrade(&self, playbook_source: &str) -> RuntimeHandle {
        RuntimeHandle::Degraded(Arc::new(DegradedRuntime::new(playbook_source)))
    }

    /// Re-bind a session that has no handle (after rehydration or eviction).
    ///
    /// Degraded sessions stay degraded. Live runtimes are primed with the
    /// persisted transcript.
    pub async fn rebind(&self, session: &Session) -> Result<RuntimeHandle> {
        if session.runtime_mode == RuntimeMode::Degraded {
            return Ok(self.degrade(&session.playbook_source));
        }

        let handle = self.construct(&session.playbook_source).await?;
        if let RuntimeHandle::Live(runtime) = &handle {
            if let Err(e) = runtime.restore(session.messages()).await {
                warn!("Failed to restore session {} into live runtime: {}", session.id, e);
                return Ok(self.degrade(&session.playbook_source));
            }
        }
        Ok(handle)
    }

    /// Produce the opening fragments.
    ///
    /// A live runtime that cannot start is replaced by the stand-in and the
    /// start is retried once, so a new session always gets a greeting.
    pub async fn start(&self, handle: &mut RuntimeHandle, playbook_source: &str) -> Result<Fragments> {
        let outcome = invoke(handle, None).await;
        let unusable = match &outcome {
            Ok(items) => !has_reply(items) && has_failure(items),
            Err(_) => true,
        };

        if unusable && handle.is_live() {
            warn!(
                "Live runtime failed to start, retrying with stand-in: {}",
                failure_text(&outcome)
            );
            *handle = self.degrade(playbook_source);
            return invoke(handle, None).await;
        }
        outcome
    }

    /// Produce the fragments answering one user message.
    ///
    /// When a live runtime fails and fallback is enabled, the handle is
    /// swapped for the stand-in before returning the failure.
    pub async fn respond(
        &self,
        handle: &mut RuntimeHandle,
        playbook_source: &str,
        text: &str,
    ) -> Result<Fragments> {
        let outcome = invoke(handle, Some(text)).await;
        let failed = match &outcome {
            Ok(items) => has_failure(items),
            Err(_) => true,
        };

        if failed && handle.is_live() && self.fallback_on_failure {
            warn!(
                "Live runtime failed, switching session to stand-in: {}",
                failure_text(&outcome)
            );
            *handle = self.degrade(playbook_source);
        }
        outcome
    }
}

async fn invoke(handle: &RuntimeHandle, text: Option<&str>) -> Result<Fragments> {
    let runtime = handle.runtime();
    let mut stream = match text {
        Some(text) => runtime.respond(text).await?,
        None => runtime.start().await?,
    };

    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        let failed = item.is_err();
        items.push(item);
        if failed {
            break;
        }
    }
    Ok(items)
}

fn has_reply(items: &Fragments) -> bool {
    items
        .iter()
        .any(|i| matches!(i, Ok(f) if f.reply_text().is_some()))
}

fn has_failure(items: &Fragments) -> bool {
    items.iter().any(|i| i.is_err())
}

fn failure_text(outcome: &Result<Fragments>) -> String {
    match outcome {
        Err(e) => e.to_string(),
        Ok(items) => items
            .iter()
            .find_map(|i| i.as_ref().err().map(RuntimeError::to_string))
            .unwrap_or_default(),
    }
}
