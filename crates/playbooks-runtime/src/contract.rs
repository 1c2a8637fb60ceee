//! The agent runtime contract.
//!
//! A runtime executes one playbook for one session. The gateway never looks
//! inside it: it starts the dialogue, forwards user text, and folds whatever
//! fragments come back into replies and trace entries.

use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use playbooks_core::{ChatMessage, ResponseFragment};
use std::pin::Pin;
use std::sync::Arc;

/// Finite stream of fragments produced by one runtime invocation.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<ResponseFragment>> + Send>>;

/// A running playbook agent bound to one session.
///
/// Calls for one session are serialized by the session store, so
/// implementations only need interior mutability, not ordering guarantees.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Runtime name, used in logs.
    fn name(&self) -> &str;

    /// Begin the dialogue and produce the opening fragments.
    async fn start(&self) -> Result<FragmentStream>;

    /// Respond to one user message.
    async fn respond(&self, text: &str) -> Result<FragmentStream>;

    /// Prime a freshly constructed runtime with a persisted transcript.
    async fn restore(&self, _history: &[ChatMessage]) -> Result<()> {
        Ok(())
    }
}

/// Builds live runtimes from playbook sources.
#[async_trait]
pub trait RuntimeFactory: Send + Sync {
    /// Construct a runtime for a playbook.
    ///
    /// Fails with [`RuntimeError::Playbook`](crate::RuntimeError::Playbook)
    /// when the source is unusable and with
    /// [`RuntimeError::Configuration`](crate::RuntimeError::Configuration)
    /// when the environment cannot host a live runtime.
    async fn construct(&self, playbook_source: &str) -> Result<Arc<dyn AgentRuntime>>;
}
