//! Shared fixtures for the gateway integration tests.

use async_trait::async_trait;
use playbooks_core::ResponseFragment;
use playbooks_gateway::SessionGateway;
use playbooks_runtime::{
    AgentRuntime, FragmentStream, RuntimeAdapter, RuntimeError, RuntimeFactory,
};
use playbooks_store::{FileBackend, SessionStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const GREETER: &str = "# Greeter\n## Greet\n- Say hello to the user";

/// Gateway backed only by the stand-in runtime and memory storage.
pub fn degraded_gateway() -> SessionGateway {
    SessionGateway::new(
        Arc::new(SessionStore::in_memory()),
        RuntimeAdapter::degraded_only(),
    )
}

/// Gateway persisting sessions under `dir`.
pub fn file_gateway(dir: &Path, adapter: RuntimeAdapter) -> SessionGateway {
    let store = SessionStore::new(Arc::new(FileBackend::new(dir)));
    SessionGateway::new(Arc::new(store), adapter)
}

/// Live runtime that echoes user text, counting calls on the shared counter.
pub struct Echo {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AgentRuntime for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn start(&self) -> playbooks_runtime::Result<FragmentStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(futures::stream::iter([Ok(ResponseFragment::reply("ready"))])))
    }

    async fn respond(&self, text: &str) -> playbooks_runtime::Result<FragmentStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(futures::stream::iter([
            Ok(ResponseFragment::reply(format!("echo: {}", text))),
            Ok(ResponseFragment::note("echoed")),
        ])))
    }
}

/// Factory for [`Echo`] runtimes.
#[derive(Default)]
pub struct EchoFactory {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RuntimeFactory for EchoFactory {
    async fn construct(&self, playbook_source: &str) -> playbooks_runtime::Result<Arc<dyn AgentRuntime>> {
        playbooks_core::Playbook::parse(playbook_source)?;
        Ok(Arc::new(Echo {
            calls: self.calls.clone(),
        }))
    }
}

/// Factory whose runtimes fail every call.
pub struct BrokenFactory;

struct Broken;

#[async_trait]
impl AgentRuntime for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    async fn start(&self) -> playbooks_runtime::Result<FragmentStream> {
        Err(RuntimeError::invocation("model unavailable"))
    }

    async fn respond(&self, _text: &str) -> playbooks_runtime::Result<FragmentStream> {
        Err(RuntimeError::invocation("model unavailable"))
    }
}

#[async_trait]
impl RuntimeFactory for BrokenFactory {
    async fn construct(&self, playbook_source: &str) -> playbooks_runtime::Result<Arc<dyn AgentRuntime>> {
        playbooks_core::Playbook::parse(playbook_source)?;
        Ok(Arc::new(Broken))
    }
}
