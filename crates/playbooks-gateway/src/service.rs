//! Per-request orchestration of sessions, runtimes and traces.
//!
//! Every operation follows the same pattern: lease the session from the
//! [`SessionStore`], drive the runtime through the [`RuntimeAdapter`], fold
//! the buffered fragments with [`aggregate`], append the results to the
//! session and commit. Runtime problems and failed writes are reported inside
//! the response. Rejected input is returned as an error, as is a stored
//! session that cannot be read back when resuming.

use crate::catalog::PlaybookCatalog;
use crate::error::GatewayError;
use crate::protocol::{
    SessionsResponse, StartRequest, StartResponse, StopResponse, TraceResponse, TraceTree,
    TurnResponse, TRACE_NOT_FOUND_ERROR,
};
use crate::Result;
use playbooks_core::playbook::{extract_title, UNTITLED};
use playbooks_core::{aggregate, Aggregate, ChatMessage, Config, Playbook, Session, SessionId};
use playbooks_runtime::{RuntimeAdapter, RuntimeHandle};
use playbooks_store::{SessionLease, SessionStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// The session gateway.
pub struct SessionGateway {
    store: Arc<SessionStore>,
    adapter: RuntimeAdapter,
    catalog: Option<PlaybookCatalog>,
}

impl SessionGateway {
    /// Create a gateway over a store and a runtime adapter.
    pub fn new(store: Arc<SessionStore>, adapter: RuntimeAdapter) -> Self {
        Self {
            store,
            adapter,
            catalog: None,
        }
    }

    /// Serve example playbooks from a catalog.
    pub fn with_catalog(mut self, catalog: PlaybookCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the gateway described by a configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(SessionStore::from_config(config)?);
        let adapter = RuntimeAdapter::from_config(&config.runtime);
        let catalog = PlaybookCatalog::from_config(config)?;
        Ok(Self::new(store, adapter).with_catalog(catalog))
    }

    /// The session store.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// The runtime adapter.
    pub fn adapter(&self) -> &RuntimeAdapter {
        &self.adapter
    }

    /// Start a session, or resume `existing_session_id` when it is known.
    ///
    /// A resumed session is not re-initialized; its latest assistant message
    /// is returned as the reply.
    pub async fn start_session(&self, request: StartRequest) -> Result<StartResponse> {
        let playbook = Playbook::parse(&request.playbook)?;
        let existing = request
            .existing_session_id
            .as_deref()
            .map(parse_session_id)
            .transpose()?;

        let mut lease = self
            .store
            .create_or_resume(existing, playbook.source())
            .await?;
        let id = lease.session.id.clone();

        if !lease.is_new() {
            debug!("Resuming session {}", id);
            let reply = lease
                .session
                .last_assistant_message()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            return Ok(StartResponse {
                success: true,
                reply,
                session_id: id.to_string(),
                error: None,
            });
        }

        let mut handle = match self.adapter.construct(playbook.source()).await {
            Ok(handle) => handle,
            Err(e) => {
                drop(lease);
                if let Err(err) = self.store.remove(&id).await {
                    warn!("Failed to discard rejected session {}: {}", id, err);
                }
                return Err(e.into());
            }
        };

        let started = Instant::now();
        let outcome = self.adapter.start(&mut handle, playbook.source()).await;
        lease.session.runtime_mode = handle.mode();
        lease.handle = Some(handle);

        let response = match outcome {
            Ok(items) => {
                let result = timed(aggregate(items, None), started.elapsed());
                record(&mut lease.session, None, &result);
                StartResponse {
                    success: true,
                    reply: result.reply,
                    session_id: id.to_string(),
                    error: result.failure,
                }
            }
            Err(e) => {
                warn!("Session {} failed to start: {}", id, e);
                StartResponse {
                    success: false,
                    reply: format!("Error starting playbook: {}", e),
                    session_id: id.to_string(),
                    error: Some(e.to_string()),
                }
            }
        };

        self.commit(&mut lease).await;
        info!(
            "Started session {} for '{}' ({})",
            id,
            playbook.title(),
            lease.session.runtime_mode.as_str()
        );
        Ok(response)
    }

    /// Answer one user message.
    pub async fn send_turn(&self, session_id: &str, message: &str) -> Result<TurnResponse> {
        if message.trim().is_empty() {
            return Err(GatewayError::invalid_params("Message is required"));
        }
        let id = parse_session_id(session_id)?;

        let mut lease = match self.store.resolve(&id).await {
            Ok(Some(lease)) => lease,
            Ok(None) => return Ok(expired(&id)),
            Err(e) => {
                error!("Failed to load session {}: {}", id, e);
                return Ok(expired(&id));
            }
        };

        let source = lease.session.playbook_source.clone();
        let mut handle = match lease.handle.take() {
            Some(handle) => handle,
            None => self.bind(&lease.session).await,
        };

        let started = Instant::now();
        let outcome = self.adapter.respond(&mut handle, &source, message).await;
        let mode_changed = lease.session.runtime_mode != handle.mode();
        lease.session.runtime_mode = handle.mode();
        lease.handle = Some(handle);

        let detail = match outcome.map(|items| timed(aggregate(items, Some(message)), started.elapsed())) {
            Ok(result) if !result.reply.is_empty() || !result.is_partial() => {
                record(&mut lease.session, Some(message), &result);
                self.commit(&mut lease).await;
                debug!("Session {} answered in {:?}", id, started.elapsed());
                return Ok(TurnResponse {
                    success: true,
                    trace_entry: result.summary().cloned(),
                    reply: result.reply,
                    replacement_session_id: None,
                    error: result.failure,
                });
            }
            Ok(result) => result.failure.unwrap_or_default(),
            Err(e) => e.to_string(),
        };

        warn!("Turn on session {} failed: {}", id, detail);
        if mode_changed {
            self.commit(&mut lease).await;
        }
        Ok(TurnResponse::failed(detail))
    }

    /// Hierarchical trace of a session.
    pub async fn get_trace(&self, session_id: &str) -> Result<TraceResponse> {
        let id = parse_session_id(session_id)?;

        let lease = match self.store.resolve(&id).await {
            Ok(Some(lease)) => lease,
            Ok(None) => return Ok(trace_not_found(&id)),
            Err(e) => {
                error!("Failed to load session {}: {}", id, e);
                return Ok(trace_not_found(&id));
            }
        };

        let title = extract_title(&lease.session.playbook_source)
            .unwrap_or_else(|| UNTITLED.to_string());
        Ok(TraceResponse {
            success: true,
            session_id: id.to_string(),
            error: None,
            data: TraceTree::build(&title, lease.session.trace_log()),
        })
    }

    /// Stop a session. Unknown sessions stop successfully.
    pub async fn stop_session(&self, session_id: &str) -> Result<StopResponse> {
        let id = parse_session_id(session_id)?;
        if let Err(e) = self.store.remove(&id).await {
            warn!("Failed to delete stored session {}: {}", id, e);
        }
        Ok(StopResponse::default())
    }

    /// Ids of all known sessions.
    pub async fn list_sessions(&self) -> Result<SessionsResponse> {
        let ids = self.store.list().await?;
        Ok(SessionsResponse {
            sessions: ids.into_iter().map(String::from).collect(),
        })
    }

    /// Example playbooks keyed by title.
    pub async fn list_playbooks(&self) -> Result<BTreeMap<String, String>> {
        match &self.catalog {
            Some(catalog) => catalog.list().await,
            None => Ok(BTreeMap::new()),
        }
    }

    async fn bind(&self, session: &Session) -> RuntimeHandle {
        match self.adapter.rebind(session).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    "Stored playbook of session {} is unusable, using stand-in: {}",
                    session.id, e
                );
                self.adapter.degrade(&session.playbook_source)
            }
        }
    }

    async fn commit(&self, lease: &mut SessionLease) {
        if let Err(e) = self.store.commit(lease).await {
            warn!("Failed to persist session {}: {}", lease.session.id, e);
        }
    }
}

fn parse_session_id(id: &str) -> Result<SessionId> {
    SessionId::parse(id).map_err(|e| GatewayError::invalid_params(e.to_string()))
}

fn expired(id: &SessionId) -> TurnResponse {
    let replacement = loop {
        let candidate = SessionId::generate();
        if &candidate != id {
            break candidate;
        }
    };
    info!("Session {} expired, offering {}", id, replacement);
    TurnResponse::expired(replacement.to_string())
}

fn trace_not_found(id: &SessionId) -> TraceResponse {
    TraceResponse {
        success: false,
        session_id: id.to_string(),
        error: Some(TRACE_NOT_FOUND_ERROR.to_string()),
        data: TraceTree::placeholder(),
    }
}

/// Stamp the summary entry with the invocation's wall time.
fn timed(mut result: Aggregate, elapsed: Duration) -> Aggregate {
    if let Some(summary) = result.entries.pop() {
        result
            .entries
            .push(summary.with_extra("duration", format_duration(elapsed)));
    }
    result
}

fn format_duration(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

fn record(session: &mut Session, input: Option<&str>, result: &Aggregate) {
    if let Some(text) = input {
        session.push_message(ChatMessage::user(text));
    }
    session.push_message(ChatMessage::assistant(result.reply.clone()));
    session.extend_trace(result.entries.iter().cloned());
}
