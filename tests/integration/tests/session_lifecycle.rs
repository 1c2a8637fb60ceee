//! End-to-end session lifecycle through the session gateway.

use playbooks_core::{RuntimeMode, SessionId, TraceStatus};
use playbooks_gateway::protocol::{StartRequest, SESSION_EXPIRED_REPLY};
use playbooks_gateway::{GatewayError, SessionGateway};
use playbooks_integration_tests::{degraded_gateway, EchoFactory, BrokenFactory, GREETER};
use playbooks_runtime::RuntimeAdapter;
use playbooks_store::SessionStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn start(playbook: &str) -> StartRequest {
    StartRequest {
        playbook: playbook.to_string(),
        existing_session_id: None,
    }
}

#[tokio::test]
async fn test_start_turn_trace_stop() {
    let gateway = degraded_gateway();

    let started = gateway.start_session(start(GREETER)).await.unwrap();
    assert!(started.success);
    assert_eq!(started.reply, "Hello! I'm Greeter. How can I help you today?");
    let id = started.session_id;

    let turn = gateway.send_turn(&id, "hello").await.unwrap();
    assert!(turn.success);
    assert_eq!(turn.reply, "Hello there! How can I help you today?");
    let entry = turn.trace_entry.unwrap();
    assert_eq!(entry.metadata.input.as_deref(), Some("hello"));
    assert_eq!(entry.metadata.status, TraceStatus::Completed);

    let trace = gateway.get_trace(&id).await.unwrap();
    assert!(trace.success);
    assert_eq!(trace.data.root.name, "Greeter Agent");
    assert_eq!(trace.data.root.children[0].name, "Greeter");
    let steps = trace.data.steps();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].id, entry.id);

    let stopped = gateway.stop_session(&id).await.unwrap();
    assert!(stopped.success);

    let trace = gateway.get_trace(&id).await.unwrap();
    assert!(!trace.success);
    assert_eq!(trace.data.root.name, "Unknown Agent");
    assert!(trace.data.root.children.is_empty());
}

#[tokio::test]
async fn test_untitled_playbook_is_rejected_without_a_session() {
    let gateway = degraded_gateway();

    let err = gateway.start_session(start("just some text")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Playbook(_)));
    assert!(gateway.list_sessions().await.unwrap().sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_session_turn_offers_replacement() {
    let gateway = degraded_gateway();
    let unknown = SessionId::generate();

    let turn = gateway.send_turn(unknown.as_str(), "hello").await.unwrap();
    assert!(!turn.success);
    assert_eq!(turn.reply, SESSION_EXPIRED_REPLY);
    let replacement = turn.replacement_session_id.unwrap();
    assert_ne!(replacement, unknown.as_str());

    let stopped = gateway.stop_session(unknown.as_str()).await.unwrap();
    assert!(stopped.success);
}

#[tokio::test]
async fn test_resume_returns_last_reply_without_restarting() {
    let factory = Arc::new(EchoFactory::default());
    let calls = factory.calls.clone();
    let gateway = SessionGateway::new(
        Arc::new(SessionStore::in_memory()),
        RuntimeAdapter::new(factory),
    );

    let id = gateway.start_session(start(GREETER)).await.unwrap().session_id;
    gateway.send_turn(&id, "ping").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let resumed = gateway
        .start_session(StartRequest {
            playbook: GREETER.to_string(),
            existing_session_id: Some(id.clone()),
        })
        .await
        .unwrap();
    assert_eq!(resumed.session_id, id);
    assert_eq!(resumed.reply, "echo: ping");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_notes_become_trace_steps() {
    let gateway = SessionGateway::new(
        Arc::new(SessionStore::in_memory()),
        RuntimeAdapter::new(Arc::new(EchoFactory::default())),
    );

    let id = gateway.start_session(start(GREETER)).await.unwrap().session_id;
    let turn = gateway.send_turn(&id, "ping").await.unwrap();
    assert_eq!(turn.reply, "echo: ping");

    // opening summary, the note, then the turn summary
    let trace = gateway.get_trace(&id).await.unwrap();
    assert_eq!(trace.data.steps().len(), 3);
}

#[tokio::test]
async fn test_broken_runtime_degrades_at_start() {
    let store = Arc::new(SessionStore::in_memory());
    let gateway = SessionGateway::new(store.clone(), RuntimeAdapter::new(Arc::new(BrokenFactory)));

    let started = gateway.start_session(start(GREETER)).await.unwrap();
    assert!(started.success);
    assert_eq!(started.reply, "Hello! I'm Greeter. How can I help you today?");

    let id = SessionId::parse(started.session_id).unwrap();
    let lease = store.resolve(&id).await.unwrap().unwrap();
    assert_eq!(lease.session.runtime_mode, RuntimeMode::Degraded);
}
