//! Sessions surviving a gateway restart through file storage.

use playbooks_core::{RuntimeMode, SessionId};
use playbooks_gateway::protocol::StartRequest;
use playbooks_integration_tests::{file_gateway, BrokenFactory, EchoFactory, GREETER};
use playbooks_runtime::RuntimeAdapter;
use std::sync::Arc;
use tempfile::TempDir;

fn start(playbook: &str) -> StartRequest {
    StartRequest {
        playbook: playbook.to_string(),
        existing_session_id: None,
    }
}

#[tokio::test]
async fn test_session_rehydrates_after_restart() {
    let dir = TempDir::new().unwrap();

    let id = {
        let gateway = file_gateway(dir.path(), RuntimeAdapter::degraded_only());
        let id = gateway.start_session(start(GREETER)).await.unwrap().session_id;
        gateway.send_turn(&id, "hello").await.unwrap();
        id
    };

    let gateway = file_gateway(dir.path(), RuntimeAdapter::degraded_only());
    assert_eq!(gateway.list_sessions().await.unwrap().sessions, vec![id.clone()]);

    let trace = gateway.get_trace(&id).await.unwrap();
    assert!(trace.success);
    assert_eq!(trace.data.steps().len(), 2);

    let turn = gateway.send_turn(&id, "help").await.unwrap();
    assert!(turn.success);
    assert_eq!(gateway.get_trace(&id).await.unwrap().data.steps().len(), 3);
}

#[tokio::test]
async fn test_degraded_mode_survives_restart() {
    let dir = TempDir::new().unwrap();

    let id = {
        let gateway = file_gateway(dir.path(), RuntimeAdapter::new(Arc::new(BrokenFactory)));
        gateway.start_session(start(GREETER)).await.unwrap().session_id
    };

    // A healthy runtime is available now, but the session stays on the stand-in.
    let gateway = file_gateway(dir.path(), RuntimeAdapter::new(Arc::new(EchoFactory::default())));
    let turn = gateway.send_turn(&id, "hello").await.unwrap();
    assert_eq!(turn.reply, "Hello there! How can I help you today?");

    let lease = gateway
        .store()
        .resolve(&SessionId::parse(id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lease.session.runtime_mode, RuntimeMode::Degraded);
}

#[tokio::test]
async fn test_stopped_session_is_gone_after_restart() {
    let dir = TempDir::new().unwrap();

    let id = {
        let gateway = file_gateway(dir.path(), RuntimeAdapter::degraded_only());
        let id = gateway.start_session(start(GREETER)).await.unwrap().session_id;
        gateway.stop_session(&id).await.unwrap();
        id
    };

    let gateway = file_gateway(dir.path(), RuntimeAdapter::degraded_only());
    let turn = gateway.send_turn(&id, "hello").await.unwrap();
    assert!(!turn.success);
    assert!(turn.replacement_session_id.is_some());
}
