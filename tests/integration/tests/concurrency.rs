//! Concurrent turns on one session.

use playbooks_gateway::protocol::StartRequest;
use playbooks_integration_tests::{degraded_gateway, GREETER};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_turns_are_serialized() {
    let gateway = Arc::new(degraded_gateway());
    let id = gateway
        .start_session(StartRequest {
            playbook: GREETER.to_string(),
            existing_session_id: None,
        })
        .await
        .unwrap()
        .session_id;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let gateway = gateway.clone();
            let id = id.clone();
            tokio::spawn(async move { gateway.send_turn(&id, &format!("message {}", i)).await })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert!(task.unwrap().unwrap().success);
    }

    let trace = gateway.get_trace(&id).await.unwrap();
    let steps = trace.data.steps();
    assert_eq!(steps.len(), 17);

    // every turn appended exactly one entry, none interleaved
    let mut inputs: Vec<_> = steps[1..]
        .iter()
        .filter_map(|s| s.metadata.as_ref()?.input.clone())
        .collect();
    inputs.sort();
    inputs.dedup();
    assert_eq!(inputs.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_sessions_progress_in_parallel() {
    let gateway = Arc::new(degraded_gateway());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                let id = gateway
                    .start_session(StartRequest {
                        playbook: GREETER.to_string(),
                        existing_session_id: None,
                    })
                    .await
                    .unwrap()
                    .session_id;
                gateway.send_turn(&id, "thanks").await.unwrap()
            })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert_eq!(
            task.unwrap().reply,
            "You're welcome! Is there anything else I can help with?"
        );
    }
    assert_eq!(gateway.list_sessions().await.unwrap().sessions.len(), 8);
}
