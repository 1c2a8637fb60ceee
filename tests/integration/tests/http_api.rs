//! REST and JSON-RPC surfaces against a full router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use playbooks_gateway::{Gateway, GatewayConfig};
use playbooks_integration_tests::{degraded_gateway, GREETER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn router() -> Router {
    Gateway::new(GatewayConfig::default(), Arc::new(degraded_gateway()))
        .await
        .router()
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_rpc_session_flow() {
    let router = router().await;

    let (status, started) = call(
        &router,
        "POST",
        "/rpc",
        Some(json!({"jsonrpc": "2.0", "id": 1, "method": "session.start", "params": {"playbook": GREETER}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = started["result"]["session_id"].as_str().unwrap().to_string();

    let (_, turn) = call(
        &router,
        "POST",
        "/rpc",
        Some(json!({"jsonrpc": "2.0", "id": 2, "method": "session.send", "params": {"session_id": id, "message": "help"}})),
    )
    .await;
    assert_eq!(turn["result"]["success"], true);

    let (_, unknown) = call(
        &router,
        "POST",
        "/rpc",
        Some(json!({"jsonrpc": "2.0", "id": 3, "method": "session.nope"})),
    )
    .await;
    assert_eq!(unknown["error"]["code"], -32601);
}

#[tokio::test]
async fn test_rest_rejects_untitled_playbook() {
    let router = router().await;

    let (status, body) = call(&router, "POST", "/sessions", Some(json!({"playbook": "no title"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, listed) = call(&router, "GET", "/sessions", None).await;
    assert_eq!(listed["sessions"], json!([]));
}

#[tokio::test]
async fn test_health_reports_runtime() {
    let router = router().await;

    let (status, health) = call(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["runtime"], "degraded");
}
