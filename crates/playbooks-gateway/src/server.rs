//! HTTP, JSON-RPC and WebSocket server.

use crate::error::GatewayError;
use crate::handlers::{register_all, HandlerContext, HealthResponse};
use crate::methods::MethodRegistry;
use crate::protocol::{
    MessageRequest, SessionsResponse, StartRequest, StartResponse, StopResponse, TraceResponse,
    TurnResponse,
};
use crate::service::SessionGateway;
use crate::Result;
use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket},
        ConnectInfo, Path, State, WebSocketUpgrade,
    },
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use playbooks_core::config::BindMode;
use playbooks_core::Config;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 18790;

/// Origins allowed by CORS, with any port.
const LOCAL_ORIGINS: &[&str] = &["http://localhost", "http://127.0.0.1", "https://localhost"];

/// Server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind mode.
    pub bind: BindMode,

    /// Port number.
    pub port: u16,

    /// Enable CORS for local web frontends.
    pub cors: bool,

    /// Evict in-memory sessions idle for this long.
    pub idle_ttl: Option<Duration>,

    /// How often the idle sweeper runs.
    pub sweep_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::Loopback,
            port: DEFAULT_PORT,
            cors: true,
            idle_ttl: None,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl GatewayConfig {
    /// Server settings from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            bind: config.gateway.bind,
            port: config.gateway.port,
            cors: config.gateway.cors,
            idle_ttl: config.session.idle_ttl_secs.map(Duration::from_secs),
            sweep_interval: Duration::from_secs(config.session.sweep_interval_secs),
        }
    }
}

/// Shared server state.
pub struct GatewayState {
    /// Method registry for `/rpc` and `/ws`.
    pub methods: Arc<MethodRegistry>,

    /// Handler context wrapping the session gateway.
    pub context: HandlerContext,

    /// Configuration.
    pub config: GatewayConfig,
}

/// The gateway server.
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a server around a session gateway and register all methods.
    pub async fn new(config: GatewayConfig, sessions: Arc<SessionGateway>) -> Self {
        let methods = Arc::new(MethodRegistry::new());
        let context = HandlerContext::new(sessions);
        register_all(&methods, context.clone()).await;

        Self {
            state: Arc::new(GatewayState {
                methods,
                context,
                config,
            }),
        }
    }

    /// Build the server described by a configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let sessions = Arc::new(SessionGateway::from_config(config)?);
        Ok(Self::new(GatewayConfig::from_config(config), sessions).await)
    }

    /// Get the method registry for registering handlers.
    pub fn methods(&self) -> &Arc<MethodRegistry> {
        &self.state.methods
    }

    /// The session gateway.
    pub fn sessions(&self) -> &Arc<SessionGateway> {
        &self.state.context.gateway
    }

    /// Run the server until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let addr = self.bind_address();

        if self.state.config.bind != BindMode::Loopback {
            warn!(
                "Gateway binding to {}; sessions are reachable from the network without authentication",
                addr
            );
        }

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let sweeper = self.state.config.idle_ttl.map(|ttl| {
            info!("Evicting sessions idle for more than {:?}", ttl);
            self.sessions()
                .store()
                .clone()
                .spawn_idle_sweeper(ttl, self.state.config.sweep_interval)
        });

        info!("Starting gateway server on {}", listener.local_addr()?);

        let result = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result.map_err(GatewayError::Io)?;

        info!("Gateway server stopped");
        Ok(())
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/sessions", post(start_session).get(list_sessions))
            .route("/sessions/:id", delete(stop_session))
            .route("/sessions/:id/messages", post(send_message))
            .route("/sessions/:id/traces", get(get_traces))
            .route("/playbooks", get(list_playbooks))
            .route("/health", get(health))
            .route("/rpc", post(rpc))
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone());

        if self.state.config.cors {
            router = router.layer(cors_layer());
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Get the bind address.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = match self.state.config.bind {
            BindMode::Loopback => [127, 0, 0, 1],
            BindMode::Lan => [0, 0, 0, 0],
        };

        SocketAddr::from((ip, self.state.config.port))
    }
}

/// CORS for browser frontends served from localhost on any port.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(is_local_origin)
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

fn is_local_origin(origin: &str) -> bool {
    LOCAL_ORIGINS.iter().any(|allowed| {
        origin
            .strip_prefix(allowed)
            .map(|rest| rest.is_empty() || rest.starts_with(':'))
            .unwrap_or(false)
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

type ApiResult<T> = std::result::Result<Json<T>, GatewayError>;

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| GatewayError::invalid_params(e.body_text()))
}

async fn start_session(
    State(state): State<Arc<GatewayState>>,
    payload: std::result::Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<StartResponse> {
    let request = body(payload)?;
    Ok(Json(state.context.gateway.start_session(request).await?))
}

async fn send_message(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<MessageRequest>, JsonRejection>,
) -> ApiResult<TurnResponse> {
    let request = body(payload)?;
    Ok(Json(state.context.gateway.send_turn(&id, &request.message).await?))
}

async fn get_traces(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
) -> ApiResult<TraceResponse> {
    Ok(Json(state.context.gateway.get_trace(&id).await?))
}

async fn stop_session(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
) -> ApiResult<StopResponse> {
    Ok(Json(state.context.gateway.stop_session(&id).await?))
}

async fn list_sessions(State(state): State<Arc<GatewayState>>) -> ApiResult<SessionsResponse> {
    Ok(Json(state.context.gateway.list_sessions().await?))
}

async fn list_playbooks(
    State(state): State<Arc<GatewayState>>,
) -> ApiResult<BTreeMap<String, String>> {
    Ok(Json(state.context.gateway.list_playbooks().await?))
}

async fn health(State(state): State<Arc<GatewayState>>) -> Json<HealthResponse> {
    Json(HealthResponse::collect(&state.context).await)
}

/// JSON-RPC over plain HTTP.
async fn rpc(State(state): State<Arc<GatewayState>>, body: String) -> impl IntoResponse {
    let response = state.methods.handle_text(&body).await;
    ([(header::CONTENT_TYPE, "application/json")], response)
}

/// WebSocket upgrade handler.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

/// Serve JSON-RPC requests on one WebSocket connection, one at a time.
async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>, remote_addr: SocketAddr) {
    let client_id = uuid::Uuid::new_v4().to_string();
    info!("Client connected: {} from {}", client_id, remote_addr);

    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = state.methods.handle_text(&text).await;
                if let Err(e) = sender.send(Message::Text(response)).await {
                    warn!("Failed to send response to {}: {}", client_id, e);
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!("Client {} closed connection", client_id);
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    info!("Client disconnected: {}", client_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use playbooks_runtime::RuntimeAdapter;
    use playbooks_store::SessionStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn gateway() -> Gateway {
        let sessions = SessionGateway::new(
            Arc::new(SessionStore::in_memory()),
            RuntimeAdapter::degraded_only(),
        );
        Gateway::new(GatewayConfig::default(), Arc::new(sessions)).await
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_rest_session_lifecycle() {
        let router = gateway().await.router();

        let (status, started) = send(&router, "POST", "/sessions", Some(json!({"playbook": "# Greeter\n## Greet"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["reply"], "Hello! I'm Greeter. How can I help you today?");
        let id = started["session_id"].as_str().unwrap().to_string();

        let (status, turn) = send(&router, "POST", &format!("/sessions/{}/messages", id), Some(json!({"message": "hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(turn["success"], true);

        let (_, trace) = send(&router, "GET", &format!("/sessions/{}/traces", id), None).await;
        assert_eq!(trace["data"]["root"]["children"][0]["children"].as_array().unwrap().len(), 2);

        let (_, listed) = send(&router, "GET", "/sessions", None).await;
        assert_eq!(listed["sessions"], json!([id]));

        let (status, stopped) = send(&router, "DELETE", &format!("/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stopped["success"], true);
    }

    #[tokio::test]
    async fn test_input_errors_are_bad_requests() {
        let router = gateway().await.router();

        let (status, body) = send(&router, "POST", "/sessions", Some(json!({"playbook": "untitled"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&router, "POST", "/sessions", Some(json!({"nothing": true}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, "POST", "/sessions/abc/messages", Some(json!({"message": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_expired_session_is_ok() {
        let router = gateway().await.router();
        let (status, turn) = send(&router, "POST", "/sessions/missing/messages", Some(json!({"message": "hi"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(turn["success"], false);
        assert!(turn["replacement_session_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_rpc_endpoint() {
        let router = gateway().await.router();

        let (status, response) = send(
            &router,
            "POST",
            "/rpc",
            Some(json!({"jsonrpc": "2.0", "id": 1, "method": "session.start", "params": {"playbook": "# Greeter"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["success"], true);

        let (_, response) = send(
            &router,
            "POST",
            "/rpc",
            Some(json!({"jsonrpc": "2.0", "id": 2, "method": "session.start", "params": {"playbook": ""}})),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_health_and_playbooks() {
        let router = gateway().await.router();

        let (status, health) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");

        let (status, playbooks) = send(&router, "GET", "/playbooks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(playbooks, json!({}));
    }

    #[test]
    fn test_local_origins() {
        assert!(is_local_origin("http://localhost"));
        assert!(is_local_origin("http://localhost:3000"));
        assert!(is_local_origin("http://127.0.0.1:8080"));
        assert!(!is_local_origin("http://localhost.evil.com"));
        assert!(!is_local_origin("https://example.com"));
    }

    #[tokio::test]
    async fn test_bind_address() {
        let sessions = Arc::new(SessionGateway::new(
            Arc::new(SessionStore::in_memory()),
            RuntimeAdapter::degraded_only(),
        ));
        let config = GatewayConfig {
            bind: BindMode::Lan,
            port: 9000,
            ..Default::default()
        };
        let gateway = Gateway::new(config, sessions).await;
        assert_eq!(gateway.bind_address(), SocketAddr::from(([0, 0, 0, 0], 9000)));
    }
}
