//! RPC method handlers.
//!
//! Each handler is a thin adapter from JSON-RPC params to one
//! [`SessionGateway`](crate::SessionGateway) operation.

pub mod health;
pub mod playbooks;
pub mod sessions;

use crate::methods::{register_builtin, MethodRegistry};
use crate::service::SessionGateway;
use std::sync::Arc;
use std::time::Instant;

pub use health::{HealthHandler, HealthResponse};
pub use playbooks::PlaybooksListHandler;
pub use sessions::{
    SessionSendHandler, SessionStartHandler, SessionStopHandler, SessionTraceHandler,
    SessionsListHandler,
};

/// Shared state for method handlers.
#[derive(Clone)]
pub struct HandlerContext {
    /// The session gateway.
    pub gateway: Arc<SessionGateway>,

    /// When the server started.
    pub started_at: Instant,
}

impl HandlerContext {
    /// Create a handler context.
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self {
            gateway,
            started_at: Instant::now(),
        }
    }
}

/// Register all method handlers.
pub async fn register_all(registry: &Arc<MethodRegistry>, context: HandlerContext) {
    let ctx = Arc::new(context);

    register_builtin(registry).await;

    // Session methods
    registry
        .register("session.start", Arc::new(SessionStartHandler::new(ctx.clone())))
        .await;
    registry
        .register("session.send", Arc::new(SessionSendHandler::new(ctx.clone())))
        .await;
    registry
        .register("session.trace", Arc::new(SessionTraceHandler::new(ctx.clone())))
        .await;
    registry
        .register("session.stop", Arc::new(SessionStopHandler::new(ctx.clone())))
        .await;
    registry
        .register("sessions.list", Arc::new(SessionsListHandler::new(ctx.clone())))
        .await;

    // Catalog
    registry
        .register("playbooks.list", Arc::new(PlaybooksListHandler::new(ctx.clone())))
        .await;

    registry
        .register("health", Arc::new(HealthHandler::new(ctx)))
        .await;
}
