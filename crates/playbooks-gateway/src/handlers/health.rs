//! Health RPC method handler.

use super::HandlerContext;
use crate::methods::MethodHandler;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status.
    pub status: String,

    /// Gateway version.
    pub version: String,

    /// Uptime in seconds.
    pub uptime_seconds: u64,

    /// Session storage backend.
    pub storage: String,

    /// `live` when agent runtimes can be built, otherwise `degraded`.
    pub runtime: String,

    /// Sessions currently held in memory.
    pub cached_sessions: usize,
}

impl HealthResponse {
    /// Collect the current health of a gateway.
    pub async fn collect(context: &HandlerContext) -> Self {
        let gateway = &context.gateway;
        let runtime = if gateway.adapter().has_factory() {
            "live"
        } else {
            "degraded"
        };

        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: context.started_at.elapsed().as_secs(),
            storage: gateway.store().backend_name().to_string(),
            runtime: runtime.to_string(),
            cached_sessions: gateway.store().cached_len().await,
        }
    }
}

/// `health`: gateway status.
pub struct HealthHandler {
    context: Arc<HandlerContext>,
}

impl HealthHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for HealthHandler {
    async fn call(&self, _params: Option<Value>) -> Result<Value> {
        debug!("Health check request");
        Ok(serde_json::to_value(HealthResponse::collect(&self.context).await)?)
    }
}
