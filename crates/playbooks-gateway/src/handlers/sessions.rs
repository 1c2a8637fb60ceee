//! Session RPC method handlers.

use super::HandlerContext;
use crate::methods::{parse_params, MethodHandler};
use crate::protocol::{SessionRef, StartRequest, TurnRequest};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// `session.start`: start or resume a session.
pub struct SessionStartHandler {
    context: Arc<HandlerContext>,
}

impl SessionStartHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for SessionStartHandler {
    async fn call(&self, params: Option<Value>) -> Result<Value> {
        let request: StartRequest = parse_params(params)?;
        debug!("session.start (resume: {:?})", request.existing_session_id);

        let response = self.context.gateway.start_session(request).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// `session.send`: deliver one user message.
pub struct SessionSendHandler {
    context: Arc<HandlerContext>,
}

impl SessionSendHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for SessionSendHandler {
    async fn call(&self, params: Option<Value>) -> Result<Value> {
        let request: TurnRequest = parse_params(params)?;
        debug!("session.send for {}", request.session_id);

        let response = self
            .context
            .gateway
            .send_turn(&request.session_id, &request.message)
            .await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// `session.trace`: fetch the trace tree.
pub struct SessionTraceHandler {
    context: Arc<HandlerContext>,
}

impl SessionTraceHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for SessionTraceHandler {
    async fn call(&self, params: Option<Value>) -> Result<Value> {
        let SessionRef { session_id } = parse_params(params)?;
        let response = self.context.gateway.get_trace(&session_id).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// `session.stop`: end a session.
pub struct SessionStopHandler {
    context: Arc<HandlerContext>,
}

impl SessionStopHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for SessionStopHandler {
    async fn call(&self, params: Option<Value>) -> Result<Value> {
        let SessionRef { session_id } = parse_params(params)?;
        let response = self.context.gateway.stop_session(&session_id).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// `sessions.list`: ids of known sessions.
pub struct SessionsListHandler {
    context: Arc<HandlerContext>,
}

impl SessionsListHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for SessionsListHandler {
    async fn call(&self, _params: Option<Value>) -> Result<Value> {
        let response = self.context.gateway.list_sessions().await?;
        Ok(serde_json::to_value(response)?)
    }
}
