//! Playbook catalog RPC method handler.

use super::HandlerContext;
use crate::methods::MethodHandler;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// `playbooks.list`: example playbooks keyed by title.
pub struct PlaybooksListHandler {
    context: Arc<HandlerContext>,
}

impl PlaybooksListHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for PlaybooksListHandler {
    async fn call(&self, _params: Option<Value>) -> Result<Value> {
        let playbooks = self.context.gateway.list_playbooks().await?;
        Ok(serde_json::to_value(playbooks)?)
    }
}
