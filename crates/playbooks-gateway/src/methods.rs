//! RPC method registry and built-in methods.

use crate::error::GatewayError;
use crate::rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for RPC method handlers.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Handle the method call.
    async fn call(&self, params: Option<Value>) -> Result<Value>;
}

/// Decode method parameters, treating absent params as `null`.
pub fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| GatewayError::invalid_params(e.to_string()))
}

/// Registry for RPC methods.
#[derive(Default)]
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, Arc<dyn MethodHandler>>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method handler, replacing any previous one.
    pub async fn register(&self, name: impl Into<String>, handler: Arc<dyn MethodHandler>) {
        self.methods.write().await.insert(name.into(), handler);
    }

    /// Call a method.
    pub async fn call(&self, name: &str, params: Option<Value>) -> Result<Value> {
        let handler = self
            .methods
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::MethodNotFound(name.to_string()))?;

        debug!("Calling method: {}", name);
        handler.call(params).await
    }

    /// Dispatch a parsed request.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = self.call(&request.method, request.params).await;
        JsonRpcResponse::from_result(request.id, result)
    }

    /// Dispatch a raw JSON-RPC message and encode the response.
    pub async fn handle_text(&self, text: &str) -> String {
        let response = match serde_json::from_str::<JsonRpcRequest>(text) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => JsonRpcResponse::error(None, JsonRpcError::parse_error(e.to_string())),
        };
        serde_json::to_string(&response).unwrap_or_default()
    }

    /// Registered method names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Ping method.
pub struct PingHandler;

#[async_trait]
impl MethodHandler for PingHandler {
    async fn call(&self, _params: Option<Value>) -> Result<Value> {
        Ok(serde_json::json!({
            "pong": true,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

/// Lists the registered methods.
pub struct ListMethodsHandler {
    registry: Arc<MethodRegistry>,
}

impl ListMethodsHandler {
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MethodHandler for ListMethodsHandler {
    async fn call(&self, _params: Option<Value>) -> Result<Value> {
        Ok(serde_json::json!({ "methods": self.registry.list().await }))
    }
}

/// Register the methods that need no session state.
pub async fn register_builtin(registry: &Arc<MethodRegistry>) {
    registry.register("ping", Arc::new(PingHandler)).await;
    registry
        .register("methods.list", Arc::new(ListMethodsHandler::new(registry.clone())))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[tokio::test]
    async fn test_builtin_methods() {
        let registry = Arc::new(MethodRegistry::new());
        register_builtin(&registry).await;

        let result = registry.call("ping", None).await.unwrap();
        assert_eq!(result["pong"], true);

        let result = registry.call("methods.list", None).await.unwrap();
        assert_eq!(result["methods"], serde_json::json!(["methods.list", "ping"]));
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let registry = MethodRegistry::new();
        let result = registry.call("nonexistent", None).await;
        assert!(matches!(result, Err(GatewayError::MethodNotFound(_))));
    }

    #[tokio::test]
    async fn test_handle_text_reports_parse_errors() {
        let registry = MethodRegistry::new();
        let text = registry.handle_text("{not json").await;
        let response: JsonRpcResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_handle_text_echoes_id() {
        let registry = Arc::new(MethodRegistry::new());
        register_builtin(&registry).await;

        let text = registry
            .handle_text(r#"{"jsonrpc":"2.0","id":42,"method":"ping"}"#)
            .await;
        let response: JsonRpcResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(response.id, Some(serde_json::json!(42)));
        assert_eq!(response.result.unwrap()["pong"], true);
    }

    #[test]
    fn test_parse_params() {
        #[derive(Deserialize)]
        struct Params {
            session_id: String,
        }

        let params: Params = parse_params(Some(serde_json::json!({"session_id": "abc"}))).unwrap();
        assert_eq!(params.session_id, "abc");

        let err = parse_params::<Params>(None).err().unwrap();
        assert!(matches!(err, GatewayError::InvalidParams(_)));
    }
}
