//! Gateway for Playbooks sessions.
//!
//! This crate provides:
//! - [`SessionGateway`], the per-request orchestration of sessions, runtimes
//!   and traces
//! - A REST surface mirroring the original playbooks API
//! - JSON-RPC 2.0 over `POST /rpc` and over WebSocket
//! - A catalog of example playbooks

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod methods;
pub mod protocol;
pub mod rpc;
pub mod server;
pub mod service;

pub use catalog::PlaybookCatalog;
pub use error::GatewayError;
pub use handlers::HandlerContext;
pub use methods::{MethodHandler, MethodRegistry};
pub use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{Gateway, GatewayConfig};
pub use service::SessionGateway;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
