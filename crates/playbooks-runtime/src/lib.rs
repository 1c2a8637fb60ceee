//! Agent runtime contract and adapter for the Playbooks gateway.
//!
//! This crate provides:
//! - The [`AgentRuntime`] and [`RuntimeFactory`] contract
//! - A live runtime backed by a chat model ([`llm`])
//! - The deterministic stand-in used when no live runtime is available
//! - The [`RuntimeAdapter`] implementing the degrade policy

pub mod adapter;
pub mod contract;
pub mod degraded;
pub mod error;
pub mod llm;

pub use adapter::{Fragments, RuntimeAdapter, RuntimeHandle};
pub use contract::{AgentRuntime, FragmentStream, RuntimeFactory};
pub use degraded::DegradedRuntime;
pub use error::RuntimeError;
pub use llm::{LlmRuntime, LlmRuntimeFactory};

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
