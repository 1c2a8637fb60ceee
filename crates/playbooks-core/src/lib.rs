//! # playbooks-core
//!
//! Core types, configuration, and utilities for the Playbooks gateway.
//!
//! This crate provides shared functionality used across all gateway crates:
//!
//! - **Configuration**: Loading, validation, and management of config files
//! - **Types**: Sessions, chat messages, trace entries, and runtime fragments
//! - **Aggregation**: Folding runtime fragments into a reply and trace entries
//! - **Playbooks**: Validating playbook sources and extracting their titles

pub mod aggregate;
pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod paths;
pub mod playbook;
pub mod types;

// Re-exports for convenience
pub use aggregate::{aggregate, Aggregate};
pub use config::Config;
pub use error::{Error, PlaybookError, Result};
pub use playbook::Playbook;
pub use types::*;
