//! Session storage and lifecycle for the Playbooks gateway.
//!
//! [`SessionStore`] is the process-wide session registry. It keeps every
//! active session behind its own async mutex, persists the serializable
//! state through a pluggable [`SessionBackend`], and rehydrates sessions
//! from that backend on demand.

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, SessionBackend};
pub use error::StoreError;
pub use store::{SessionEntry, SessionLease, SessionStore};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
