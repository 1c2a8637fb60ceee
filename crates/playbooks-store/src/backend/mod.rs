//! Durable session backends.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::Result;
use async_trait::async_trait;
use playbooks_core::{Session, SessionId};

/// Durable storage for serialized sessions.
///
/// Backends store whole records; the store never asks for partial updates.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Load a session, or `None` if no record exists.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Write a session record, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Delete a session record. Deleting a missing record succeeds.
    async fn delete(&self, id: &SessionId) -> Result<()>;

    /// Ids of all stored sessions.
    async fn list(&self) -> Result<Vec<SessionId>>;
}
