use super::SessionBackend;
use crate::Result;
use async_trait::async_trait;
use playbooks_core::{Session, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local backend. Records survive eviction but not a restart.
#[derive(Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, Session>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Session>> {
        Ok(self.records.read().await.get(id.as_str()).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        self.records
            .write()
            .await
            .insert(session.id.to_string(), session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        self.records.write().await.remove(id.as_str());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SessionId>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .map(|s| s.id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_delete() {
        let backend = MemoryBackend::new();
        let id = SessionId::generate();
        let session = Session::new(id.clone(), "# Greeter");

        assert!(backend.load(&id).await.unwrap().is_none());
        backend.save(&session).await.unwrap();
        assert_eq!(backend.load(&id).await.unwrap().unwrap().playbook_source, "# Greeter");
        assert_eq!(backend.list().await.unwrap(), vec![id.clone()]);

        backend.delete(&id).await.unwrap();
        backend.delete(&id).await.unwrap();
        assert!(backend.load(&id).await.unwrap().is_none());
    }
}
