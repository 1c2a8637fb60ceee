use super::SessionBackend;
use crate::Result;
use async_trait::async_trait;
use playbooks_core::{id, Session, SessionId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// One pretty-printed JSON file per session (`<dir>/<id>.json`).
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a backend storing records under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding the session files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        // Session ids are restricted to [A-Za-z0-9_-], so they are safe file names.
        self.base_dir.join(format!("{}.json", id.as_str()))
    }
}

#[async_trait]
impl SessionBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Session>> {
        let path = self.session_path(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;

        let path = self.session_path(&session.id);
        let json = serde_json::to_string_pretty(session)?;

        // Write atomically
        let temp_path = self
            .base_dir
            .join(format!(".{}.{}.tmp", session.id.as_str(), id::short_id()));
        fs::write(&temp_path, json).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!("Saved session to {:?}", path);
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        match fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<SessionId>> {
        let mut ids = Vec::new();
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |e| e == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| SessionId::parse(s).ok())
                {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }
}
