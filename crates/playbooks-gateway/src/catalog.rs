//! Catalog of example playbooks on disk.

use crate::Result;
use playbooks_core::playbook::extract_title;
use playbooks_core::Config;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Markdown playbooks in one directory, keyed by their `# Title`.
#[derive(Debug, Clone)]
pub struct PlaybookCatalog {
    dir: PathBuf,
}

impl PlaybookCatalog {
    /// Create a catalog over a directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the catalog for the configured playbooks directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.playbooks_dir()?))
    }

    /// The scanned directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map of title to source for every `*.md` file with a title.
    ///
    /// A missing directory yields an empty catalog. Unreadable files are
    /// skipped.
    pub async fn list(&self) -> Result<BTreeMap<String, String>> {
        let mut playbooks = BTreeMap::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Playbook directory {} does not exist", self.dir.display());
                return Ok(playbooks);
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable playbook {}: {}", path.display(), e);
                    continue;
                }
            };

            match extract_title(&content) {
                Some(title) => {
                    playbooks.insert(title, content);
                }
                None => debug!("Skipping {}: no title heading", path.display()),
            }
        }

        Ok(playbooks)
    }
}
