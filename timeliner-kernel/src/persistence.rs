//! File-backed offline store.
//!
//! Without a backend the editor keeps exactly one document, stored as JSON
//! under a fixed key in the data directory. The same file remembers which
//! remote document was open last when a backend is configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use timeliner_api::{Grid, Timeline};

use crate::error::Result;
use crate::save::SaveSink;

/// Storage key of the offline document.
pub const STORE_KEY: &str = "timeliner-data";

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store inside `dir` (created if missing).
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self::at(dir.join(format!("{STORE_KEY}.json"))))
    }

    /// Store at an exact file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored document, or `None` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<Timeline>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Replace the stored document. The write goes through a temporary file
    /// so a crash never leaves a truncated document behind.
    pub fn save(&self, doc: &Timeline) -> Result<()> {
        let json = serde_json::to_vec(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "local document written");
        Ok(())
    }

    /// Reset to a fresh single-row document.
    pub fn clear(&self) -> Result<()> {
        self.save(&Timeline::local(Grid::default()))
    }
}

/// Saves snapshots to a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct LocalSink {
    store: LocalStore,
}

impl LocalSink {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SaveSink for LocalSink {
    async fn persist(&self, doc: Arc<Timeline>) -> anyhow::Result<Timeline> {
        let store = self.store.clone();
        let saved = tokio::task::spawn_blocking(move || {
            store.save(&doc)?;
            Ok::<_, crate::KernelError>(doc)
        })
        .await??;
        Ok(Arc::unwrap_or_clone(saved))
    }
}
