//! Debounced saves against a remote gateway.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use timeliner_api::{Timeline, TimelinePatch};
use timeliner_kernel::{LocalStore, SaveSink};

use crate::gateway::Gateway;

/// Sends each saved snapshot as a `{name, data}` update and mirrors the
/// stored result into the local store, so the next start reopens it.
pub struct RemoteSink {
    gateway: Arc<dyn Gateway>,
    mirror: Option<LocalStore>,
}

impl RemoteSink {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway, mirror: None }
    }

    pub fn with_mirror(mut self, store: LocalStore) -> Self {
        self.mirror = Some(store);
        self
    }
}

#[async_trait]
impl SaveSink for RemoteSink {
    async fn persist(&self, doc: Arc<Timeline>) -> anyhow::Result<Timeline> {
        let id = doc.id.clone().context("document was never stored on the backend")?;
        let saved = self
            .gateway
            .update(&id, TimelinePatch::from_document(&doc))
            .await
            .with_context(|| format!("failed to save timeline {id}"))?;

        if let Some(store) = &self.mirror {
            if let Err(e) = store.save(&saved) {
                tracing::warn!("failed to mirror timeline {} locally: {}", id, e);
            }
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryGateway;
    use tempfile::TempDir;
    use timeliner_api::{Grid, NewTimeline};

    #[tokio::test]
    async fn persist_updates_backend_and_mirror() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let gateway = Arc::new(MemoryGateway::new());
        let created = gateway
            .create(NewTimeline { name: "plan".into(), data: Grid::new() })
            .await
            .unwrap();

        let sink = RemoteSink::new(gateway.clone()).with_mirror(store.clone());
        let mut edited = created.clone();
        edited.data.rows[0].title = "Q1".into();
        let saved = sink.persist(Arc::new(edited)).await.unwrap();

        assert_eq!(saved.data.rows[0].title, "Q1");
        let remote = gateway.get(created.id.as_ref().unwrap()).await.unwrap();
        assert_eq!(remote.data.rows[0].title, "Q1");
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn unsaved_document_is_an_error() {
        let sink = RemoteSink::new(Arc::new(MemoryGateway::new()));
        let err = sink.persist(Arc::new(Timeline::local(Grid::new()))).await.unwrap_err();
        assert!(err.to_string().contains("never stored"));
    }
}
