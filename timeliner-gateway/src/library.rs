//! Document lifecycle.
//!
//! The library decides which document the editor works on. With a gateway
//! (signed in) documents live on the backend and the local store only
//! remembers the last one opened. Without one, the local store holds the
//! single offline document.

use std::path::Path;
use std::sync::Arc;

use timeliner_api::{Grid, NewTimeline, Timeline, TimelineId, TimelinePatch, TimelineSummary};
use timeliner_kernel::{KernelError, LocalSink, LocalStore, SaveSink, export};

use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;
use crate::sink::RemoteSink;

pub struct Library {
    store: LocalStore,
    gateway: Option<Arc<dyn Gateway>>,
}

impl Library {
    /// A library that only uses the local store.
    pub fn offline(store: LocalStore) -> Self {
        Self { store, gateway: None }
    }

    pub fn online(store: LocalStore, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            store,
            gateway: Some(gateway),
        }
    }

    pub fn is_online(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn gateway(&self) -> Result<&Arc<dyn Gateway>> {
        self.gateway.as_ref().ok_or(GatewayError::Unauthorized)
    }

    /// Where the editor's debounced saves should go.
    pub fn sink(&self) -> Arc<dyn SaveSink> {
        match &self.gateway {
            Some(gateway) => Arc::new(RemoteSink::new(gateway.clone()).with_mirror(self.store.clone())),
            None => Arc::new(LocalSink::new(self.store.clone())),
        }
    }

    /// The local document, if there is a readable one.
    fn remembered(&self) -> Option<Timeline> {
        match self.store.load() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("ignoring unreadable local document: {}", e);
                None
            }
        }
    }

    fn remember(&self, doc: &Timeline) -> Result<()> {
        self.store.save(doc)?;
        Ok(())
    }

    /// Every document on the backend, newest first. Empty when offline.
    pub async fn list(&self) -> Result<Vec<TimelineSummary>> {
        match &self.gateway {
            Some(gateway) => gateway.list().await,
            None => Ok(Vec::new()),
        }
    }

    /// Pick the document to edit at startup.
    ///
    /// Online: the remembered document if it still exists, else the newest
    /// one, else nothing. Offline: the local document, or a fresh grid.
    pub async fn startup(&self) -> Result<Option<Timeline>> {
        let Some(gateway) = &self.gateway else {
            let doc = self.remembered().unwrap_or_else(|| Timeline::local(Grid::default()));
            return Ok(Some(doc));
        };

        let listed = gateway.list().await?;
        let remembered = self.remembered().and_then(|doc| doc.id);
        let pick = remembered
            .filter(|id| listed.iter().any(|t| &t.id == id))
            .or_else(|| listed.first().map(|t| t.id.clone()));

        match pick {
            Some(id) => Ok(Some(self.open(&id).await?)),
            None => {
                tracing::info!("no timelines on the backend yet");
                Ok(None)
            }
        }
    }

    /// Fetch a document without making it current.
    pub async fn get(&self, id: &TimelineId) -> Result<Timeline> {
        self.gateway()?.get(id).await
    }

    /// Fetch a document and remember it as the current one.
    pub async fn open(&self, id: &TimelineId) -> Result<Timeline> {
        let doc = self.get(id).await?;
        self.remember(&doc)?;
        tracing::info!(%id, "opened timeline");
        Ok(doc)
    }

    /// Create an empty document on the backend and make it current.
    pub async fn create(&self, name: &str) -> Result<Timeline> {
        let doc = self
            .gateway()?
            .create(NewTimeline {
                name: name.to_string(),
                data: Grid::default(),
            })
            .await?;
        self.remember(&doc)?;
        Ok(doc)
    }

    /// Rename `doc`. Offline, the local document is renamed in place.
    pub async fn rename(&self, doc: &Timeline, name: &str) -> Result<Timeline> {
        let renamed = match (&self.gateway, &doc.id) {
            (Some(gateway), Some(id)) => gateway.update(id, TimelinePatch::rename(name)).await?,
            (Some(_), None) => return Err(GatewayError::NotFound("unsaved document".into())),
            (None, _) => Timeline {
                name: Some(name.to_string()),
                ..doc.clone()
            },
        };
        self.remember(&renamed)?;
        Ok(renamed)
    }

    /// Delete `doc` and return the document to continue with.
    ///
    /// Offline the local document is reset to a fresh grid. Online the
    /// newest remaining document is opened, or nothing when none is left.
    pub async fn delete(&self, doc: &Timeline) -> Result<Option<Timeline>> {
        let Some(gateway) = &self.gateway else {
            self.store.clear()?;
            tracing::info!("local timeline reset");
            return Ok(self.remembered());
        };

        let id = doc
            .id
            .as_ref()
            .ok_or_else(|| GatewayError::NotFound("unsaved document".into()))?;
        gateway.delete(id).await?;
        tracing::info!(%id, "deleted timeline");

        match gateway.list().await?.first() {
            Some(next) => Ok(Some(self.open(&next.id).await?)),
            None => Ok(None),
        }
    }

    /// Import an exported grid file as a new document named after the file.
    pub async fn import(&self, path: &Path) -> Result<Timeline> {
        let text = tokio::fs::read_to_string(path).await.map_err(KernelError::from)?;
        let data = export::import_grid(&text)?;
        let name = export::import_name(path);

        let doc = match &self.gateway {
            Some(gateway) => gateway.create(NewTimeline { name, data }).await?,
            None => Timeline {
                name: Some(name),
                ..Timeline::local(data)
            },
        };
        self.remember(&doc)?;
        tracing::info!(path = %path.display(), "imported timeline");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryGateway;
    use tempfile::TempDir;

    fn offline() -> (TempDir, Library) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, Library::offline(store))
    }

    fn online() -> (TempDir, Arc<MemoryGateway>, Library) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let gateway = Arc::new(MemoryGateway::new());
        let library = Library::online(store, gateway.clone());
        (dir, gateway, library)
    }

    #[tokio::test]
    async fn offline_startup_uses_local_document_or_default() {
        let (_dir, library) = offline();
        assert_eq!(library.startup().await.unwrap(), Some(Timeline::local(Grid::default())));

        let mut grid = Grid::new();
        grid.rows[0].title = "kept".into();
        library.store().save(&Timeline::local(grid.clone())).unwrap();
        assert_eq!(library.startup().await.unwrap().unwrap().data, grid);
    }

    #[tokio::test]
    async fn online_startup_prefers_remembered_document() {
        let (_dir, _gateway, library) = online();
        let first = library.create("first").await.unwrap();
        library.create("second").await.unwrap();

        // the newest wins without a remembered document
        library.store().clear().unwrap();
        let doc = library.startup().await.unwrap().unwrap();
        assert_eq!(doc.name.as_deref(), Some("second"));

        library.open(first.id.as_ref().unwrap()).await.unwrap();
        let doc = library.startup().await.unwrap().unwrap();
        assert_eq!(doc.id, first.id);
    }

    #[tokio::test]
    async fn online_startup_with_no_documents_is_empty() {
        let (_dir, _gateway, library) = online();
        assert_eq!(library.startup().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_remembered_document_falls_back_to_newest() {
        let (_dir, _gateway, library) = online();
        library.create("only").await.unwrap();
        let mut stale = Timeline::local(Grid::new());
        stale.id = Some(TimelineId::from("999"));
        library.store().save(&stale).unwrap();

        let doc = library.startup().await.unwrap().unwrap();
        assert_eq!(doc.name.as_deref(), Some("only"));
    }

    #[tokio::test]
    async fn rename_goes_to_the_backend() {
        let (_dir, gateway, library) = online();
        let doc = library.create("draft").await.unwrap();
        let renamed = library.rename(&doc, "final").await.unwrap();
        assert_eq!(renamed.name.as_deref(), Some("final"));
        assert_eq!(gateway.list().await.unwrap()[0].name, "final");
    }

    #[tokio::test]
    async fn offline_delete_resets_the_local_document() {
        let (_dir, library) = offline();
        let mut grid = Grid::new();
        grid.rows[0].title = "gone".into();
        let doc = Timeline::local(grid);
        library.store().save(&doc).unwrap();

        let next = library.delete(&doc).await.unwrap().unwrap();
        assert_eq!(next.data, Grid::default());
    }

    #[tokio::test]
    async fn online_delete_opens_the_next_document() {
        let (_dir, gateway, library) = online();
        let older = library.create("older").await.unwrap();
        let newer = library.create("newer").await.unwrap();

        let next = library.delete(&newer).await.unwrap().unwrap();
        assert_eq!(next.id, older.id);

        assert_eq!(library.delete(&older).await.unwrap(), None);
        assert!(gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_names_the_document_after_the_file() {
        let (dir, gateway, library) = online();
        let path = dir.path().join("roadmap.cbo");
        std::fs::write(&path, "\u{feff}[{\"title\":\"Q1\",\"columns\":[[]]}]").unwrap();

        let doc = library.import(&path).await.unwrap();
        assert_eq!(doc.name.as_deref(), Some("roadmap"));
        assert_eq!(doc.data.rows[0].title, "Q1");
        assert_eq!(gateway.list().await.unwrap().len(), 1);
        assert_eq!(library.store().load().unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn import_of_invalid_file_fails() {
        let (dir, library) = offline();
        let path = dir.path().join("broken.cbo");
        std::fs::write(&path, "not a grid").unwrap();
        assert!(matches!(
            library.import(&path).await,
            Err(GatewayError::Store(KernelError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn offline_library_cannot_open_remote_documents() {
        let (_dir, library) = offline();
        assert!(matches!(
            library.open(&TimelineId::from("1")).await,
            Err(GatewayError::Unauthorized)
        ));
        assert!(library.list().await.unwrap().is_empty());
    }
}
