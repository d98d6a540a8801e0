//! Debounced persistence.
//!
//! Edits are cheap and frequent; persisting them is not. The saver task
//! keeps only the latest submitted snapshot and hands it to a [`SaveSink`]
//! once no new snapshot has arrived for the configured quiet period. Each
//! submission restarts the timer, so a burst of edits produces one write
//! carrying the state after the last edit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use timeliner_api::Timeline;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::event::EditorEvent;

/// Destination for debounced saves.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist `doc`, returning the document as the destination now holds it.
    async fn persist(&self, doc: Arc<Timeline>) -> anyhow::Result<Timeline>;
}

enum Request {
    Submit { revision: u64, doc: Arc<Timeline> },
    Flush(oneshot::Sender<()>),
}

/// Handle to a running saver task.
pub struct SaveHandle {
    tx: mpsc::UnboundedSender<Request>,
    task: JoinHandle<()>,
}

/// Spawn the saver on the current tokio runtime.
pub fn spawn_saver(
    sink: Arc<dyn SaveSink>,
    delay: Duration,
    events: broadcast::Sender<EditorEvent>,
) -> SaveHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(sink, delay, rx, events));
    SaveHandle { tx, task }
}

impl SaveHandle {
    /// Replace the pending snapshot and restart the quiet-period timer.
    pub fn submit(&self, revision: u64, doc: Arc<Timeline>) {
        if self.tx.send(Request::Submit { revision, doc }).is_err() {
            tracing::warn!(revision, "saver stopped; snapshot dropped");
        }
    }

    /// Persist the pending snapshot now, if there is one, and wait for it.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Request::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Stop the saver. A snapshot still waiting for its timer is discarded;
    /// call [`flush`](Self::flush) first to keep it.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!("saver task ended abnormally: {}", e);
        }
    }
}

async fn run(
    sink: Arc<dyn SaveSink>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Request>,
    events: broadcast::Sender<EditorEvent>,
) {
    let mut pending: Option<(u64, Arc<Timeline>)> = None;

    loop {
        let request = if pending.is_some() {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(_elapsed) => {
                    if let Some((revision, doc)) = pending.take() {
                        persist(sink.as_ref(), revision, doc, &events).await;
                    }
                    continue;
                }
            }
        } else {
            match rx.recv().await {
                Some(request) => request,
                None => break,
            }
        };

        match request {
            Request::Submit { revision, doc } => {
                tracing::trace!(revision, "save scheduled");
                pending = Some((revision, doc));
            }
            Request::Flush(ack) => {
                if let Some((revision, doc)) = pending.take() {
                    persist(sink.as_ref(), revision, doc, &events).await;
                }
                let _ = ack.send(());
            }
        }
    }

    if let Some((revision, _)) = pending {
        tracing::debug!(revision, "saver closed with an unsaved snapshot");
    }
}

async fn persist(
    sink: &dyn SaveSink,
    revision: u64,
    doc: Arc<Timeline>,
    events: &broadcast::Sender<EditorEvent>,
) {
    let event = match sink.persist(doc).await {
        Ok(saved) => {
            tracing::info!(revision, id = ?saved.id, "document saved");
            EditorEvent::Saved {
                revision,
                id: saved.id,
            }
        }
        Err(e) => {
            tracing::warn!(revision, "save failed: {:#}", e);
            EditorEvent::SaveFailed {
                revision,
                message: format!("{e:#}"),
            }
        }
    };
    let _ = events.send(event);
}
