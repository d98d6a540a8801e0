//! In-process document store.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use timeliner_api::{NewTimeline, Timeline, TimelineId, TimelinePatch, TimelineSummary};

use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    /// Oldest first.
    docs: Vec<Timeline>,
}

/// A [`Gateway`] that keeps documents in memory. Ids are sequential
/// numbers starting at 1.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // a poisoned lock only means a test panicked mid-call
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(&self) -> Result<Vec<TimelineSummary>> {
        Ok(self.lock().docs.iter().rev().filter_map(Timeline::summary).collect())
    }

    async fn get(&self, id: &TimelineId) -> Result<Timeline> {
        self.lock()
            .docs
            .iter()
            .find(|doc| doc.id.as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn create(&self, timeline: NewTimeline) -> Result<Timeline> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let doc = Timeline {
            id: Some(TimelineId(inner.next_id.to_string())),
            name: Some(timeline.name),
            created_at: Some(Utc::now()),
            updated_at: None,
            data: timeline.data,
        };
        inner.docs.push(doc.clone());
        Ok(doc)
    }

    async fn update(&self, id: &TimelineId, patch: TimelinePatch) -> Result<Timeline> {
        let mut inner = self.lock();
        let doc = inner
            .docs
            .iter_mut()
            .find(|doc| doc.id.as_ref() == Some(id))
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            doc.name = Some(name);
        }
        if let Some(data) = patch.data {
            doc.data = data;
        }
        doc.updated_at = Some(Utc::now());
        Ok(doc.clone())
    }

    async fn delete(&self, id: &TimelineId) -> Result<()> {
        let mut inner = self.lock();
        let before = inner.docs.len();
        inner.docs.retain(|doc| doc.id.as_ref() != Some(id));
        if inner.docs.len() == before {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
