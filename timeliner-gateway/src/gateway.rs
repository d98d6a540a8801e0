//! The remote document store contract.

use async_trait::async_trait;
use timeliner_api::{NewTimeline, Timeline, TimelineId, TimelinePatch, TimelineSummary};

use crate::error::Result;

/// A per-user store of timeline documents.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Every document of the signed-in user, newest first.
    async fn list(&self) -> Result<Vec<TimelineSummary>>;

    async fn get(&self, id: &TimelineId) -> Result<Timeline>;

    async fn create(&self, timeline: NewTimeline) -> Result<Timeline>;

    /// Apply `patch` and return the document as stored afterwards.
    async fn update(&self, id: &TimelineId, patch: TimelinePatch) -> Result<Timeline>;

    async fn delete(&self, id: &TimelineId) -> Result<()>;
}
