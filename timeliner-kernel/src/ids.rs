//! Block id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use timeliner_api::{BlockId, Grid};

/// Hands out block ids derived from the wall clock in milliseconds.
///
/// Ids are strictly increasing within a process: two requests in the same
/// millisecond, or a clock that steps backwards, still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that never reissues an id already present in `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        let ids = Self::new();
        ids.observe(grid);
        ids
    }

    pub fn next(&self) -> BlockId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return BlockId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Raise the floor above every id in `grid`.
    pub fn observe(&self, grid: &Grid) {
        if let Some(max) = grid.blocks().filter_map(|(_, b)| b.id).map(|id| id.0).max() {
            self.last.fetch_max(max, Ordering::Relaxed);
        }
    }
}
