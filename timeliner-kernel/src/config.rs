//! Engine settings.

use std::time::Duration;

/// Quiet period before a burst of edits is persisted.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// How long the saver waits after the latest edit before persisting.
    pub save_debounce: Duration,
    /// Drop trailing all-empty columns after a drag moves a block.
    pub prune_empty_columns: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            prune_empty_columns: false,
        }
    }
}
