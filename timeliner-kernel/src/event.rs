//! Events emitted by the editor to subscribers (views, the CLI, tests).

use timeliner_api::{BlockPosition, TimelineId};

use crate::focus::Focus;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A new snapshot was committed.
    DocumentChanged { revision: u64 },

    /// The whole document was swapped out (open, import, reset).
    DocumentReplaced { revision: u64 },

    FocusChanged(Focus),

    DragStarted { origin: BlockPosition },

    /// The drag gesture ended at `position`. A cancelled drag keeps every
    /// move already applied.
    DragEnded { position: BlockPosition, cancelled: bool },

    /// The snapshot at `revision` reached its sink.
    Saved { revision: u64, id: Option<TimelineId> },

    SaveFailed { revision: u64, message: String },
}
