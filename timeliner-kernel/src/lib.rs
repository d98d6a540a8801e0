//! Timeliner Kernel - the editing engine.
//!
//! This crate contains everything that changes a timeline document:
//! - Grid model (pure structural edits on immutable snapshots)
//! - Focus state machine and focus-driven commands
//! - Drag-reorder engine
//! - Debounced saving and the local offline store
//! - File export and import

pub mod commands;
pub mod drag;
pub mod export;
pub mod focus;
pub mod grid;
pub mod ids;
pub mod persistence;
pub mod save;

mod config;
mod error;
mod event;

pub use commands::{Command, Edit};
pub use config::{DEFAULT_SAVE_DEBOUNCE, EditorConfig};
pub use drag::{DragSession, HoverTarget, Rect};
pub use error::{KernelError, Result};
pub use event::EditorEvent;
pub use focus::{Focus, FocusEvent};
pub use ids::IdGenerator;
pub use persistence::{LocalSink, LocalStore};
pub use save::{SaveHandle, SaveSink, spawn_saver};

use std::sync::Arc;

use timeliner_api::{Block, BlockField, BlockPosition, Color, Grid, Timeline};
use tokio::sync::broadcast;

/// The editor - owns the current document snapshot, focus and drag state.
///
/// Every edit replaces the snapshot with a new `Arc<Timeline>`; snapshots
/// handed out earlier are never mutated.
pub struct Editor {
    document: Arc<Timeline>,
    focus: Focus,
    drag: Option<DragSession>,
    ids: IdGenerator,
    config: EditorConfig,
    /// Bumped on every committed edit.
    revision: u64,
    saver: Option<SaveHandle>,
    event_tx: broadcast::Sender<EditorEvent>,
}

impl Editor {
    /// Create an editor without persistence.
    pub fn new(document: Timeline, config: EditorConfig) -> (Self, broadcast::Receiver<EditorEvent>) {
        let (event_tx, event_rx) = broadcast::channel(1024);
        let editor = Self {
            ids: IdGenerator::for_grid(&document.data),
            document: Arc::new(document),
            focus: Focus::None,
            drag: None,
            config,
            revision: 0,
            saver: None,
            event_tx,
        };
        (editor, event_rx)
    }

    /// Create an editor whose edits are saved to `sink`. Must be called
    /// inside a tokio runtime.
    pub fn with_sink(
        document: Timeline,
        config: EditorConfig,
        sink: Arc<dyn SaveSink>,
    ) -> (Self, broadcast::Receiver<EditorEvent>) {
        let (mut editor, event_rx) = Self::new(document, config);
        editor.saver = Some(spawn_saver(sink, editor.config.save_debounce, editor.event_tx.clone()));
        (editor, event_rx)
    }

    /// Subscribe to editor events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        let _ = self.event_tx.send(event);
    }

    /// The current document snapshot.
    pub fn snapshot(&self) -> Arc<Timeline> {
        Arc::clone(&self.document)
    }

    pub fn grid(&self) -> &Grid {
        &self.document.data
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    // ---- focus ----

    pub fn handle_click(&mut self, event: FocusEvent) {
        self.set_focus(self.focus.transition(event));
    }

    pub fn click_block(&mut self, pos: BlockPosition) {
        self.handle_click(FocusEvent::ClickBlock(pos));
    }

    pub fn click_row(&mut self, row: usize) {
        self.handle_click(FocusEvent::ClickRowTitle(row));
    }

    pub fn click_background(&mut self) {
        self.handle_click(FocusEvent::ClickOutside);
    }

    fn set_focus(&mut self, focus: Focus) {
        if focus != self.focus {
            self.focus = focus;
            self.emit(EditorEvent::FocusChanged(focus));
        }
    }

    // ---- commands ----

    pub fn is_enabled(&self, command: &Command) -> bool {
        command.is_enabled(self.grid(), self.focus)
    }

    /// Run a focus-driven command. Returns `false` when it is disabled.
    pub fn execute(&mut self, command: &Command) -> bool {
        match command.apply(self.grid(), self.focus, &self.ids) {
            Some(Edit { grid, focus }) => {
                tracing::debug!(command = command.name(), "executed");
                self.commit(grid, focus);
                true
            }
            None => false,
        }
    }

    // ---- direct edits ----

    pub fn set_block_field(&mut self, pos: BlockPosition, field: BlockField) {
        let next = grid::set_block_field(self.grid(), pos, field);
        self.commit_rebased(next);
    }

    pub fn set_block_color(&mut self, pos: BlockPosition, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        self.set_block_field(pos, BlockField::Color(color));
        Ok(())
    }

    pub fn set_row_title(&mut self, row: usize, title: impl Into<String>) {
        let next = grid::set_row_title(self.grid(), row, title);
        self.commit_rebased(next);
    }

    /// Insert an empty row at `index`. Focus on or below it moves down with
    /// its row.
    pub fn insert_row(&mut self, index: usize) {
        let next = grid::insert_row(self.grid(), index);
        let focus = self.focus.row_inserted(index);
        self.commit(next, focus);
    }

    pub fn insert_column(&mut self, index: usize) {
        let next = grid::insert_column(self.grid(), index);
        self.commit_rebased(next);
    }

    /// Insert `block`, giving it a fresh id when it has none.
    pub fn insert_block(&mut self, pos: BlockPosition, mut block: Block) -> BlockPosition {
        if block.id.is_none() {
            block.id = Some(self.ids.next());
        }
        let next = grid::insert_block(self.grid(), pos, block);
        self.commit_rebased(next);
        pos
    }

    pub fn remove_block(&mut self, pos: BlockPosition) -> Block {
        let (next, removed) = grid::remove_block(self.grid(), pos);
        self.commit_rebased(next);
        removed
    }

    /// Move the block at `from` to `to` (splice semantics).
    ///
    /// # Panics
    ///
    /// Panics if there is no block at `from`.
    pub fn move_block(&mut self, from: BlockPosition, to: BlockPosition) {
        let Some(block) = self.grid().block(from).cloned() else {
            panic!("move_block: no block at {from}");
        };
        let next = grid::move_block(self.grid(), &block, from, to);
        let next = self.compact(next);
        self.commit_rebased(next);
    }

    /// Materialize a preview block at `pos` and focus it. `pos.column` may
    /// be the column just past the end, which grows the grid.
    pub fn add_preview_block(&mut self, pos: BlockPosition) -> BlockPosition {
        let mut block = Block::preview();
        block.id = Some(self.ids.next());
        block.title.clear();
        block.body.clear();

        let next = grid::insert_block(self.grid(), pos, block);
        self.commit(next, Focus::Block(pos));
        pos
    }

    /// Append an empty row and focus its title.
    pub fn add_preview_row(&mut self) -> usize {
        let row = self.grid().row_count();
        let next = grid::insert_row(self.grid(), row);
        self.commit(next, Focus::Row(row));
        row
    }

    // ---- drag ----

    /// Start dragging the block at `origin`.
    pub fn begin_drag(&mut self, origin: BlockPosition) -> bool {
        let Some(block) = self.grid().block(origin).cloned() else {
            return false;
        };
        self.start_drag(DragSession::begin(block, origin));
        true
    }

    /// Start dragging a new preview block. `origin` is where the preview is
    /// shown; it is not part of the grid until the first move.
    pub fn begin_preview_drag(&mut self, origin: BlockPosition) {
        self.start_drag(DragSession::begin(Block::preview(), origin));
    }

    fn start_drag(&mut self, session: DragSession) {
        if self.drag.is_some() {
            tracing::debug!("drag: replacing an unfinished session");
        }
        let origin = session.origin();
        self.drag = Some(session);
        self.emit(EditorEvent::DragStarted { origin });
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Feed a hover event to the active drag. Returns whether the grid
    /// changed.
    pub fn drag_hover(&mut self, target: &HoverTarget) -> bool {
        let Some(session) = self.drag.as_mut() else {
            return false;
        };
        match session.hover(&self.document.data, target, &self.ids) {
            Some(next) => {
                self.commit_rebased(next);
                true
            }
            None => false,
        }
    }

    /// End the drag where it is. Returns the final position of the block.
    pub fn drop_drag(&mut self) -> Option<BlockPosition> {
        self.end_drag(false)
    }

    /// Abandon the drag. Moves already applied stay applied.
    pub fn cancel_drag(&mut self) -> Option<BlockPosition> {
        self.end_drag(true)
    }

    fn end_drag(&mut self, cancelled: bool) -> Option<BlockPosition> {
        let session = self.drag.take()?;
        let moved = session.hover_position().is_some();
        let position = session.finish();

        if moved && self.config.prune_empty_columns {
            let pruned = grid::prune_trailing_columns(self.grid());
            if pruned != *self.grid() {
                self.commit_rebased(pruned);
            }
        }

        self.emit(EditorEvent::DragEnded { position, cancelled });
        Some(position)
    }

    // ---- document ----

    /// Swap in another document (open, import, reset). Focus and any drag
    /// are dropped; nothing is saved.
    pub fn replace_document(&mut self, document: Timeline) {
        self.ids.observe(&document.data);
        self.document = Arc::new(document);
        self.drag = None;
        self.set_focus(Focus::None);
        self.revision += 1;
        self.emit(EditorEvent::DocumentReplaced {
            revision: self.revision,
        });
    }

    /// Rename the document. Saved like any other edit.
    pub fn rename(&mut self, name: impl Into<String>) {
        let mut doc = self.document.with_data(self.grid().clone());
        doc.name = Some(name.into());
        self.publish(doc);
    }

    /// Distinct colors in use, in first-seen order.
    pub fn preset_colors(&self) -> Vec<Color> {
        self.grid().preset_colors()
    }

    /// Persist any pending snapshot now.
    pub async fn flush(&self) {
        if let Some(saver) = &self.saver {
            saver.flush().await;
        }
    }

    /// Flush pending work and stop the saver.
    pub async fn shutdown(mut self) {
        if let Some(saver) = self.saver.take() {
            saver.flush().await;
            saver.shutdown().await;
        }
    }

    fn compact(&self, grid: Grid) -> Grid {
        if self.config.prune_empty_columns {
            grid::prune_trailing_columns(&grid)
        } else {
            grid
        }
    }

    fn commit_rebased(&mut self, grid: Grid) {
        let focus = self.focus.rebase(self.grid(), &grid);
        self.commit(grid, focus);
    }

    fn commit(&mut self, grid: Grid, focus: Focus) {
        debug_assert!(grid.is_rectangular(), "edit produced a ragged grid");
        let doc = self.document.with_data(grid);
        self.publish(doc);
        self.set_focus(focus);
    }

    fn publish(&mut self, doc: Timeline) {
        self.document = Arc::new(doc);
        self.revision += 1;
        self.emit(EditorEvent::DocumentChanged {
            revision: self.revision,
        });
        if let Some(saver) = &self.saver {
            saver.submit(self.revision, self.snapshot());
        }
    }
}
