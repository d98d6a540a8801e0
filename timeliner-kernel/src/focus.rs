//! Focus/selection state machine.
//!
//! At most one thing is focused: a block, a row title, or nothing. Commands
//! are gated on this state (see [`crate::commands`]).

use timeliner_api::{Block, BlockPosition, Grid};

/// Focus state - makes illegal states unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Nothing is selected; every block command is disabled.
    #[default]
    None,
    /// A block is selected for editing.
    Block(BlockPosition),
    /// A row title is selected.
    Row(usize),
}

/// Pointer input that drives focus transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    ClickBlock(BlockPosition),
    ClickRowTitle(usize),
    /// Click on the document background, outside any block or row title.
    ClickOutside,
}

impl Focus {
    /// Apply a click. Every transition is valid from every state.
    pub fn transition(self, event: FocusEvent) -> Focus {
        match event {
            FocusEvent::ClickBlock(pos) => Focus::Block(pos),
            FocusEvent::ClickRowTitle(row) => Focus::Row(row),
            FocusEvent::ClickOutside => Focus::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Focus::None)
    }

    pub fn block_position(&self) -> Option<BlockPosition> {
        match self {
            Focus::Block(pos) => Some(*pos),
            _ => None,
        }
    }

    /// The focused block, if the focus still points at one.
    pub fn focused_block<'a>(&self, grid: &'a Grid) -> Option<&'a Block> {
        grid.block(self.block_position()?)
    }

    /// The row a row-level command acts on: the focused row, or the row of
    /// the focused block.
    pub fn active_row(&self, grid: &Grid) -> Option<usize> {
        let row = match self {
            Focus::None => return None,
            Focus::Block(pos) => pos.row,
            Focus::Row(row) => *row,
        };
        (row < grid.row_count()).then_some(row)
    }

    /// Focus after an empty row is spliced in at `index`.
    pub fn row_inserted(self, index: usize) -> Focus {
        match self {
            Focus::Row(row) if row >= index => Focus::Row(row + 1),
            Focus::Block(pos) if pos.row >= index => Focus::Block(BlockPosition {
                row: pos.row + 1,
                ..pos
            }),
            other => other,
        }
    }

    /// Carry focus across a structural edit from `old` to `new`.
    ///
    /// A focused block is followed to its new position (by id; id-less
    /// blocks must still sit unchanged at the same position). A focused row
    /// survives only when no row at or before it was added or removed.
    /// Focus that no longer refers to anything becomes [`Focus::None`].
    pub fn rebase(self, old: &Grid, new: &Grid) -> Focus {
        match self {
            Focus::None => Focus::None,
            Focus::Row(row)
                if row < new.row_count()
                    && (old.row_count() == new.row_count()
                        || old.rows.get(..=row) == new.rows.get(..=row)) =>
            {
                Focus::Row(row)
            }
            Focus::Row(_) => Focus::None,
            Focus::Block(pos) => {
                let Some(block) = old.block(pos) else {
                    return Focus::None;
                };
                match block.id {
                    Some(id) => new.locate(id).map_or(Focus::None, Focus::Block),
                    None if new.block(pos) == Some(block) => Focus::Block(pos),
                    None => Focus::None,
                }
            }
        }
    }
}
