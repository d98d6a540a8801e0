//! Drag-reorder engine.
//!
//! A [`DragSession`] lives for one pointer drag. Each hover event over a
//! drop target is turned into at most one [`grid::move_block`] call. Moves
//! are applied live, so dropping only ends the session and cancelling does
//! not roll anything back.
//!
//! A move is only committed once the pointer has crossed the vertical
//! midpoint of the hovered block in the direction of travel. Without that,
//! a block whose size changes while it is dragged would swap back and forth
//! on every frame.

use std::borrow::Cow;

use timeliner_api::{Block, BlockPosition, Grid};

use crate::grid;
use crate::ids::IdGenerator;

/// Vertical extent of a rendered drop target, in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

/// A hover event over the drop target rendered for `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverTarget {
    pub position: BlockPosition,
    pub rect: Rect,
    pub pointer_y: f32,
}

impl HoverTarget {
    fn offset(&self) -> f32 {
        self.pointer_y - self.rect.top
    }

    fn midpoint(&self) -> f32 {
        self.rect.height / 2.0
    }

    fn above_midpoint(&self) -> bool {
        self.offset() < self.midpoint()
    }

    fn below_midpoint(&self) -> bool {
        self.offset() > self.midpoint()
    }
}

/// State of one in-progress drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    block: Block,
    /// Where the dragged block sits in the live grid.
    origin: BlockPosition,
    hover: Option<BlockPosition>,
}

impl DragSession {
    pub fn begin(block: Block, origin: BlockPosition) -> Self {
        Self {
            block,
            origin,
            hover: None,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn origin(&self) -> BlockPosition {
        self.origin
    }

    /// The last position a hover event was committed to.
    pub fn hover_position(&self) -> Option<BlockPosition> {
        self.hover
    }

    /// Process one hover event. Returns the new grid when the dragged block
    /// moved, `None` when the event is absorbed.
    pub fn hover(&mut self, grid: &Grid, target: &HoverTarget, ids: &IdGenerator) -> Option<Grid> {
        let origin = self.origin;
        let mut to = target.position;

        if !grid.is_insertion_point(to) {
            tracing::trace!(%to, "drag: hover over a position that no longer exists");
            return None;
        }

        // the dragged block counts against its own column's length
        let in_grid = grid.block(origin).is_some_and(|b| b.is_same(&self.block));

        if origin.same_column(&to) {
            if in_grid {
                let last = grid.column(to.row, to.column).map_or(0, |c| c.len().saturating_sub(1));
                to.index = to.index.min(last);
            }
            if origin.index == to.index {
                return None;
            }
            // dragging down: wait until the pointer is past the middle
            if origin.index < to.index && target.above_midpoint() {
                return None;
            }
            // dragging up: wait until the pointer is above the middle
            if origin.index > to.index && target.below_midpoint() {
                return None;
            }
        }

        if to.row > origin.row && self.block.id.is_none() && target.below_midpoint() {
            let len = grid.column(to.row, to.column).map_or(0, Vec::len);
            to.index = (to.index + 1).min(len);
        }

        let mut base = Cow::Borrowed(grid);
        if self.block.id.is_none() {
            let id = ids.next();
            // an id-less block already in the grid takes the id in place
            if in_grid {
                base.to_mut().rows[origin.row].columns[origin.column][origin.index].id = Some(id);
            }
            self.block.id = Some(id);
            tracing::debug!(%id, "drag: assigned id to new block");
        }

        let next = grid::move_block(&base, &self.block, origin, to);
        tracing::debug!(from = %origin, %to, "drag: moved block");
        self.origin = to;
        self.hover = Some(to);
        Some(next)
    }

    /// End the gesture. The grid already reflects the final position.
    pub fn finish(self) -> BlockPosition {
        self.origin
    }
}
