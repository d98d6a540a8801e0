//! Focus-driven editing commands and their enablement guards.
//!
//! Each command acts on the current focus. [`Command::is_enabled`] is the
//! guard predicate evaluated against the grid and focus; [`Command::apply`]
//! returns the edited grid together with the focus that follows the edit,
//! or `None` when the command is disabled.

use timeliner_api::{BlockField, BlockPosition, Color, Grid, MAX_INDENT};

use crate::focus::Focus;
use crate::grid;
use crate::ids::IdGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveBlockUp,
    MoveBlockDown,
    AddBlockAbove,
    AddBlockBelow,
    RemoveBlock,
    IndentBlock,
    OutdentBlock,
    ShowTitle,
    HideTitle,
    ShowBody,
    HideBody,
    SetColor(Color),
    MoveColumnLeft,
    MoveColumnRight,
    MoveRowUp,
    MoveRowDown,
    AddColumnLeft,
    AddColumnRight,
    AddRowAbove,
    AddRowBelow,
    RemoveColumn,
    RemoveRow,
}

/// Result of an applied command.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub grid: Grid,
    pub focus: Focus,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveBlockUp => "move-block-up",
            Self::MoveBlockDown => "move-block-down",
            Self::AddBlockAbove => "add-block-above",
            Self::AddBlockBelow => "add-block-below",
            Self::RemoveBlock => "remove-block",
            Self::IndentBlock => "indent-block",
            Self::OutdentBlock => "outdent-block",
            Self::ShowTitle => "show-title",
            Self::HideTitle => "hide-title",
            Self::ShowBody => "show-body",
            Self::HideBody => "hide-body",
            Self::SetColor(_) => "set-color",
            Self::MoveColumnLeft => "move-column-left",
            Self::MoveColumnRight => "move-column-right",
            Self::MoveRowUp => "move-row-up",
            Self::MoveRowDown => "move-row-down",
            Self::AddColumnLeft => "add-column-left",
            Self::AddColumnRight => "add-column-right",
            Self::AddRowAbove => "add-row-above",
            Self::AddRowBelow => "add-row-below",
            Self::RemoveColumn => "remove-column",
            Self::RemoveRow => "remove-row",
        }
    }

    /// Whether the command can run against `grid` with `focus`.
    pub fn is_enabled(&self, grid: &Grid, focus: Focus) -> bool {
        // Row commands also work from a focused row title.
        match self {
            Self::MoveRowUp => return focus.active_row(grid).is_some_and(|row| row > 0),
            Self::MoveRowDown => {
                return focus
                    .active_row(grid)
                    .is_some_and(|row| row + 1 < grid.row_count());
            }
            Self::AddRowAbove | Self::AddRowBelow | Self::RemoveRow => {
                return focus.active_row(grid).is_some();
            }
            _ => {}
        }

        let Some(pos) = focus.block_position() else {
            return false;
        };
        let Some(block) = grid.block(pos) else {
            return false;
        };
        let column_len = grid.column(pos.row, pos.column).map_or(0, Vec::len);

        match self {
            Self::MoveBlockUp => pos.index > 0 || pos.row > 0,
            Self::MoveBlockDown => pos.index + 1 < column_len || pos.row + 1 < grid.row_count(),
            Self::IndentBlock => block.indent < MAX_INDENT,
            Self::OutdentBlock => block.indent > 0,
            Self::ShowTitle => !block.show_title,
            Self::HideTitle => block.show_title && block.show_body,
            Self::ShowBody => !block.show_body,
            Self::HideBody => block.show_body && block.show_title,
            Self::MoveColumnLeft => pos.column > 0,
            Self::MoveColumnRight => pos.column + 1 < grid.column_count(),
            Self::RemoveColumn => grid.column_count() > 1,
            Self::AddBlockAbove
            | Self::AddBlockBelow
            | Self::RemoveBlock
            | Self::SetColor(_)
            | Self::AddColumnLeft
            | Self::AddColumnRight => true,
            Self::MoveRowUp | Self::MoveRowDown | Self::AddRowAbove | Self::AddRowBelow | Self::RemoveRow => false,
        }
    }

    /// Run the command. Disabled commands are a no-op and return `None`.
    pub fn apply(&self, grid: &Grid, focus: Focus, ids: &IdGenerator) -> Option<Edit> {
        if !self.is_enabled(grid, focus) {
            tracing::debug!(command = self.name(), ?focus, "command disabled");
            return None;
        }

        if let Some(edit) = self.apply_row_command(grid, focus) {
            return Some(edit);
        }

        let pos = focus.block_position()?;
        let block = grid.block(pos)?;
        let keep = |grid: Grid| Edit { grid, focus };
        let field = |field: BlockField| keep(grid::set_block_field(grid, pos, field));

        let edit = match self {
            Self::MoveBlockUp => {
                let to = if pos.index > 0 {
                    BlockPosition { index: pos.index - 1, ..pos }
                } else {
                    let row = pos.row - 1;
                    let len = grid.column(row, pos.column).map_or(0, Vec::len);
                    BlockPosition::new(row, pos.column, len)
                };
                moved(grid::move_block(grid, block, pos, to), to)
            }
            Self::MoveBlockDown => {
                let column_len = grid.column(pos.row, pos.column).map_or(0, Vec::len);
                let to = if pos.index + 1 < column_len {
                    BlockPosition { index: pos.index + 1, ..pos }
                } else {
                    BlockPosition::new(pos.row + 1, pos.column, 0)
                };
                moved(grid::move_block(grid, block, pos, to), to)
            }
            Self::AddBlockAbove => {
                let next = grid::insert_block(grid, pos, block.sibling(ids.next()));
                moved(next, BlockPosition { index: pos.index + 1, ..pos })
            }
            Self::AddBlockBelow => {
                let below = BlockPosition { index: pos.index + 1, ..pos };
                keep(grid::insert_block(grid, below, block.sibling(ids.next())))
            }
            Self::RemoveBlock => Edit {
                grid: grid::remove_block(grid, pos).0,
                focus: Focus::None,
            },
            Self::IndentBlock => field(BlockField::Indent(i64::from(block.indent) + 1)),
            Self::OutdentBlock => field(BlockField::Indent(i64::from(block.indent) - 1)),
            Self::ShowTitle => field(BlockField::ShowTitle(true)),
            Self::HideTitle => field(BlockField::ShowTitle(false)),
            Self::ShowBody => field(BlockField::ShowBody(true)),
            Self::HideBody => field(BlockField::ShowBody(false)),
            Self::SetColor(color) => field(BlockField::Color(color.clone())),
            Self::MoveColumnLeft => {
                let column = pos.column - 1;
                moved(grid::move_column(grid, pos.column, column), BlockPosition { column, ..pos })
            }
            Self::MoveColumnRight => {
                let column = pos.column + 1;
                moved(grid::move_column(grid, pos.column, column), BlockPosition { column, ..pos })
            }
            Self::AddColumnLeft => {
                let next = grid::insert_column(grid, pos.column);
                moved(next, BlockPosition { column: pos.column + 1, ..pos })
            }
            Self::AddColumnRight => keep(grid::insert_column(grid, pos.column + 1)),
            Self::RemoveColumn => Edit {
                grid: grid::delete_column(grid, pos.column),
                focus: Focus::None,
            },
            Self::MoveRowUp | Self::MoveRowDown | Self::AddRowAbove | Self::AddRowBelow | Self::RemoveRow => {
                return None;
            }
        };

        Some(edit)
    }

    fn apply_row_command(&self, grid: &Grid, focus: Focus) -> Option<Edit> {
        let row = focus.active_row(grid)?;
        let follow = |to: usize| match focus {
            Focus::Block(pos) => Focus::Block(BlockPosition { row: to, ..pos }),
            _ => Focus::Row(to),
        };

        let edit = match self {
            Self::MoveRowUp => Edit {
                grid: grid::move_row(grid, row, row - 1),
                focus: follow(row - 1),
            },
            Self::MoveRowDown => Edit {
                grid: grid::move_row(grid, row, row + 1),
                focus: follow(row + 1),
            },
            Self::AddRowAbove => Edit {
                grid: grid::insert_row(grid, row),
                focus: Focus::Row(row),
            },
            Self::AddRowBelow => Edit {
                grid: grid::insert_row(grid, row + 1),
                focus: Focus::Row(row + 1),
            },
            Self::RemoveRow => Edit {
                grid: grid::delete_row(grid, row),
                focus: Focus::None,
            },
            _ => return None,
        };
        Some(edit)
    }
}

fn moved(grid: Grid, to: BlockPosition) -> Edit {
    Edit {
        grid,
        focus: Focus::Block(to),
    }
}
