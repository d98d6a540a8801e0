//! The rows x columns x blocks structure of a timeline.
//!
//! Rows and columns have no identity of their own; they are addressed by
//! position only. Structural edits live in `timeliner-kernel`, this module
//! only holds the data and read-side queries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Block, BlockId, Color};

/// One vertical slot of a row: an ordered list of blocks.
pub type Column = Vec<Block>;

/// Position of a block (or insertion point) in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub row: usize,
    pub column: usize,
    pub index: usize,
}

impl BlockPosition {
    pub const fn new(row: usize, column: usize, index: usize) -> Self {
        Self { row, column, index }
    }

    /// Whether both positions address the same column list.
    pub fn same_column(&self, other: &BlockPosition) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.row, self.column, self.index)
    }
}

impl FromStr for BlockPosition {
    type Err = String;

    /// Parses `row,column,index`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [row, column, index] = parts.as_slice() else {
            return Err(format!("expected row,column,index but got {s:?}"));
        };
        let parse = |part: &str| {
            part.parse::<usize>()
                .map_err(|e| format!("invalid position component {part:?}: {e}"))
        };
        Ok(Self::new(parse(*row)?, parse(*column)?, parse(*index)?))
    }
}

/// A horizontal slice of the grid: a title plus one block list per column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Row {
    /// An untitled row with `count` empty columns.
    pub fn with_columns(count: usize) -> Self {
        Self {
            title: String::new(),
            columns: vec![Vec::new(); count],
        }
    }
}

/// The full grid of a timeline. Serialized as a bare array of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    pub rows: Vec<Row>,
}

impl Default for Grid {
    /// One untitled row with a single empty column.
    fn default() -> Self {
        Self {
            rows: vec![Row::with_columns(1)],
        }
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// A grid with no rows at all.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count of the grid, taken from the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.columns.len())
    }

    pub fn is_rectangular(&self) -> bool {
        let expected = self.column_count();
        self.rows.iter().all(|row| row.columns.len() == expected)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn column(&self, row: usize, column: usize) -> Option<&Column> {
        self.rows.get(row)?.columns.get(column)
    }

    pub fn block(&self, pos: BlockPosition) -> Option<&Block> {
        self.column(pos.row, pos.column)?.get(pos.index)
    }

    /// Whether `pos` is a valid place to insert a block: an existing column
    /// (or the column just past the end) with `index` at most its length.
    pub fn is_insertion_point(&self, pos: BlockPosition) -> bool {
        let Some(row) = self.rows.get(pos.row) else {
            return false;
        };
        match row.columns.get(pos.column) {
            Some(column) => pos.index <= column.len(),
            None => pos.column == row.columns.len() && pos.index == 0,
        }
    }

    /// Every block with its position, in row, column, index order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockPosition, &Block)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.columns.iter().enumerate().flat_map(move |(c, column)| {
                column
                    .iter()
                    .enumerate()
                    .map(move |(i, block)| (BlockPosition::new(r, c, i), block))
            })
        })
    }

    pub fn locate(&self, id: BlockId) -> Option<BlockPosition> {
        self.blocks()
            .find(|(_, block)| block.id == Some(id))
            .map(|(pos, _)| pos)
    }

    /// Colors currently in use, de-duplicated in first-seen order.
    ///
    /// Computed on demand for the color picker's preset list.
    pub fn preset_colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = Vec::new();
        for (_, block) in self.blocks() {
            if !colors.contains(&block.color) {
                colors.push(block.color.clone());
            }
        }
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        let mut grid = Grid::from_rows(vec![Row::with_columns(2), Row::with_columns(2)]);
        grid.rows[0].columns[0].push(Block::new(BlockId(1), "a", ""));
        grid.rows[0].columns[1].push(Block::new(BlockId(2), "b", ""));
        grid.rows[1].columns[1].push(Block::new(BlockId(3), "c", ""));
        grid
    }

    #[test]
    fn default_grid_is_one_row_one_empty_column() {
        let grid = Grid::new();
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.column_count(), 1);
        assert!(grid.rows[0].columns[0].is_empty());
        assert_eq!(serde_json::to_string(&grid).unwrap(), r#"[{"title":"","columns":[[]]}]"#);
    }

    #[test]
    fn locate_finds_blocks_by_id() {
        let grid = sample();
        assert_eq!(grid.locate(BlockId(3)), Some(BlockPosition::new(1, 1, 0)));
        assert_eq!(grid.locate(BlockId(9)), None);
    }

    #[test]
    fn insertion_points_allow_one_past_the_end() {
        let grid = sample();
        assert!(grid.is_insertion_point(BlockPosition::new(0, 0, 1)));
        assert!(grid.is_insertion_point(BlockPosition::new(1, 2, 0)));
        assert!(!grid.is_insertion_point(BlockPosition::new(1, 2, 1)));
        assert!(!grid.is_insertion_point(BlockPosition::new(0, 0, 2)));
        assert!(!grid.is_insertion_point(BlockPosition::new(2, 0, 0)));
    }

    #[test]
    fn preset_colors_are_deduplicated_in_order() {
        let mut grid = sample();
        grid.rows[1].columns[1][0].color = Color::parse("#000000").unwrap();
        let colors = grid.preset_colors();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0], Color::default());
        assert_eq!(colors[1].as_str(), "#000000");
    }

    #[test]
    fn position_parses_from_comma_list() {
        assert_eq!("1, 2,3".parse::<BlockPosition>(), Ok(BlockPosition::new(1, 2, 3)));
        assert!("1,2".parse::<BlockPosition>().is_err());
        assert!("a,b,c".parse::<BlockPosition>().is_err());
    }
}
