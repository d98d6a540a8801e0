//! Structural edits on a [`Grid`].
//!
//! Every operation takes the current snapshot by reference and returns a new
//! grid; the input is never touched. Positions are expected to come from the
//! current snapshot, so an out-of-bounds position is a caller bug and panics.
//!
//! Rectangularity (every row has the same column count) is preserved by all
//! operations: growing a block into the column just past the end appends an
//! empty column to *every* row first.

use timeliner_api::{Block, BlockField, BlockPosition, Grid, Row};

/// Splice an empty column at `index` into every row.
pub fn insert_column(grid: &Grid, index: usize) -> Grid {
    let count = grid.column_count();
    assert!(index <= count, "insert_column: index {index} out of bounds ({count} columns)");

    let mut next = grid.clone();
    for row in &mut next.rows {
        row.columns.insert(index, Vec::new());
    }
    next
}

/// Remove column `index` from every row. The last remaining column is never
/// removed; that call returns the grid unchanged.
pub fn delete_column(grid: &Grid, index: usize) -> Grid {
    let count = grid.column_count();
    assert!(index < count, "delete_column: index {index} out of bounds ({count} columns)");

    if count <= 1 {
        tracing::debug!("delete_column: refusing to remove the last column");
        return grid.clone();
    }

    let mut next = grid.clone();
    for row in &mut next.rows {
        row.columns.remove(index);
    }
    next
}

/// Splice a new untitled row at `index` with one empty column per existing
/// column slot (zero columns when the grid has no rows).
pub fn insert_row(grid: &Grid, index: usize) -> Grid {
    let count = grid.row_count();
    assert!(index <= count, "insert_row: index {index} out of bounds ({count} rows)");

    let mut next = grid.clone();
    next.rows.insert(index, Row::with_columns(grid.column_count()));
    next
}

/// Remove row `index`. Removing the only row leaves a single empty row with
/// the same column count instead of an empty grid.
pub fn delete_row(grid: &Grid, index: usize) -> Grid {
    let count = grid.row_count();
    assert!(index < count, "delete_row: index {index} out of bounds ({count} rows)");

    let mut next = grid.clone();
    next.rows.remove(index);
    if next.rows.is_empty() {
        next.rows.push(Row::with_columns(grid.column_count().max(1)));
    }
    next
}

pub fn move_row(grid: &Grid, from: usize, to: usize) -> Grid {
    let count = grid.row_count();
    assert!(from < count && to < count, "move_row: {from} -> {to} out of bounds ({count} rows)");

    let mut next = grid.clone();
    let row = next.rows.remove(from);
    next.rows.insert(to, row);
    next
}

pub fn move_column(grid: &Grid, from: usize, to: usize) -> Grid {
    let count = grid.column_count();
    assert!(
        from < count && to < count,
        "move_column: {from} -> {to} out of bounds ({count} columns)"
    );

    let mut next = grid.clone();
    for row in &mut next.rows {
        let column = row.columns.remove(from);
        row.columns.insert(to, column);
    }
    next
}

/// Insert `block` at `pos`, growing the grid by one column first when
/// `pos.column` is the column just past the end.
pub fn insert_block(grid: &Grid, pos: BlockPosition, block: Block) -> Grid {
    let mut next = grid.clone();
    ensure_column(&mut next, pos);
    splice_in(&mut next, pos, block);
    next
}

/// Remove and return the block at `pos`.
pub fn remove_block(grid: &Grid, pos: BlockPosition) -> (Grid, Block) {
    assert!(grid.block(pos).is_some(), "remove_block: no block at {pos}");

    let mut next = grid.clone();
    let block = next.rows[pos.row].columns[pos.column].remove(pos.index);
    (next, block)
}

/// Move `block` from `from` to `to`.
///
/// The removal only happens when `from` still holds `block`. A stale `from`
/// (the block was already moved by an earlier hover event) skips straight to
/// the insertion, and if `to` already holds the block nothing changes, so
/// replaying the same move is idempotent.
///
/// `to.index` is applied to the list as it is after the removal (plain
/// splice semantics).
pub fn move_block(grid: &Grid, block: &Block, from: BlockPosition, to: BlockPosition) -> Grid {
    let holds_block = grid.block(from).is_some_and(|b| b.is_same(block));
    if !holds_block && grid.block(to).is_some_and(|b| b.is_same(block)) {
        tracing::trace!(%from, %to, "move_block: block already in place");
        return grid.clone();
    }

    let mut next = grid.clone();
    ensure_column(&mut next, to);

    let moved = if holds_block {
        next.rows[from.row].columns[from.column].remove(from.index)
    } else {
        tracing::trace!(%from, %to, "move_block: stale origin, inserting only");
        block.clone()
    };

    splice_in(&mut next, to, moved);
    next
}

/// Replace one field of the block at `pos`.
pub fn set_block_field(grid: &Grid, pos: BlockPosition, field: BlockField) -> Grid {
    assert!(grid.block(pos).is_some(), "set_block_field: no block at {pos}");

    let mut next = grid.clone();
    next.rows[pos.row].columns[pos.column][pos.index].apply(field);
    next
}

pub fn set_row_title(grid: &Grid, row: usize, title: impl Into<String>) -> Grid {
    let count = grid.row_count();
    assert!(row < count, "set_row_title: row {row} out of bounds ({count} rows)");

    let mut next = grid.clone();
    next.rows[row].title = title.into();
    next
}

/// Drop trailing columns that are empty in every row, stopping at the last
/// non-empty column or when a single column remains.
pub fn prune_trailing_columns(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    while next.column_count() > 1 && trailing_column_is_empty(&next) {
        for row in &mut next.rows {
            row.columns.pop();
        }
    }
    next
}

fn trailing_column_is_empty(grid: &Grid) -> bool {
    grid.rows
        .iter()
        .all(|row| row.columns.last().is_none_or(|column| column.is_empty()))
}

fn ensure_column(grid: &mut Grid, pos: BlockPosition) {
    let row_count = grid.row_count();
    assert!(pos.row < row_count, "row {} out of bounds ({row_count} rows)", pos.row);

    let count = grid.rows[pos.row].columns.len();
    assert!(pos.column <= count, "column {} out of bounds ({count} columns)", pos.column);

    if pos.column == count {
        for row in &mut grid.rows {
            row.columns.push(Vec::new());
        }
    }
}

fn splice_in(grid: &mut Grid, pos: BlockPosition, block: Block) {
    let list = &mut grid.rows[pos.row].columns[pos.column];
    assert!(
        pos.index <= list.len(),
        "index {} out of bounds for column of {} blocks",
        pos.index,
        list.len()
    );
    list.insert(pos.index, block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use timeliner_api::BlockId;

    fn block(id: u64) -> Block {
        Block::new(BlockId(id), format!("b{id}"), "")
    }

    fn ids(grid: &Grid, row: usize, column: usize) -> Vec<u64> {
        grid.rows[row].columns[column]
            .iter()
            .map(|b| b.id.map_or(0, |id| id.0))
            .collect()
    }

    /// One row, one column holding blocks 1..=n.
    fn column_of(n: u64) -> Grid {
        let mut grid = Grid::new();
        grid.rows[0].columns[0] = (1..=n).map(block).collect();
        grid
    }

    #[test]
    fn insert_column_reaches_every_row() {
        let grid = insert_row(&Grid::new(), 1);
        let next = insert_column(&grid, 0);
        assert_eq!(next.column_count(), 2);
        assert!(next.is_rectangular());
        // input snapshot is untouched
        assert_eq!(grid.column_count(), 1);
    }

    #[test]
    fn delete_column_keeps_the_last_one() {
        let grid = Grid::new();
        assert_eq!(delete_column(&grid, 0), grid);

        let wide = insert_column(&grid, 1);
        assert_eq!(delete_column(&wide, 1).column_count(), 1);
    }

    #[test]
    fn insert_row_copies_column_count() {
        let grid = insert_column(&Grid::new(), 0);
        let next = insert_row(&grid, 0);
        assert_eq!(next.rows[0].columns.len(), 2);
        assert!(next.rows[0].title.is_empty());

        let from_empty = insert_row(&Grid::empty(), 0);
        assert_eq!(from_empty.row_count(), 1);
        assert_eq!(from_empty.column_count(), 0);
    }

    #[test]
    fn delete_last_row_collapses_to_one_empty_row() {
        let mut grid = insert_column(&column_of(2), 1);
        grid.rows[0].title = "gone".into();
        let next = delete_row(&grid, 0);
        assert_eq!(next.row_count(), 1);
        assert_eq!(next.rows[0], Row::with_columns(2));
    }

    #[test]
    fn move_row_and_column_are_positional_splices() {
        let mut grid = insert_row(&insert_row(&Grid::new(), 1), 2);
        for (i, row) in grid.rows.iter_mut().enumerate() {
            row.title = i.to_string();
        }
        let moved = move_row(&grid, 0, 2);
        let titles: Vec<&str> = moved.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["1", "2", "0"]);

        let mut wide = insert_column(&insert_column(&Grid::new(), 1), 2);
        wide.rows[0].columns[0].push(block(1));
        let moved = move_column(&wide, 0, 2);
        assert_eq!(ids(&moved, 0, 2), [1]);
        assert!(moved.rows[0].columns[0].is_empty());
    }

    #[test]
    fn insert_block_grows_every_row_when_past_the_end() {
        let grid = insert_row(&Grid::new(), 1);
        let next = insert_block(&grid, BlockPosition::new(0, 1, 0), block(1));
        assert_eq!(next.column_count(), 2);
        assert!(next.is_rectangular());
        assert_eq!(ids(&next, 0, 1), [1]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn insert_block_two_past_the_end_panics() {
        insert_block(&Grid::new(), BlockPosition::new(0, 2, 0), block(1));
    }

    #[test]
    fn remove_block_returns_the_block() {
        let (next, removed) = remove_block(&column_of(3), BlockPosition::new(0, 0, 1));
        assert_eq!(removed.id, Some(BlockId(2)));
        assert_eq!(ids(&next, 0, 0), [1, 3]);
    }

    #[test]
    fn move_down_within_column_uses_post_removal_index() {
        let grid = column_of(3);
        let b1 = grid.rows[0].columns[0][0].clone();
        let next = move_block(&grid, &b1, BlockPosition::new(0, 0, 0), BlockPosition::new(0, 0, 2));
        assert_eq!(ids(&next, 0, 0), [2, 3, 1]);
    }

    #[test]
    fn move_across_columns_grows_grid() {
        let grid = column_of(2);
        let b2 = grid.rows[0].columns[0][1].clone();
        let next = move_block(&grid, &b2, BlockPosition::new(0, 0, 1), BlockPosition::new(0, 1, 0));
        assert_eq!(ids(&next, 0, 0), [1]);
        assert_eq!(ids(&next, 0, 1), [2]);
    }

    #[test]
    fn move_block_preserves_identity() {
        let grid = insert_row(&column_of(4), 1);
        let b3 = grid.rows[0].columns[0][2].clone();
        let to = BlockPosition::new(1, 0, 0);
        let next = move_block(&grid, &b3, BlockPosition::new(0, 0, 2), to);

        let found: Vec<BlockPosition> = next
            .blocks()
            .filter(|(_, b)| b.id == Some(BlockId(3)))
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(found, [to]);
    }

    #[test]
    fn repeated_move_is_idempotent() {
        let grid = column_of(5);
        let b3 = grid.rows[0].columns[0][2].clone();
        let from = BlockPosition::new(0, 0, 2);
        let to = BlockPosition::new(0, 0, 0);

        let once = move_block(&grid, &b3, from, to);
        let twice = move_block(&once, &b3, from, to);
        assert_eq!(once, twice);
        assert_eq!(ids(&twice, 0, 0), [3, 1, 2, 4, 5]);
    }

    #[test]
    fn stale_origin_inserts_new_block_only() {
        let grid = column_of(2);
        let mut fresh = Block::preview();
        fresh.id = Some(BlockId(99));
        let next = move_block(&grid, &fresh, BlockPosition::new(0, 0, 0), BlockPosition::new(0, 0, 1));
        assert_eq!(ids(&next, 0, 0), [1, 99, 2]);
    }

    #[test]
    fn set_block_field_clamps_indent() {
        let pos = BlockPosition::new(0, 0, 0);
        let next = set_block_field(&column_of(1), pos, BlockField::Indent(11));
        assert_eq!(next.block(pos).map(|b| b.indent), Some(10));
    }

    #[test]
    fn set_row_title_replaces_text() {
        let next = set_row_title(&Grid::new(), 0, "Q1");
        assert_eq!(next.rows[0].title, "Q1");
    }

    #[test]
    fn prune_stops_at_last_non_empty_column() {
        let mut grid = insert_column(&insert_column(&insert_column(&Grid::new(), 1), 2), 3);
        grid = insert_row(&grid, 1);
        grid.rows[1].columns[1].push(block(1));
        let pruned = prune_trailing_columns(&grid);
        assert_eq!(pruned.column_count(), 2);
        assert!(pruned.is_rectangular());

        let empty = insert_column(&Grid::new(), 1);
        assert_eq!(prune_trailing_columns(&empty).column_count(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        InsertColumn(usize),
        DeleteColumn(usize),
        InsertRow(usize),
        DeleteRow(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..8).prop_map(Op::InsertColumn),
            (0usize..8).prop_map(Op::DeleteColumn),
            (0usize..8).prop_map(Op::InsertRow),
            (0usize..8).prop_map(Op::DeleteRow),
        ]
    }

    proptest! {
        #[test]
        fn structural_edits_keep_grid_rectangular(ops in proptest::collection::vec(op(), 0..40)) {
            let mut grid = Grid::new();
            for op in ops {
                // indices are reduced into range: bounds violations are caller bugs
                grid = match op {
                    Op::InsertColumn(i) => insert_column(&grid, i % (grid.column_count() + 1)),
                    Op::DeleteColumn(i) => delete_column(&grid, i % grid.column_count()),
                    Op::InsertRow(i) => insert_row(&grid, i % (grid.row_count() + 1)),
                    Op::DeleteRow(i) => delete_row(&grid, i % grid.row_count()),
                };
                prop_assert!(grid.is_rectangular());
                prop_assert!(grid.row_count() >= 1);
                prop_assert!(grid.column_count() >= 1);
            }
        }

        #[test]
        fn block_moves_never_duplicate_or_lose_blocks(
            moves in proptest::collection::vec((0usize..6, 0usize..3, 0usize..6), 0..20)
        ) {
            let mut grid = insert_row(&column_of(5), 1);
            for (pick, column, index) in moves {
                let all: Vec<(BlockPosition, Block)> =
                    grid.blocks().map(|(pos, b)| (pos, b.clone())).collect();
                let (from, moving) = all[pick % all.len()].clone();
                let row = pick % 2;
                let column = column % (grid.column_count() + 1);
                let len = grid.column(row, column).map_or(0, |c| c.len());
                let len = if from.row == row && from.column == column { len - 1 } else { len };
                let to = BlockPosition::new(row, column, index % (len + 1));

                grid = move_block(&grid, &moving, from, to);
                prop_assert!(grid.is_rectangular());
                prop_assert_eq!(grid.blocks().count(), 5);
                prop_assert_eq!(grid.locate(moving.id.unwrap()), Some(to));
            }
        }
    }
}
