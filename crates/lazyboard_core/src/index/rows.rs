//! Row group insert and cascading delete.

use super::{cell_start, ensure_row, Cascade, IndexError, IndexResult};
use crate::model::board::{BoardIndex, RowId};

/// Appends an empty row at the bottom of the board.
///
/// Each new cell repeats the current total item count, so no existing
/// boundary moves and the flat sequence is untouched.
///
/// # Errors
/// - `DuplicateRow` when `row` is already on the board.
pub fn insert_row(board: &BoardIndex, row: RowId) -> IndexResult<BoardIndex> {
    if board.rows.contains(&row) {
        return Err(IndexError::DuplicateRow(row));
    }

    let mut next = board.clone();
    let cells = board.cell_index.len() + board.columns.len();
    next.cell_index.resize(cells, board.items.len());
    next.rows.push(row);
    Ok(next)
}

/// Deletes row `row` together with every item inside it.
///
/// # Errors
/// - `RowOutOfRange` when `row` is outside the grid.
pub fn delete_row(board: &BoardIndex, row: usize) -> IndexResult<Cascade> {
    ensure_row(board, row)?;

    let columns = board.columns.len();
    let mut next = board.clone();
    next.rows.remove(row);
    if columns == 0 {
        return Ok(Cascade {
            board: next,
            removed_items: Vec::new(),
        });
    }

    let start = row * columns;
    let end = start + columns - 1;
    let first_flat = cell_start(&board.cell_index, start);
    let removed = board.cell_index[end] - first_flat;

    let removed_items = next
        .items
        .drain(first_flat..board.cell_index[end])
        .collect::<Vec<_>>();
    next.cell_index.drain(start..=end);
    // Entries after the drained block now start at `start`.
    for count in &mut next.cell_index[start..] {
        *count -= removed;
    }

    Ok(Cascade {
        board: next,
        removed_items,
    })
}
