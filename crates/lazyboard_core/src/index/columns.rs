//! Column stage insert and cascading delete.

use super::{cell_key, cell_range, ensure_column, Cascade, IndexError, IndexResult};
use crate::model::board::{BoardIndex, ColumnId};

/// Appends an empty column at the right edge of the board.
///
/// Row `g` (1-based) receives its new cell at `g * new_columns - 1`, copying
/// the count of the cell just before it.
///
/// # Errors
/// - `DuplicateColumn` when `column` is already on the board.
pub fn insert_column(board: &BoardIndex, column: ColumnId) -> IndexResult<BoardIndex> {
    if board.columns.contains(&column) {
        return Err(IndexError::DuplicateColumn(column));
    }

    let new_columns = board.columns.len() + 1;
    let mut next = board.clone();
    for group in 1..=board.rows.len() {
        let at = group * new_columns - 1;
        let carried = if at == 0 { 0 } else { next.cell_index[at - 1] };
        next.cell_index.insert(at, carried);
    }
    next.columns.push(column);
    Ok(next)
}

/// Deletes column `column` in every row together with the items inside it.
///
/// Retained cells are re-emitted row-major with their counts reduced by the
/// number of items skipped so far.
///
/// # Errors
/// - `ColumnOutOfRange` when `column` is outside the grid.
pub fn delete_column(board: &BoardIndex, column: usize) -> IndexResult<Cascade> {
    ensure_column(board, column)?;

    let columns = board.columns.len();
    let mut items = Vec::with_capacity(board.items.len());
    let mut cell_index = Vec::with_capacity(board.rows.len() * (columns - 1));
    let mut removed_items = Vec::new();
    let mut deleted_so_far = 0;

    for row in 0..board.rows.len() {
        for current in 0..columns {
            let key = cell_key(row, current, columns);
            let cell = &board.items[cell_range(&board.cell_index, key)];
            if current == column {
                removed_items.extend_from_slice(cell);
                deleted_so_far += cell.len();
            } else {
                items.extend_from_slice(cell);
                cell_index.push(board.cell_index[key] - deleted_so_far);
            }
        }
    }

    let mut columns_after = board.columns.clone();
    columns_after.remove(column);
    let next = BoardIndex {
        rows: board.rows.clone(),
        columns: columns_after,
        items,
        cell_index,
    };
    Ok(Cascade {
        board: next,
        removed_items,
    })
}
