//! Single-item insert and delete.

use super::{cell_key, ensure_column, ensure_row, IndexError, IndexResult};
use crate::model::board::{BoardIndex, ItemId};

/// Appends `item` as the last item of cell `(row, column)`.
///
/// The item lands at the old `cell_index[key]` boundary and every count from
/// `key` onward grows by one.
///
/// # Errors
/// - `RowOutOfRange` / `ColumnOutOfRange` for positions outside the grid.
/// - `DuplicateItem` when `item` is already on the board.
pub fn insert_item(
    board: &BoardIndex,
    row: usize,
    column: usize,
    item: ItemId,
) -> IndexResult<BoardIndex> {
    ensure_row(board, row)?;
    ensure_column(board, column)?;
    if board.items.contains(&item) {
        return Err(IndexError::DuplicateItem(item));
    }

    let key = cell_key(row, column, board.columns.len());
    let mut next = board.clone();
    next.items.insert(board.cell_index[key], item);
    for count in &mut next.cell_index[key..] {
        *count += 1;
    }
    Ok(next)
}

/// Removes `item` from the board.
///
/// # Errors
/// - `ItemNotFound` when `item` is not on the board.
pub fn delete_item(board: &BoardIndex, item: ItemId) -> IndexResult<BoardIndex> {
    let flat = board
        .items
        .iter()
        .position(|current| *current == item)
        .ok_or(IndexError::ItemNotFound(item))?;
    delete_item_at(board, flat)
}

/// Removes the item at flat position `flat`.
///
/// Only counts strictly greater than `flat` shrink: those are the owning cell
/// and every cell after it.
pub fn delete_item_at(board: &BoardIndex, flat: usize) -> IndexResult<BoardIndex> {
    if flat >= board.items.len() {
        return Err(IndexError::FlatOutOfRange {
            flat,
            items: board.items.len(),
        });
    }

    let mut next = board.clone();
    next.items.remove(flat);
    for count in next.cell_index.iter_mut().filter(|count| **count > flat) {
        *count -= 1;
    }
    Ok(next)
}
