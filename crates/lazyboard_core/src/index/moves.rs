//! Drag-and-drop item moves.

use super::{cell_key, cell_len, cell_start, ensure_column, ensure_row, IndexError, IndexResult};
use crate::model::board::{BoardIndex, ItemId};

/// Moves `item` to rank `dest_rank` of cell `(row, column)`.
///
/// `dest_rank` is the rank within the destination cell as it looks once the
/// item has been lifted out of its source cell.
///
/// # Errors
/// - `ItemNotFound` when `item` is not on the board.
/// - Same errors as [`move_item_at`].
pub fn move_item(
    board: &BoardIndex,
    item: ItemId,
    row: usize,
    column: usize,
    dest_rank: usize,
) -> IndexResult<BoardIndex> {
    ensure_row(board, row)?;
    ensure_column(board, column)?;
    let source = board.locate(item).ok_or(IndexError::ItemNotFound(item))?;
    let dst_cell = cell_key(row, column, board.columns.len());
    move_item_at(board, source.flat, source.cell, dst_cell, dest_rank)
}

/// Positional move: flat `src_idx` inside `src_cell` to `dest_rank` of
/// `dst_cell`.
///
/// Moving an item onto its own cell and rank returns an identical board.
///
/// # Errors
/// - `FlatOutOfRange` when `src_idx` is past the sequence end.
/// - `SourceMismatch` when `src_cell` does not own `src_idx`.
/// - `CellOutOfRange` when `dst_cell` is past the last cell.
/// - `RankOutOfRange` when `dest_rank` exceeds the destination cell size
///   after removal.
pub fn move_item_at(
    board: &BoardIndex,
    src_idx: usize,
    src_cell: usize,
    dst_cell: usize,
    dest_rank: usize,
) -> IndexResult<BoardIndex> {
    let cells = board.cell_index.len();
    if src_idx >= board.items.len() {
        return Err(IndexError::FlatOutOfRange {
            flat: src_idx,
            items: board.items.len(),
        });
    }
    if src_cell >= cells || !super::cell_range(&board.cell_index, src_cell).contains(&src_idx) {
        return Err(IndexError::SourceMismatch {
            flat: src_idx,
            cell: src_cell,
        });
    }
    if dst_cell >= cells {
        return Err(IndexError::CellOutOfRange {
            cell: dst_cell,
            cells,
        });
    }

    let dst_len = cell_len(&board.cell_index, dst_cell) - usize::from(dst_cell == src_cell);
    if dest_rank > dst_len {
        return Err(IndexError::RankOutOfRange {
            rank: dest_rank,
            len: dst_len,
        });
    }

    let src_rank = src_idx - cell_start(&board.cell_index, src_cell);
    if src_cell == dst_cell && src_rank == dest_rank {
        return Ok(board.clone());
    }

    // The destination start is read before removal; a later cell still counts
    // the moving item in its prefix.
    let mut target = dest_rank + cell_start(&board.cell_index, dst_cell);
    if dst_cell > src_cell {
        target -= 1;
    }

    let mut next = board.clone();
    let item = next.items.remove(src_idx);
    next.items.insert(target, item);

    if dst_cell < src_cell {
        for count in &mut next.cell_index[dst_cell..src_cell] {
            *count += 1;
        }
    } else if dst_cell > src_cell {
        for count in &mut next.cell_index[src_cell..dst_cell] {
            *count -= 1;
        }
    }
    Ok(next)
}
