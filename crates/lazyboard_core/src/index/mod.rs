//! Pure positional-index operations over [`BoardIndex`].
//!
//! # Responsibility
//! - Implement every structural board edit as `old layout -> new layout`.
//! - Keep cell boundaries (`cell_index`) consistent with the flat sequence.
//!
//! # Invariants
//! - Operations never mutate their input and never perform I/O.
//! - A returned error means nothing was applied.
//! - Every successful result satisfies `BoardIndex::validate()`.

use crate::model::board::{BoardIndex, ColumnId, ItemId, RowId};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod addressing;
mod columns;
mod command;
mod items;
mod lookup;
mod moves;
mod rows;

pub use addressing::{
    cell_key, cell_len, cell_of_flat, cell_range, cell_start, row_col_of_key,
};
pub use columns::{delete_column, insert_column};
pub use command::{apply, apply_with, Applied, BoardCommand};
pub use items::{delete_item, delete_item_at, insert_item};
pub use lookup::PositionLookup;
pub use moves::{move_item, move_item_at};
pub use rows::{delete_row, insert_row};

/// Result type used by index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Rejected index operation.
///
/// Callers resolve identifiers before invoking an operation; these variants
/// surface references that do not resolve instead of corrupting the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    RowOutOfRange { row: usize, rows: usize },
    ColumnOutOfRange { column: usize, columns: usize },
    /// Cell key is past the end of the cell index.
    CellOutOfRange { cell: usize, cells: usize },
    /// Flat position is past the end of the item sequence.
    FlatOutOfRange { flat: usize, items: usize },
    /// Requested rank exceeds the destination cell after removal.
    RankOutOfRange { rank: usize, len: usize },
    /// The supplied source cell does not own the supplied flat position.
    SourceMismatch { flat: usize, cell: usize },
    ItemNotFound(ItemId),
    UnknownRow(RowId),
    UnknownColumn(ColumnId),
    DuplicateItem(ItemId),
    DuplicateRow(RowId),
    DuplicateColumn(ColumnId),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { row, rows } => {
                write!(f, "row {row} is out of range for {rows} row(s)")
            }
            Self::ColumnOutOfRange { column, columns } => {
                write!(f, "column {column} is out of range for {columns} column(s)")
            }
            Self::CellOutOfRange { cell, cells } => {
                write!(f, "cell {cell} is out of range for {cells} cell(s)")
            }
            Self::FlatOutOfRange { flat, items } => {
                write!(f, "flat position {flat} is out of range for {items} item(s)")
            }
            Self::RankOutOfRange { rank, len } => write!(
                f,
                "destination rank {rank} is out of range for cell holding {len} item(s)"
            ),
            Self::SourceMismatch { flat, cell } => {
                write!(f, "flat position {flat} does not belong to cell {cell}")
            }
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::UnknownRow(id) => write!(f, "row not found: {id}"),
            Self::UnknownColumn(id) => write!(f, "column not found: {id}"),
            Self::DuplicateItem(id) => write!(f, "item already on board: {id}"),
            Self::DuplicateRow(id) => write!(f, "row already on board: {id}"),
            Self::DuplicateColumn(id) => write!(f, "column already on board: {id}"),
        }
    }
}

impl Error for IndexError {}

/// Output of a delete that also removes the items inside the deleted cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cascade {
    /// Layout after the delete.
    pub board: BoardIndex,
    /// Items removed with the row or column, in former display order.
    pub removed_items: Vec<ItemId>,
}

fn ensure_row(board: &BoardIndex, row: usize) -> IndexResult<()> {
    if row >= board.rows.len() {
        return Err(IndexError::RowOutOfRange {
            row,
            rows: board.rows.len(),
        });
    }
    Ok(())
}

fn ensure_column(board: &BoardIndex, column: usize) -> IndexResult<()> {
    if column >= board.columns.len() {
        return Err(IndexError::ColumnOutOfRange {
            column,
            columns: board.columns.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::board::{BoardIndex, ItemId};
    use uuid::Uuid;

    /// Builds an empty grid with fresh identifiers.
    pub fn grid(rows: usize, columns: usize) -> BoardIndex {
        let rows = (0..rows).map(|_| Uuid::new_v4()).collect();
        let columns = (0..columns).map(|_| Uuid::new_v4()).collect();
        BoardIndex::with_layout(rows, columns).expect("fresh identifiers are unique")
    }

    /// Builds a grid holding `counts[row][column]` fresh items per cell.
    pub fn filled(counts: &[&[usize]]) -> (BoardIndex, Vec<ItemId>) {
        let columns = counts.first().map_or(0, |row| row.len());
        let mut board = grid(counts.len(), columns);
        let mut created = Vec::new();
        for (row, cells) in counts.iter().enumerate() {
            for (column, count) in cells.iter().enumerate() {
                for _ in 0..*count {
                    let item = Uuid::new_v4();
                    board = super::insert_item(&board, row, column, item)
                        .expect("grid position is in range");
                    created.push(item);
                }
            }
        }
        (board, created)
    }
}
