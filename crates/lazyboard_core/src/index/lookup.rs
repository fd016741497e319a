//! Identifier-to-position lookup maintained alongside a board layout.

use super::{cell_range, IndexError, IndexResult};
use crate::model::board::{BoardIndex, ColumnId, ItemId, ItemPosition, RowId};
use std::collections::HashMap;

/// Resolves row, column and item identifiers to current positions.
///
/// Built in one pass over a layout; rebuild it whenever the layout changes.
#[derive(Debug, Clone, Default)]
pub struct PositionLookup {
    rows: HashMap<RowId, usize>,
    columns: HashMap<ColumnId, usize>,
    items: HashMap<ItemId, ItemPosition>,
}

impl PositionLookup {
    pub fn build(board: &BoardIndex) -> Self {
        let rows = board
            .rows
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        let columns = board
            .columns
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();

        let column_count = board.columns.len();
        let mut items = HashMap::with_capacity(board.items.len());
        for cell in 0..board.cell_index.len() {
            let range = cell_range(&board.cell_index, cell);
            let start = range.start;
            for flat in range {
                items.insert(
                    board.items[flat],
                    ItemPosition {
                        flat,
                        cell,
                        row: cell / column_count,
                        column: cell % column_count,
                        rank: flat - start,
                    },
                );
            }
        }

        Self {
            rows,
            columns,
            items,
        }
    }

    pub fn row(&self, id: RowId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    pub fn column(&self, id: ColumnId) -> Option<usize> {
        self.columns.get(&id).copied()
    }

    pub fn item(&self, id: ItemId) -> Option<ItemPosition> {
        self.items.get(&id).copied()
    }

    /// Like [`PositionLookup::row`], failing with `UnknownRow`.
    pub fn require_row(&self, id: RowId) -> IndexResult<usize> {
        self.row(id).ok_or(IndexError::UnknownRow(id))
    }

    /// Like [`PositionLookup::column`], failing with `UnknownColumn`.
    pub fn require_column(&self, id: ColumnId) -> IndexResult<usize> {
        self.column(id).ok_or(IndexError::UnknownColumn(id))
    }

    /// Like [`PositionLookup::item`], failing with `ItemNotFound`.
    pub fn require_item(&self, id: ItemId) -> IndexResult<ItemPosition> {
        self.item(id).ok_or(IndexError::ItemNotFound(id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
