//! Identifier-addressed board commands.
//!
//! Commands mirror the requests issued by drag-and-drop gestures. They carry
//! stable identifiers only; positions are resolved through [`PositionLookup`]
//! at apply time against the layout being edited.

use super::{
    cell_key, delete_column, delete_item_at, delete_row, insert_column, insert_item, insert_row,
    move_item_at, Cascade, IndexResult, PositionLookup,
};
use crate::model::board::{BoardIndex, ColumnId, ItemId, RowId};
use serde::{Deserialize, Serialize};

/// One structural board edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BoardCommand {
    /// Append `item` to the end of cell `(row, column)`.
    InsertItem {
        item: ItemId,
        row: RowId,
        column: ColumnId,
    },
    DeleteItem {
        item: ItemId,
    },
    /// Move `item` to `rank` of cell `(row, column)`, ranked after removal.
    MoveItem {
        item: ItemId,
        row: RowId,
        column: ColumnId,
        rank: usize,
    },
    /// Append an empty row group.
    InsertRow {
        row: RowId,
    },
    /// Delete a row group and every item in it.
    DeleteRow {
        row: RowId,
    },
    /// Append an empty column stage.
    InsertColumn {
        column: ColumnId,
    },
    /// Delete a column stage and every item in it.
    DeleteColumn {
        column: ColumnId,
    },
}

impl BoardCommand {
    /// Stable operation name used in logs and FFI envelopes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertItem { .. } => "insert_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::MoveItem { .. } => "move_item",
            Self::InsertRow { .. } => "insert_row",
            Self::DeleteRow { .. } => "delete_row",
            Self::InsertColumn { .. } => "insert_column",
            Self::DeleteColumn { .. } => "delete_column",
        }
    }
}

/// Result of one applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub board: BoardIndex,
    /// Items removed by the command: the deleted item, or a cascade.
    pub removed_items: Vec<ItemId>,
}

impl Applied {
    fn kept(board: BoardIndex) -> Self {
        Self {
            board,
            removed_items: Vec::new(),
        }
    }
}

impl From<Cascade> for Applied {
    fn from(value: Cascade) -> Self {
        Self {
            board: value.board,
            removed_items: value.removed_items,
        }
    }
}

/// Resolves `command` against `board` and applies it.
pub fn apply(board: &BoardIndex, command: &BoardCommand) -> IndexResult<Applied> {
    let lookup = PositionLookup::build(board);
    apply_with(board, &lookup, command)
}

/// Like [`apply`], reusing a lookup already built for `board`.
pub fn apply_with(
    board: &BoardIndex,
    lookup: &PositionLookup,
    command: &BoardCommand,
) -> IndexResult<Applied> {
    match *command {
        BoardCommand::InsertItem { item, row, column } => {
            let row = lookup.require_row(row)?;
            let column = lookup.require_column(column)?;
            insert_item(board, row, column, item).map(Applied::kept)
        }
        BoardCommand::DeleteItem { item } => {
            let position = lookup.require_item(item)?;
            let board = delete_item_at(board, position.flat)?;
            Ok(Applied {
                board,
                removed_items: vec![item],
            })
        }
        BoardCommand::MoveItem {
            item,
            row,
            column,
            rank,
        } => {
            let source = lookup.require_item(item)?;
            let row = lookup.require_row(row)?;
            let column = lookup.require_column(column)?;
            let dst_cell = cell_key(row, column, board.column_count());
            move_item_at(board, source.flat, source.cell, dst_cell, rank).map(Applied::kept)
        }
        BoardCommand::InsertRow { row } => insert_row(board, row).map(Applied::kept),
        BoardCommand::DeleteRow { row } => {
            let row = lookup.require_row(row)?;
            delete_row(board, row).map(Applied::from)
        }
        BoardCommand::InsertColumn { column } => insert_column(board, column).map(Applied::kept),
        BoardCommand::DeleteColumn { column } => {
            let column = lookup.require_column(column)?;
            delete_column(board, column).map(Applied::from)
        }
    }
}
