//! Board index domain model.
//!
//! # Responsibility
//! - Define the four co-located values that describe one board layout.
//! - Provide read-only cell queries over the packed cumulative-count array.
//! - Validate externally supplied values before they enter core.
//!
//! # Invariants
//! - `cell_index.len() == rows.len() * columns.len()`.
//! - `cell_index` is non-decreasing and its last entry equals `items.len()`.
//! - Every item, row and column identifier appears exactly once.
//! - Fields are private: only `index` operations produce new layouts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one row group.
pub type RowId = Uuid;
/// Stable identifier of one column stage.
pub type ColumnId = Uuid;
/// Stable identifier of one board item (task).
pub type ItemId = Uuid;

/// Resolved position of one item inside a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPosition {
    /// Index in the flat row-major item sequence.
    pub flat: usize,
    /// Linear cell key (`row * columns + column`).
    pub cell: usize,
    pub row: usize,
    pub column: usize,
    /// Zero-based rank inside the cell.
    pub rank: usize,
}

/// Invariant violations detected on a board layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    /// `cell_index` length does not match `rows * columns`.
    ShapeMismatch { expected: usize, actual: usize },
    /// `cell_index[cell]` is smaller than the entry before it.
    NonMonotonic { cell: usize },
    /// Last cumulative count does not match the number of items.
    TotalMismatch { indexed: usize, items: usize },
    DuplicateItem(ItemId),
    DuplicateRow(RowId),
    DuplicateColumn(ColumnId),
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "cell index length {actual} does not match grid size {expected}"
            ),
            Self::NonMonotonic { cell } => {
                write!(f, "cell index decreases at cell {cell}")
            }
            Self::TotalMismatch { indexed, items } => write!(
                f,
                "cell index counts {indexed} items but sequence holds {items}"
            ),
            Self::DuplicateItem(id) => write!(f, "item appears more than once: {id}"),
            Self::DuplicateRow(id) => write!(f, "row appears more than once: {id}"),
            Self::DuplicateColumn(id) => write!(f, "column appears more than once: {id}"),
        }
    }
}

impl Error for BoardValidationError {}

/// Positional index of one Kanban board.
///
/// Items are stored once, row-major, in `items`. `cell_index[k]` is the number
/// of items at or before cell `k`, so cell `k` owns
/// `items[cell_index[k - 1]..cell_index[k]]` (with `cell_index[-1] = 0`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardIndexWire")]
pub struct BoardIndex {
    pub(crate) rows: Vec<RowId>,
    pub(crate) columns: Vec<ColumnId>,
    pub(crate) items: Vec<ItemId>,
    pub(crate) cell_index: Vec<usize>,
}

/// Unvalidated wire shape; decoding always goes through `validate`.
#[derive(Deserialize)]
struct BoardIndexWire {
    rows: Vec<RowId>,
    columns: Vec<ColumnId>,
    items: Vec<ItemId>,
    cell_index: Vec<usize>,
}

impl TryFrom<BoardIndexWire> for BoardIndex {
    type Error = BoardValidationError;

    fn try_from(value: BoardIndexWire) -> Result<Self, Self::Error> {
        Self::from_parts(value.rows, value.columns, value.items, value.cell_index)
    }
}

impl BoardIndex {
    /// Creates an empty board with no rows and no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty grid with the given row and column identifiers.
    ///
    /// # Errors
    /// - Returns duplicate errors when an identifier repeats.
    pub fn with_layout(
        rows: Vec<RowId>,
        columns: Vec<ColumnId>,
    ) -> Result<Self, BoardValidationError> {
        let cells = rows.len() * columns.len();
        Self::from_parts(rows, columns, Vec::new(), vec![0; cells])
    }

    /// Rebuilds a board from persisted or transported values.
    ///
    /// # Errors
    /// - Returns the first invariant violation found by [`BoardIndex::validate`].
    pub fn from_parts(
        rows: Vec<RowId>,
        columns: Vec<ColumnId>,
        items: Vec<ItemId>,
        cell_index: Vec<usize>,
    ) -> Result<Self, BoardValidationError> {
        let board = Self {
            rows,
            columns,
            items,
            cell_index,
        };
        board.validate()?;
        Ok(board)
    }

    /// Consumes the board and returns `(rows, columns, items, cell_index)`.
    pub fn into_parts(self) -> (Vec<RowId>, Vec<ColumnId>, Vec<ItemId>, Vec<usize>) {
        (self.rows, self.columns, self.items, self.cell_index)
    }

    /// Checks shape, monotonicity, conservation and identifier uniqueness.
    pub fn validate(&self) -> Result<(), BoardValidationError> {
        let expected = self.rows.len() * self.columns.len();
        if self.cell_index.len() != expected {
            return Err(BoardValidationError::ShapeMismatch {
                expected,
                actual: self.cell_index.len(),
            });
        }

        if let Some(cell) = self
            .cell_index
            .windows(2)
            .position(|pair| pair[0] > pair[1])
        {
            return Err(BoardValidationError::NonMonotonic { cell: cell + 1 });
        }

        let indexed = self.cell_index.last().copied().unwrap_or(0);
        if indexed != self.items.len() {
            return Err(BoardValidationError::TotalMismatch {
                indexed,
                items: self.items.len(),
            });
        }

        if let Some(id) = first_duplicate(&self.items) {
            return Err(BoardValidationError::DuplicateItem(id));
        }
        if let Some(id) = first_duplicate(&self.rows) {
            return Err(BoardValidationError::DuplicateRow(id));
        }
        if let Some(id) = first_duplicate(&self.columns) {
            return Err(BoardValidationError::DuplicateColumn(id));
        }
        Ok(())
    }

    /// Row identifiers in display order.
    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    /// Column identifiers in display order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// All items in global row-major display order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Packed cumulative cell counts.
    pub fn cell_index(&self) -> &[usize] {
        &self.cell_index
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the items of cell `(row, column)` in cell order.
    ///
    /// Returns `None` when the cell is outside the grid.
    pub fn cell_items(&self, row: usize, column: usize) -> Option<&[ItemId]> {
        if row >= self.rows.len() || column >= self.columns.len() {
            return None;
        }
        let key = crate::index::cell_key(row, column, self.columns.len());
        Some(&self.items[crate::index::cell_range(&self.cell_index, key)])
    }

    /// Returns the item count of cell `(row, column)`, or `None` off-grid.
    pub fn cell_len(&self, row: usize, column: usize) -> Option<usize> {
        self.cell_items(row, column).map(<[ItemId]>::len)
    }

    /// Resolves one item to its flat, cell and rank position by linear scan.
    ///
    /// Use [`crate::index::PositionLookup`] when resolving many identifiers.
    pub fn locate(&self, item: ItemId) -> Option<ItemPosition> {
        let flat = self.items.iter().position(|current| *current == item)?;
        Some(self.position_of_flat(flat))
    }

    /// Expands the packed layout into `grid[row][column] -> items`.
    pub fn to_grid(&self) -> Vec<Vec<Vec<ItemId>>> {
        (0..self.rows.len())
            .map(|row| {
                (0..self.columns.len())
                    .map(|column| {
                        self.cell_items(row, column)
                            .map(<[ItemId]>::to_vec)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn position_of_flat(&self, flat: usize) -> ItemPosition {
        let cell = crate::index::cell_of_flat(&self.cell_index, flat);
        let (row, column) = crate::index::row_col_of_key(cell, self.columns.len());
        ItemPosition {
            flat,
            cell,
            row,
            column,
            rank: flat - crate::index::cell_start(&self.cell_index, cell),
        }
    }
}

fn first_duplicate(ids: &[Uuid]) -> Option<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::{BoardIndex, BoardValidationError};
    use uuid::Uuid;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn with_layout_builds_empty_cells() {
        let board = BoardIndex::with_layout(ids(2), ids(3)).unwrap();
        assert_eq!(board.cell_index(), &[0, 0, 0, 0, 0, 0]);
        assert!(board.items().is_empty());
        assert_eq!(board.cell_len(1, 2), Some(0));
        assert_eq!(board.cell_len(2, 0), None);
    }

    #[test]
    fn from_parts_rejects_shape_mismatch() {
        let err = BoardIndex::from_parts(ids(2), ids(2), Vec::new(), vec![0; 3]).unwrap_err();
        assert_eq!(
            err,
            BoardValidationError::ShapeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn from_parts_rejects_decreasing_counts() {
        let items = ids(2);
        let err = BoardIndex::from_parts(ids(1), ids(3), items, vec![2, 1, 2]).unwrap_err();
        assert_eq!(err, BoardValidationError::NonMonotonic { cell: 1 });
    }

    #[test]
    fn from_parts_rejects_total_mismatch_and_duplicates() {
        let err = BoardIndex::from_parts(ids(1), ids(1), ids(2), vec![1]).unwrap_err();
        assert_eq!(
            err,
            BoardValidationError::TotalMismatch {
                indexed: 1,
                items: 2
            }
        );

        let item = Uuid::new_v4();
        let err = BoardIndex::from_parts(ids(1), ids(1), vec![item, item], vec![2]).unwrap_err();
        assert_eq!(err, BoardValidationError::DuplicateItem(item));

        let row = Uuid::new_v4();
        let err = BoardIndex::with_layout(vec![row, row], ids(1)).unwrap_err();
        assert_eq!(err, BoardValidationError::DuplicateRow(row));
    }

    #[test]
    fn empty_grid_must_hold_no_items() {
        let err = BoardIndex::from_parts(Vec::new(), ids(2), ids(1), Vec::new()).unwrap_err();
        assert!(matches!(err, BoardValidationError::TotalMismatch { .. }));
    }

    #[test]
    fn cell_queries_follow_cumulative_counts() {
        let items = ids(4);
        let board =
            BoardIndex::from_parts(ids(2), ids(2), items.clone(), vec![1, 1, 3, 4]).unwrap();

        assert_eq!(board.cell_items(0, 0).unwrap(), &items[0..1]);
        assert!(board.cell_items(0, 1).unwrap().is_empty());
        assert_eq!(board.cell_items(1, 0).unwrap(), &items[1..3]);
        assert_eq!(board.cell_items(1, 1).unwrap(), &items[3..4]);

        let position = board.locate(items[2]).unwrap();
        assert_eq!(position.flat, 2);
        assert_eq!(position.cell, 2);
        assert_eq!((position.row, position.column, position.rank), (1, 0, 1));

        let grid = board.to_grid();
        assert_eq!(grid[1][0], items[1..3].to_vec());
        assert!(board.locate(Uuid::new_v4()).is_none());
    }

    #[test]
    fn serialization_uses_expected_wire_fields() {
        let board = BoardIndex::with_layout(ids(1), ids(2)).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["cell_index"], serde_json::json!([0, 0]));
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["columns"].as_array().unwrap().len(), 2);
        assert!(json["items"].as_array().unwrap().is_empty());

        let decoded: BoardIndex = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn deserialization_rejects_invalid_layout() {
        let json = serde_json::json!({
            "rows": [Uuid::new_v4()],
            "columns": [Uuid::new_v4()],
            "items": [],
            "cell_index": [3],
        });
        let err = serde_json::from_value::<BoardIndex>(json).unwrap_err();
        assert!(err.to_string().contains("cell index counts 3"));
    }
}
