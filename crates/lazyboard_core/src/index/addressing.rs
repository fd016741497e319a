//! Linear cell addressing over the packed cumulative-count array.

use std::ops::Range;

/// Linear row-major key of cell `(row, column)`.
pub fn cell_key(row: usize, column: usize, columns: usize) -> usize {
    row * columns + column
}

/// Inverse of [`cell_key`].
///
/// `columns` must be non-zero whenever a cell exists.
pub fn row_col_of_key(key: usize, columns: usize) -> (usize, usize) {
    (key / columns, key % columns)
}

/// First flat position owned by cell `key` (`cell_index[-1] == 0`).
pub fn cell_start(cell_index: &[usize], key: usize) -> usize {
    if key == 0 {
        0
    } else {
        cell_index[key - 1]
    }
}

/// Flat range owned by cell `key`.
pub fn cell_range(cell_index: &[usize], key: usize) -> Range<usize> {
    cell_start(cell_index, key)..cell_index[key]
}

/// Number of items held by cell `key`.
pub fn cell_len(cell_index: &[usize], key: usize) -> usize {
    cell_index[key] - cell_start(cell_index, key)
}

/// Cell key owning flat position `flat`.
///
/// The owning cell is the first one whose cumulative count exceeds `flat`;
/// empty cells sharing that boundary are skipped.
pub fn cell_of_flat(cell_index: &[usize], flat: usize) -> usize {
    cell_index.partition_point(|count| *count <= flat)
}
