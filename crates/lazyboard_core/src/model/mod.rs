//! Board domain model.
//!
//! # Responsibility
//! - Define the packed positional index shared by every board projection.
//! - Keep one flat item sequence instead of one collection per cell.
//!
//! # Invariants
//! - Every item is positioned by its slot in the flat sequence only.
//! - Rows and columns are referenced by position inside the index.

pub mod board;
