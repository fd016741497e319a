//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the load/save contract consumed by the board service.
//! - Isolate SQLite query details from index and service logic.
//!
//! # Invariants
//! - Repository writes must enforce `BoardIndex::validate()` before persistence.
//! - Repository APIs return semantic errors (`BoardNotFound`,
//!   `VersionConflict`) in addition to DB transport errors.

pub mod board_repo;
