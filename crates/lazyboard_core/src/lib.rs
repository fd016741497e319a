//! Core domain logic for LazyBoard.
//! This crate is the single source of truth for board layout invariants.

pub mod db;
pub mod index;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use index::{Applied, BoardCommand, Cascade, IndexError, IndexResult, PositionLookup};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingConfig,
};
pub use model::board::{
    BoardIndex, BoardValidationError, ColumnId, ItemId, ItemPosition, RowId,
};
pub use repo::board_repo::{
    BoardId, BoardRepoError, BoardRepoResult, BoardRepository, SqliteBoardRepository,
    StoredBoard,
};
pub use service::board_service::{
    BoardService, BoardServiceConfig, BoardServiceError, CommandOutcome,
};
pub use service::optimistic::{EditToken, OptimisticBoard};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
