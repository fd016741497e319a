//! Board use-case service.
//!
//! # Responsibility
//! - Resolve presentation commands against the authoritative stored board.
//! - Run read -> resolve -> pure index edit -> versioned write for each edit.
//! - Translate index/repository failures into user-facing not-found errors.
//!
//! # Invariants
//! - A failed command or batch never writes anything.
//! - Stale writes are rejected, never merged.
//! - Display names are trimmed and must not be blank.

use crate::index::{self, BoardCommand, IndexError, PositionLookup};
use crate::model::board::{BoardIndex, BoardValidationError, ColumnId, ItemId, RowId};
use crate::repo::board_repo::{BoardId, BoardRepoError, BoardRepository, StoredBoard};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Tunables for [`BoardService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardServiceConfig {
    /// Re-check index invariants after every edit before writing.
    ///
    /// A failure here is an index defect and is logged at error level.
    pub verify_invariants: bool,
}

impl Default for BoardServiceConfig {
    fn default() -> Self {
        Self {
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Display name is blank after trim.
    InvalidDisplayName,
    BoardNotFound(BoardId),
    RowNotFound(RowId),
    ColumnNotFound(ColumnId),
    ItemNotFound(ItemId),
    /// Command resolved but its arguments are not applicable.
    Rejected(IndexError),
    /// Edited layout broke an index invariant.
    InvariantViolation(BoardValidationError),
    /// Board changed since it was read.
    VersionConflict {
        board_uuid: BoardId,
        expected: i64,
        actual: i64,
    },
    /// Repository-level failure.
    Repo(BoardRepoError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDisplayName => write!(f, "display name must not be blank"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::RowNotFound(id) => write!(f, "row not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Rejected(err) => write!(f, "command rejected: {err}"),
            Self::InvariantViolation(err) => write!(f, "board invariant violated: {err}"),
            Self::VersionConflict {
                board_uuid,
                expected,
                actual,
            } => write!(
                f,
                "board {board_uuid} changed concurrently: expected version {expected}, found {actual}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::InvariantViolation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IndexError> for BoardServiceError {
    fn from(value: IndexError) -> Self {
        match value {
            IndexError::UnknownRow(id) => Self::RowNotFound(id),
            IndexError::UnknownColumn(id) => Self::ColumnNotFound(id),
            IndexError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Rejected(other),
        }
    }
}

impl From<BoardRepoError> for BoardServiceError {
    fn from(value: BoardRepoError) -> Self {
        match value {
            BoardRepoError::BoardNotFound(id) => Self::BoardNotFound(id),
            BoardRepoError::VersionConflict {
                board_uuid,
                expected,
                actual,
            } => Self::VersionConflict {
                board_uuid,
                expected,
                actual,
            },
            other => Self::Repo(other),
        }
    }
}

/// Outcome of one command applied to a stored board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Board as written, carrying its new version.
    pub board: StoredBoard,
    /// Items destroyed by the command.
    pub removed_items: Vec<ItemId>,
}

/// Board service facade.
pub struct BoardService<R: BoardRepository> {
    repo: R,
    config: BoardServiceConfig,
}

impl<R: BoardRepository> BoardService<R> {
    /// Creates service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, BoardServiceConfig::default())
    }

    pub fn with_config(repo: R, config: BoardServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Creates a board with `rows x columns` empty cells and fresh identifiers.
    pub fn create_board(
        &self,
        display_name: impl Into<String>,
        rows: usize,
        columns: usize,
    ) -> Result<StoredBoard, BoardServiceError> {
        let normalized = normalize_display_name(display_name.into())?;
        let layout = BoardIndex::with_layout(
            (0..rows).map(|_| Uuid::new_v4()).collect(),
            (0..columns).map(|_| Uuid::new_v4()).collect(),
        )
        .map_err(BoardServiceError::InvariantViolation)?;
        let board = self.repo.create_board(normalized.as_str(), &layout)?;
        info!(
            "event=board_create module=service status=ok board_uuid={} rows={} columns={}",
            board.board_uuid, rows, columns
        );
        Ok(board)
    }

    /// Loads one board.
    pub fn get_board(&self, board_uuid: BoardId) -> Result<StoredBoard, BoardServiceError> {
        self.repo
            .load_board(board_uuid)?
            .ok_or(BoardServiceError::BoardNotFound(board_uuid))
    }

    /// Lists active boards.
    pub fn list_boards(&self) -> Result<Vec<StoredBoard>, BoardServiceError> {
        self.repo.list_boards().map_err(Into::into)
    }

    pub fn rename_board(
        &self,
        board_uuid: BoardId,
        display_name: impl Into<String>,
    ) -> Result<(), BoardServiceError> {
        let normalized = normalize_display_name(display_name.into())?;
        self.repo
            .rename_board(board_uuid, normalized.as_str())
            .map_err(Into::into)
    }

    pub fn delete_board(&self, board_uuid: BoardId) -> Result<(), BoardServiceError> {
        self.repo.delete_board(board_uuid)?;
        info!("event=board_delete module=service status=ok board_uuid={board_uuid}");
        Ok(())
    }

    /// Applies one command to the current stored layout and writes it back.
    ///
    /// # Errors
    /// - Not-found variants when an identifier does not resolve.
    /// - `VersionConflict` when another writer saved in between.
    pub fn apply(
        &self,
        board_uuid: BoardId,
        command: &BoardCommand,
    ) -> Result<CommandOutcome, BoardServiceError> {
        let started_at = Instant::now();
        let result = self.apply_inner(board_uuid, command);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(outcome) => info!(
                "event=board_apply module=service status=ok board_uuid={} op={} version={} removed={} duration_ms={}",
                board_uuid,
                command.name(),
                outcome.board.version,
                outcome.removed_items.len(),
                duration_ms
            ),
            Err(BoardServiceError::InvariantViolation(err)) => error!(
                "event=board_apply module=service status=error board_uuid={} op={} error_code=invariant_violation error={}",
                board_uuid,
                command.name(),
                err
            ),
            Err(err) => warn!(
                "event=board_apply module=service status=error board_uuid={} op={} duration_ms={} error={}",
                board_uuid,
                command.name(),
                duration_ms,
                err
            ),
        }
        result
    }

    /// Applies commands in order as one write.
    ///
    /// Every command runs against the in-memory result of the previous one;
    /// the final layout is saved once against the version that was read.
    /// Any failure writes nothing. An empty batch writes nothing and returns
    /// `Ok(None)`.
    pub fn apply_all(
        &self,
        board_uuid: BoardId,
        commands: &[BoardCommand],
    ) -> Result<Option<CommandOutcome>, BoardServiceError> {
        if commands.is_empty() {
            return Ok(None);
        }
        let started_at = Instant::now();
        let result = self.commit(board_uuid, commands);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(outcome) => info!(
                "event=board_apply_all module=service status=ok board_uuid={} commands={} version={} removed={} duration_ms={}",
                board_uuid,
                commands.len(),
                outcome.board.version,
                outcome.removed_items.len(),
                duration_ms
            ),
            Err(BoardServiceError::InvariantViolation(err)) => error!(
                "event=board_apply_all module=service status=error board_uuid={} commands={} error_code=invariant_violation error={}",
                board_uuid,
                commands.len(),
                err
            ),
            Err(err) => warn!(
                "event=board_apply_all module=service status=error board_uuid={} commands={} duration_ms={} error={}",
                board_uuid,
                commands.len(),
                duration_ms,
                err
            ),
        }
        result.map(Some)
    }

    fn apply_inner(
        &self,
        board_uuid: BoardId,
        command: &BoardCommand,
    ) -> Result<CommandOutcome, BoardServiceError> {
        self.commit(board_uuid, std::slice::from_ref(command))
    }

    /// Read, fold `commands` over the layout, verify, then one versioned save.
    fn commit(
        &self,
        board_uuid: BoardId,
        commands: &[BoardCommand],
    ) -> Result<CommandOutcome, BoardServiceError> {
        let stored = self.get_board(board_uuid)?;
        let mut layout = stored.index.clone();
        let mut removed_items = Vec::new();
        for command in commands {
            let lookup = PositionLookup::build(&layout);
            let applied = index::apply_with(&layout, &lookup, command)?;
            layout = applied.board;
            removed_items.extend(applied.removed_items);
        }

        if self.config.verify_invariants {
            layout
                .validate()
                .map_err(BoardServiceError::InvariantViolation)?;
        }

        let version = self
            .repo
            .save_board(board_uuid, &layout, stored.version)?;
        Ok(CommandOutcome {
            board: StoredBoard {
                index: layout,
                version,
                ..stored
            },
            removed_items,
        })
    }
}

fn normalize_display_name(value: String) -> Result<String, BoardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardServiceError::InvalidDisplayName);
    }
    Ok(trimmed.to_string())
}
