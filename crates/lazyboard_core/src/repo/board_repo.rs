//! Board repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the four board index values per board and read them back.
//! - Reject stale writes through a per-board version stamp.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) boards are visible.
//! - Every save bumps `version` by exactly one.
//! - Read paths reject persisted layouts that fail `BoardIndex::validate()`.
//! - Write paths refuse layouts that fail `BoardIndex::validate()`.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, DbError};
use crate::model::board::{BoardIndex, BoardValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable board identifier.
pub type BoardId = Uuid;

/// Result type used by board repository operations.
pub type BoardRepoResult<T> = Result<T, BoardRepoError>;

const BOARD_SELECT_SQL: &str = "SELECT
    board_uuid,
    display_name,
    rows_json,
    columns_json,
    items_json,
    cell_index_json,
    version,
    created_at,
    updated_at
FROM boards";

const REQUIRED_COLUMNS: &[&str] = &[
    "board_uuid",
    "display_name",
    "rows_json",
    "columns_json",
    "items_json",
    "cell_index_json",
    "version",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Errors from board repository operations.
#[derive(Debug)]
pub enum BoardRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target board does not exist or is soft-deleted.
    BoardNotFound(BoardId),
    /// Stored version differs from the version the caller read.
    VersionConflict {
        board_uuid: BoardId,
        expected: i64,
        actual: i64,
    },
    /// Layout handed to a write path violates index invariants.
    Validation(BoardValidationError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid board.
    InvalidData(String),
}

impl Display for BoardRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::VersionConflict {
                board_uuid,
                expected,
                actual,
            } => write!(
                f,
                "board {board_uuid} changed concurrently: expected version {expected}, found {actual}"
            ),
            Self::Validation(err) => write!(f, "invalid board layout: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "board repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted board data: {message}"),
        }
    }
}

impl Error for BoardRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BoardRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BoardRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<BoardValidationError> for BoardRepoError {
    fn from(value: BoardValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Persisted board read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBoard {
    pub board_uuid: BoardId,
    /// User-facing board title.
    pub display_name: String,
    /// Validated positional index.
    pub index: BoardIndex,
    /// Optimistic concurrency stamp; pass back to `save_board`.
    pub version: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Repository interface for board index persistence.
pub trait BoardRepository {
    /// Stores a new board at version 0.
    fn create_board(&self, display_name: &str, index: &BoardIndex)
        -> BoardRepoResult<StoredBoard>;
    /// Loads one active board.
    fn load_board(&self, board_uuid: BoardId) -> BoardRepoResult<Option<StoredBoard>>;
    /// Lists active boards, most recently updated first.
    fn list_boards(&self) -> BoardRepoResult<Vec<StoredBoard>>;
    /// Replaces the stored layout when `expected_version` is still current.
    ///
    /// Returns the new version.
    fn save_board(
        &self,
        board_uuid: BoardId,
        index: &BoardIndex,
        expected_version: i64,
    ) -> BoardRepoResult<i64>;
    /// Renames one board without touching its layout or version.
    fn rename_board(&self, board_uuid: BoardId, display_name: &str) -> BoardRepoResult<()>;
    /// Soft-deletes one board.
    fn delete_board(&self, board_uuid: BoardId) -> BoardRepoResult<()>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_board_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn create_board(
        &self,
        display_name: &str,
        index: &BoardIndex,
    ) -> BoardRepoResult<StoredBoard> {
        index.validate()?;
        let board_uuid = Uuid::new_v4();
        let encoded = EncodedIndex::encode(index)?;
        self.conn.execute(
            "INSERT INTO boards (
                board_uuid,
                display_name,
                rows_json,
                columns_json,
                items_json,
                cell_index_json,
                version,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0);",
            params![
                board_uuid.to_string(),
                display_name,
                encoded.rows,
                encoded.columns,
                encoded.items,
                encoded.cell_index,
            ],
        )?;
        self.load_board(board_uuid)?
            .ok_or(BoardRepoError::BoardNotFound(board_uuid))
    }

    fn load_board(&self, board_uuid: BoardId) -> BoardRepoResult<Option<StoredBoard>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL} WHERE board_uuid = ?1 AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query([board_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_board_row(row)?));
        }
        Ok(None)
    }

    fn list_boards(&self) -> BoardRepoResult<Vec<StoredBoard>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL} WHERE is_deleted = 0 ORDER BY updated_at DESC, board_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn save_board(
        &self,
        board_uuid: BoardId,
        index: &BoardIndex,
        expected_version: i64,
    ) -> BoardRepoResult<i64> {
        index.validate()?;
        let encoded = EncodedIndex::encode(index)?;
        // Single conditional statement: the version check and the write
        // cannot interleave with another writer.
        let changed = self.conn.execute(
            "UPDATE boards
             SET rows_json = ?3,
                 columns_json = ?4,
                 items_json = ?5,
                 cell_index_json = ?6,
                 version = version + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE board_uuid = ?1
               AND version = ?2
               AND is_deleted = 0;",
            params![
                board_uuid.to_string(),
                expected_version,
                encoded.rows,
                encoded.columns,
                encoded.items,
                encoded.cell_index,
            ],
        )?;
        if changed == 1 {
            return Ok(expected_version + 1);
        }

        match current_version(self.conn, board_uuid)? {
            None => Err(BoardRepoError::BoardNotFound(board_uuid)),
            Some(actual) => Err(BoardRepoError::VersionConflict {
                board_uuid,
                expected: expected_version,
                actual,
            }),
        }
    }

    fn rename_board(&self, board_uuid: BoardId, display_name: &str) -> BoardRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET display_name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE board_uuid = ?1
               AND is_deleted = 0;",
            params![board_uuid.to_string(), display_name],
        )?;
        if changed == 0 {
            return Err(BoardRepoError::BoardNotFound(board_uuid));
        }
        Ok(())
    }

    fn delete_board(&self, board_uuid: BoardId) -> BoardRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE board_uuid = ?1
               AND is_deleted = 0;",
            [board_uuid.to_string()],
        )?;
        if changed == 0 {
            return Err(BoardRepoError::BoardNotFound(board_uuid));
        }
        Ok(())
    }
}

/// JSON text columns for one layout.
struct EncodedIndex {
    rows: String,
    columns: String,
    items: String,
    cell_index: String,
}

impl EncodedIndex {
    fn encode(index: &BoardIndex) -> BoardRepoResult<Self> {
        Ok(Self {
            rows: encode_json(index.rows(), "rows_json")?,
            columns: encode_json(index.columns(), "columns_json")?,
            items: encode_json(index.items(), "items_json")?,
            cell_index: encode_json(index.cell_index(), "cell_index_json")?,
        })
    }
}

fn encode_json<T: serde::Serialize + ?Sized>(
    value: &T,
    column: &'static str,
) -> BoardRepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| BoardRepoError::InvalidData(format!("cannot encode {column}: {err}")))
}

fn decode_json<T: DeserializeOwned>(row: &Row<'_>, column: &'static str) -> BoardRepoResult<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text)
        .map_err(|err| BoardRepoError::InvalidData(format!("invalid json in boards.{column}: {err}")))
}

fn parse_board_row(row: &Row<'_>) -> BoardRepoResult<StoredBoard> {
    let board_uuid_text: String = row.get("board_uuid")?;
    let board_uuid = Uuid::parse_str(&board_uuid_text).map_err(|_| {
        BoardRepoError::InvalidData(format!(
            "invalid uuid `{board_uuid_text}` in boards.board_uuid"
        ))
    })?;

    let index = BoardIndex::from_parts(
        decode_json(row, "rows_json")?,
        decode_json(row, "columns_json")?,
        decode_json(row, "items_json")?,
        decode_json(row, "cell_index_json")?,
    )
    .map_err(|err| {
        BoardRepoError::InvalidData(format!("board {board_uuid} layout is corrupt: {err}"))
    })?;

    Ok(StoredBoard {
        board_uuid,
        display_name: row.get("display_name")?,
        index,
        version: row.get("version")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn current_version(conn: &Connection, board_uuid: BoardId) -> BoardRepoResult<Option<i64>> {
    let version = conn
        .query_row(
            "SELECT version
             FROM boards
             WHERE board_uuid = ?1
               AND is_deleted = 0;",
            [board_uuid.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}

fn ensure_board_connection_ready(conn: &Connection) -> BoardRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(BoardRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "boards")? {
        return Err(BoardRepoError::MissingRequiredTable("boards"));
    }
    for column in REQUIRED_COLUMNS.iter().copied() {
        if !table_has_column(conn, "boards", column)? {
            return Err(BoardRepoError::MissingRequiredColumn {
                table: "boards",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> BoardRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> BoardRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
