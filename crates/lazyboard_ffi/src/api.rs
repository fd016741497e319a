//! FFI use-case API for Flutter-facing board calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level board functions to Dart via FRB.
//! - Carry layouts and commands across the boundary as JSON text.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - `board_apply` and `board_apply_local` run the same core index edit.
//! - Failures are reported in the envelope, never thrown.

use lazyboard_core::db::open_db;
use lazyboard_core::{
    core_version as core_version_inner, index, init_logging as init_logging_inner,
    ping as ping_inner, BoardCommand, BoardId, BoardIndex, BoardService, ItemId,
    SqliteBoardRepository, StoredBoard,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const BOARD_DB_FILE_NAME: &str = "lazyboard_boards.sqlite3";
const BOARD_DB_PATH_ENV: &str = "LAZYBOARD_DB_PATH";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Response envelope shared by every board call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Board ID; `None` for local edits and failures.
    pub board_id: Option<String>,
    /// Stored version after the call; `None` for local edits and failures.
    pub version: Option<i64>,
    /// Layout JSON (`rows`, `columns`, `items`, `cell_index`) after the call.
    pub board_json: Option<String>,
    /// Items destroyed by the command, in string form.
    pub removed_items: Vec<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl BoardResponse {
    fn stored(message: impl Into<String>, board: &StoredBoard, removed: &[ItemId]) -> Self {
        match encode_layout(&board.index) {
            Ok(board_json) => Self {
                ok: true,
                board_id: Some(board.board_uuid.to_string()),
                version: Some(board.version),
                board_json: Some(board_json),
                removed_items: removed.iter().map(ToString::to_string).collect(),
                message: message.into(),
            },
            Err(err) => Self::failure(err),
        }
    }

    fn local(layout: &BoardIndex, removed: &[ItemId]) -> Self {
        match encode_layout(layout) {
            Ok(board_json) => Self {
                ok: true,
                board_id: None,
                version: None,
                board_json: Some(board_json),
                removed_items: removed.iter().map(ToString::to_string).collect(),
                message: "Applied locally.".to_string(),
            },
            Err(err) => Self::failure(err),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            board_id: None,
            version: None,
            board_json: None,
            removed_items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Creates an empty `rows x columns` board.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns board ID, version `0` and the empty layout on success.
#[flutter_rust_bridge::frb(sync)]
pub fn board_create(display_name: String, rows: u32, columns: u32) -> BoardResponse {
    let result = with_board_service(|service| {
        service
            .create_board(display_name, rows as usize, columns as usize)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(board) => BoardResponse::stored("Board created.", &board, &[]),
        Err(err) => failure("board_create", err),
    }
}

/// Loads one stored board.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_get(board_id: String) -> BoardResponse {
    let result = parse_board_id(&board_id).and_then(|board_uuid| {
        with_board_service(|service| service.get_board(board_uuid).map_err(|err| err.to_string()))
    });
    match result {
        Ok(board) => BoardResponse::stored("Board loaded.", &board, &[]),
        Err(err) => failure("board_get", err),
    }
}

/// Applies one JSON command to the stored board and writes it back.
///
/// `command_json` is a tagged object, e.g.
/// `{"op":"move_item","item":"<uuid>","row":"<uuid>","column":"<uuid>","rank":0}`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A stale or rejected command writes nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn board_apply(board_id: String, command_json: String) -> BoardResponse {
    let result = parse_board_id(&board_id).and_then(|board_uuid| {
        let command = parse_command(&command_json)?;
        with_board_service(|service| {
            service
                .apply(board_uuid, &command)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(outcome) => {
            BoardResponse::stored("Command applied.", &outcome.board, &outcome.removed_items)
        }
        Err(err) => failure("board_apply", err),
    }
}

/// Applies one JSON command to a caller-held layout snapshot.
///
/// Pure: no DB access, nothing persisted. The returned layout is the
/// optimistic local copy; keep `snapshot_json` to roll back if the
/// authoritative `board_apply` later rejects the same command.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn board_apply_local(snapshot_json: String, command_json: String) -> BoardResponse {
    let result = serde_json::from_str::<BoardIndex>(&snapshot_json)
        .map_err(|err| format!("invalid board snapshot: {err}"))
        .and_then(|layout| {
            let command = parse_command(&command_json)?;
            index::apply(&layout, &command).map_err(|err| err.to_string())
        });
    match result {
        Ok(applied) => BoardResponse::local(&applied.board, &applied.removed_items),
        Err(err) => failure("board_apply_local", err),
    }
}

fn failure(call: &str, err: String) -> BoardResponse {
    warn!("event=ffi_call module=ffi status=error call={call} error={err}");
    BoardResponse::failure(format!("{call} failed: {err}"))
}

fn parse_board_id(raw: &str) -> Result<BoardId, String> {
    BoardId::parse_str(raw.trim()).map_err(|_| format!("invalid board id `{}`", raw.trim()))
}

fn parse_command(raw: &str) -> Result<BoardCommand, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid command: {err}"))
}

fn encode_layout(layout: &BoardIndex) -> Result<String, String> {
    serde_json::to_string(layout).map_err(|err| format!("cannot encode board: {err}"))
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(BOARD_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn with_board_service<T>(
    f: impl FnOnce(&BoardService<SqliteBoardRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_board_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("board DB open failed: {err}"))?;
    let repo = SqliteBoardRepository::try_new(&conn)
        .map_err(|err| format!("board repo init failed: {err}"))?;
    let service = BoardService::new(repo);
    f(&service)
}

#[cfg(test)]
mod tests {
    use super::{
        board_apply, board_apply_local, board_create, board_get, core_version, init_logging, ping,
    };
    use lazyboard_core::BoardIndex;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn layout_of(json: &str) -> Value {
        serde_json::from_str(json).expect("layout json")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn board_create_then_apply_insert_bumps_version() {
        let created = board_create("Sprint".to_string(), 2, 3);
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.version, Some(0));
        let board_id = created.board_id.clone().expect("board id");
        let layout = layout_of(created.board_json.as_deref().expect("layout"));
        assert_eq!(layout["cell_index"], json!([0, 0, 0, 0, 0, 0]));

        let item = Uuid::new_v4();
        let command = json!({
            "op": "insert_item",
            "item": item,
            "row": layout["rows"][0],
            "column": layout["columns"][0],
        });
        let applied = board_apply(board_id.clone(), command.to_string());
        assert!(applied.ok, "{}", applied.message);
        assert_eq!(applied.version, Some(1));
        let after = layout_of(applied.board_json.as_deref().expect("layout"));
        assert_eq!(after["cell_index"], json!([1, 1, 1, 1, 1, 1]));

        let loaded = board_get(board_id);
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.board_json, applied.board_json);
    }

    #[test]
    fn board_apply_reports_unknown_board_and_bad_json() {
        let missing = board_apply(
            Uuid::new_v4().to_string(),
            json!({"op": "delete_item", "item": Uuid::new_v4()}).to_string(),
        );
        assert!(!missing.ok);
        assert!(missing.message.contains("board not found"));

        let garbage = board_apply(Uuid::new_v4().to_string(), "{".to_string());
        assert!(!garbage.ok);
        assert!(garbage.message.contains("invalid command"));
    }

    #[test]
    fn board_get_rejects_malformed_id() {
        let response = board_get("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid board id"));
    }

    #[test]
    fn board_apply_local_cascades_row_delete_without_persisting() {
        let row = Uuid::new_v4();
        let column = Uuid::new_v4();
        let item = Uuid::new_v4();
        let snapshot = BoardIndex::from_parts(vec![row], vec![column], vec![item], vec![1])
            .expect("valid layout");
        let snapshot_json = serde_json::to_string(&snapshot).expect("encode");

        let response = board_apply_local(
            snapshot_json,
            json!({"op": "delete_row", "row": row}).to_string(),
        );
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.board_id, None);
        assert_eq!(response.removed_items, vec![item.to_string()]);
        let after = layout_of(response.board_json.as_deref().expect("layout"));
        assert_eq!(after["cell_index"], json!([]));
        assert_eq!(after["items"], json!([]));
    }

    #[test]
    fn board_apply_local_rejects_corrupt_snapshot() {
        let snapshot = json!({
            "rows": [Uuid::new_v4()],
            "columns": [Uuid::new_v4()],
            "items": [],
            "cell_index": [3],
        });
        let response = board_apply_local(
            snapshot.to_string(),
            json!({"op": "insert_row", "row": Uuid::new_v4()}).to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("invalid board snapshot"));
    }
}
