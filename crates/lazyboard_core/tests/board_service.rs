use lazyboard_core::db::open_db_in_memory;
use lazyboard_core::{
    BoardCommand, BoardId, BoardIndex, BoardRepoError, BoardRepoResult, BoardRepository,
    BoardService, BoardServiceConfig, BoardServiceError, IndexError, SqliteBoardRepository,
    StoredBoard,
};
use std::cell::Cell;
use uuid::Uuid;

#[test]
fn create_board_trims_name_and_builds_empty_grid() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());

    let board = service.create_board("  Roadmap  ", 2, 3).unwrap();
    assert_eq!(board.display_name, "Roadmap");
    assert_eq!(board.version, 0);
    assert_eq!(board.index.row_count(), 2);
    assert_eq!(board.index.column_count(), 3);
    assert_eq!(board.index.cell_index(), &[0, 0, 0, 0, 0, 0]);
}

#[test]
fn create_board_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.create_board("   ", 1, 1),
        Err(BoardServiceError::InvalidDisplayName)
    ));
}

#[test]
fn apply_writes_each_command_and_bumps_version() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 1, 2).unwrap();
    let row = board.index.rows()[0];
    let columns = board.index.columns().to_vec();
    let item = Uuid::new_v4();

    let inserted = service
        .apply(
            board.board_uuid,
            &BoardCommand::InsertItem {
                item,
                row,
                column: columns[0],
            },
        )
        .unwrap();
    assert_eq!(inserted.board.version, 1);
    assert_eq!(inserted.board.index.cell_index(), &[1, 1]);

    let moved = service
        .apply(
            board.board_uuid,
            &BoardCommand::MoveItem {
                item,
                row,
                column: columns[1],
                rank: 0,
            },
        )
        .unwrap();
    assert_eq!(moved.board.version, 2);
    assert_eq!(moved.board.index.cell_index(), &[0, 1]);

    let stored = service.get_board(board.board_uuid).unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.index, moved.board.index);
}

#[test]
fn delete_column_reports_cascaded_items() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 2, 2).unwrap();
    let rows = board.index.rows().to_vec();
    let column = board.index.columns()[0];
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    service
        .apply_all(
            board.board_uuid,
            &[
                BoardCommand::InsertItem {
                    item: a,
                    row: rows[0],
                    column,
                },
                BoardCommand::InsertItem {
                    item: b,
                    row: rows[1],
                    column,
                },
            ],
        )
        .unwrap();

    let outcome = service
        .apply(board.board_uuid, &BoardCommand::DeleteColumn { column })
        .unwrap();
    assert_eq!(outcome.removed_items, vec![a, b]);
    assert_eq!(outcome.board.index.cell_index(), &[0, 0]);
    assert_eq!(outcome.board.index.item_count(), 0);
}

#[test]
fn unresolved_identifiers_map_to_not_found_and_write_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 1, 1).unwrap();
    let row = board.index.rows()[0];
    let column = board.index.columns()[0];
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.apply(board.board_uuid, &BoardCommand::DeleteItem { item: missing }),
        Err(BoardServiceError::ItemNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.apply(
            board.board_uuid,
            &BoardCommand::InsertItem { item: Uuid::new_v4(), row: missing, column }
        ),
        Err(BoardServiceError::RowNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.apply(
            board.board_uuid,
            &BoardCommand::InsertItem { item: Uuid::new_v4(), row, column: missing }
        ),
        Err(BoardServiceError::ColumnNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.apply(missing, &BoardCommand::DeleteRow { row }),
        Err(BoardServiceError::BoardNotFound(id)) if id == missing
    ));

    assert_eq!(service.get_board(board.board_uuid).unwrap().version, 0);
}

#[test]
fn out_of_range_rank_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::with_config(
        SqliteBoardRepository::try_new(&conn).unwrap(),
        BoardServiceConfig {
            verify_invariants: true,
        },
    );
    let board = service.create_board("Board", 1, 1).unwrap();
    let row = board.index.rows()[0];
    let column = board.index.columns()[0];
    let item = Uuid::new_v4();
    service
        .apply(board.board_uuid, &BoardCommand::InsertItem { item, row, column })
        .unwrap();

    let err = service
        .apply(
            board.board_uuid,
            &BoardCommand::MoveItem {
                item,
                row,
                column,
                rank: 3,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::Rejected(IndexError::RankOutOfRange { rank: 3, len: 0 })
    ));
    assert_eq!(service.get_board(board.board_uuid).unwrap().version, 1);
}

#[test]
fn apply_all_failure_mid_batch_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 1, 1).unwrap();
    let new_row = Uuid::new_v4();

    let err = service
        .apply_all(
            board.board_uuid,
            &[
                BoardCommand::InsertRow { row: new_row },
                BoardCommand::InsertRow { row: new_row },
                BoardCommand::InsertColumn {
                    column: Uuid::new_v4(),
                },
            ],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::Rejected(IndexError::DuplicateRow(id)) if id == new_row
    ));

    let stored = service.get_board(board.board_uuid).unwrap();
    assert_eq!(stored.version, 0);
    assert_eq!(stored.index, board.index);
}

#[test]
fn apply_all_commits_batch_as_one_version() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 1, 1).unwrap();
    let row = board.index.rows()[0];
    let column = board.index.columns()[0];
    let item = Uuid::new_v4();

    let outcome = service
        .apply_all(
            board.board_uuid,
            &[
                BoardCommand::InsertItem { item, row, column },
                BoardCommand::InsertRow {
                    row: Uuid::new_v4(),
                },
                BoardCommand::DeleteRow { row },
            ],
        )
        .unwrap()
        .expect("non-empty batch returns an outcome");
    assert_eq!(outcome.board.version, 1);
    assert_eq!(outcome.removed_items, vec![item]);
    assert_eq!(outcome.board.index.cell_index(), &[0]);

    let stored = service.get_board(board.board_uuid).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.index, outcome.board.index);

    assert!(service.apply_all(board.board_uuid, &[]).unwrap().is_none());
    assert_eq!(service.get_board(board.board_uuid).unwrap().version, 1);
}

/// Repository whose first save loses a race: another writer saves the
/// currently stored layout just before the wrapped save runs.
struct RacingRepo<'conn> {
    inner: SqliteBoardRepository<'conn>,
    raced: Cell<bool>,
}

impl BoardRepository for RacingRepo<'_> {
    fn create_board(
        &self,
        display_name: &str,
        index: &BoardIndex,
    ) -> BoardRepoResult<StoredBoard> {
        self.inner.create_board(display_name, index)
    }

    fn load_board(&self, board_uuid: BoardId) -> BoardRepoResult<Option<StoredBoard>> {
        self.inner.load_board(board_uuid)
    }

    fn list_boards(&self) -> BoardRepoResult<Vec<StoredBoard>> {
        self.inner.list_boards()
    }

    fn save_board(
        &self,
        board_uuid: BoardId,
        index: &BoardIndex,
        expected_version: i64,
    ) -> BoardRepoResult<i64> {
        if !self.raced.replace(true) {
            let current = self
                .inner
                .load_board(board_uuid)?
                .ok_or(BoardRepoError::BoardNotFound(board_uuid))?;
            self.inner
                .save_board(board_uuid, &current.index, current.version)?;
        }
        self.inner.save_board(board_uuid, index, expected_version)
    }

    fn rename_board(&self, board_uuid: BoardId, display_name: &str) -> BoardRepoResult<()> {
        self.inner.rename_board(board_uuid, display_name)
    }

    fn delete_board(&self, board_uuid: BoardId) -> BoardRepoResult<()> {
        self.inner.delete_board(board_uuid)
    }
}

#[test]
fn concurrent_save_surfaces_version_conflict_and_keeps_other_write() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(RacingRepo {
        inner: SqliteBoardRepository::try_new(&conn).unwrap(),
        raced: Cell::new(true),
    });
    let board = service.create_board("Board", 1, 1).unwrap();
    let row = board.index.rows()[0];
    let column = board.index.columns()[0];

    let racing = BoardService::new(RacingRepo {
        inner: SqliteBoardRepository::try_new(&conn).unwrap(),
        raced: Cell::new(false),
    });
    let err = racing
        .apply(
            board.board_uuid,
            &BoardCommand::InsertItem {
                item: Uuid::new_v4(),
                row,
                column,
            },
        )
        .unwrap_err();
    match err {
        BoardServiceError::VersionConflict {
            board_uuid,
            expected,
            actual,
        } => {
            assert_eq!(board_uuid, board.board_uuid);
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = service.get_board(board.board_uuid).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.index, board.index);
    assert_eq!(stored.index.item_count(), 0);
}

#[test]
fn rename_and_delete_board() {
    let conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    let board = service.create_board("Board", 1, 1).unwrap();

    service.rename_board(board.board_uuid, " Renamed ").unwrap();
    assert_eq!(
        service.get_board(board.board_uuid).unwrap().display_name,
        "Renamed"
    );

    service.delete_board(board.board_uuid).unwrap();
    assert!(matches!(
        service.get_board(board.board_uuid),
        Err(BoardServiceError::BoardNotFound(_))
    ));
    assert!(service.list_boards().unwrap().is_empty());
}
