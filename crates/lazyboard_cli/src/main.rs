//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lazyboard_core` linkage.
//! - Run one scripted board session against an in-memory DB.
//! - Keep output deterministic apart from generated identifiers.

use lazyboard_core::db::open_db_in_memory;
use lazyboard_core::{BoardCommand, BoardIndex, BoardService, SqliteBoardRepository};
use std::error::Error;
use std::process::ExitCode;
use uuid::Uuid;

fn main() -> ExitCode {
    println!("lazyboard_core ping={}", lazyboard_core::ping());
    println!("lazyboard_core version={}", lazyboard_core::core_version());
    match run_session() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("session failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_session() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn)?);
    let board = service.create_board("smoke", 2, 3)?;
    let rows = board.index.rows().to_vec();
    let columns = board.index.columns().to_vec();
    let (x, y) = (Uuid::new_v4(), Uuid::new_v4());

    let script = [
        BoardCommand::InsertItem {
            item: x,
            row: rows[0],
            column: columns[0],
        },
        BoardCommand::InsertItem {
            item: y,
            row: rows[1],
            column: columns[2],
        },
        BoardCommand::MoveItem {
            item: x,
            row: rows[1],
            column: columns[2],
            rank: 0,
        },
        BoardCommand::DeleteRow { row: rows[1] },
    ];

    for command in &script {
        let outcome = service.apply(board.board_uuid, command)?;
        println!(
            "op={} version={} removed={} cell_index={:?}",
            command.name(),
            outcome.board.version,
            outcome.removed_items.len(),
            outcome.board.index.cell_index()
        );
        print_grid(&outcome.board.index);
    }
    Ok(())
}

fn print_grid(index: &BoardIndex) {
    for (row, cells) in index.to_grid().iter().enumerate() {
        let counts = cells.iter().map(Vec::len).collect::<Vec<_>>();
        println!("  row {row}: {counts:?}");
    }
}
