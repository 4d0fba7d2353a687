//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todo_core` linkage.
//! - Run one create/toggle/list pass on a throwaway in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use todo_core::db::open_db_in_memory;
use todo_core::{SqliteTodoRepository, TodoListViewModel, TodoService};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    match smoke_pass() {
        Ok(summary) => {
            println!("todo_core smoke={summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("todo_core smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_pass() -> Result<String, Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn)?);
    let mut list = TodoListViewModel::new(&service);

    let created = service.create_todo("smoke check", "")?;
    service.toggle_todo_completion(created.id)?;

    list.sync_updates();
    let counts = list.state().counts;
    Ok(format!(
        "ok total={} completed={} pending={}",
        counts.total, counts.completed, counts.pending
    ))
}
