//! Query wrappers for the `todos` table.
//!
//! Four operations, each a single parameterized statement: [`create_todo`],
//! [`list_todos`], [`search_todos`] and [`delete_todo`]. There is no update.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::Todo;

/// Insert a new to-do and return it with its assigned id.
pub fn create_todo(conn: &Connection, text: &str) -> Result<Todo> {
    let text = text.trim();
    if text.is_empty() {
        bail!("to-do text must not be empty");
    }

    conn.execute("INSERT INTO todos (text) VALUES (?1)", params![text])?;
    let id = conn.last_insert_rowid();

    tracing::info!(id, "to-do created");
    Ok(Todo {
        id,
        text: text.to_string(),
    })
}

/// Return every to-do, oldest first.
pub fn list_todos(conn: &Connection) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare("SELECT id, text FROM todos ORDER BY id")?;
    let todos = stmt
        .query_map([], Todo::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = todos.len(), "listed to-dos");
    Ok(todos)
}

/// Case-insensitive substring search over to-do text.
///
/// `instr` is used instead of `LIKE` so `%` and `_` in the query match literally.
/// Case is folded with `fold_case` (see [`crate::db::register_functions`]), so
/// non-ASCII letters compare case-insensitively too. An empty query matches everything.
pub fn search_todos(conn: &Connection, query: &str) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare(
        "SELECT id, text FROM todos WHERE instr(fold_case(text), fold_case(?1)) > 0 ORDER BY id",
    )?;
    let todos = stmt
        .query_map(params![query], Todo::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(query, count = todos.len(), "searched to-dos");
    Ok(todos)
}

/// Delete a to-do by id, returning the removed row.
///
/// Fails with `todo not found: <id>` when no row has that id.
pub fn delete_todo(conn: &mut Connection, id: i64) -> Result<Todo> {
    let tx = conn.transaction()?;

    let Some(todo) = tx
        .query_row(
            "SELECT id, text FROM todos WHERE id = ?1",
            params![id],
            Todo::from_row,
        )
        .optional()?
    else {
        bail!("todo not found: {id}");
    };

    tx.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
    tx.commit()?;

    tracing::info!(id, "to-do deleted");
    Ok(todo)
}
