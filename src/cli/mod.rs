//! Subcommand entry points.
//!
//! `chat` runs the interactive assistant; the others call the to-do store
//! directly so the list can be inspected or scripted without a model.

pub mod add;
pub mod chat;
pub mod delete;
pub mod list;
pub mod search;

use std::io::Write;

use crate::todo::Todo;

/// Print to-dos one per line, or a note when there are none.
pub(crate) fn print_todos(out: &mut impl Write, todos: &[Todo]) -> std::io::Result<()> {
    if todos.is_empty() {
        writeln!(out, "No to-dos.")?;
        return Ok(());
    }
    for todo in todos {
        writeln!(out, "  {:>4}  {}", todo.id, todo.text)?;
    }
    Ok(())
}
