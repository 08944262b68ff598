//! CLI `delete` command.

use anyhow::Result;

use crate::config::TodoChatConfig;

/// Delete a to-do by id. An unknown id is an error.
pub fn delete(config: &TodoChatConfig, id: i64) -> Result<()> {
    let mut conn = crate::db::open_database(config.resolved_db_path())?;
    let todo = crate::todo::store::delete_todo(&mut conn, id)?;
    println!("Deleted {todo}");
    Ok(())
}
