use anyhow::Result;

use crate::config::TodoChatConfig;

/// Add a to-do and print its id.
pub fn add(config: &TodoChatConfig, text: &str) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let todo = crate::todo::store::create_todo(&conn, text)?;
    println!("Added {todo}");
    Ok(())
}
