use anyhow::Result;

use crate::config::TodoChatConfig;

/// Print every to-do.
pub fn list(config: &TodoChatConfig) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let todos = crate::todo::store::list_todos(&conn)?;
    super::print_todos(&mut std::io::stdout().lock(), &todos)?;
    Ok(())
}
