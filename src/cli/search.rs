use anyhow::Result;

use crate::config::TodoChatConfig;

/// Print to-dos whose text contains `query`, ignoring case.
pub fn search(config: &TodoChatConfig, query: &str) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let todos = crate::todo::store::search_todos(&conn, query)?;

    if !todos.is_empty() {
        println!("Found {} to-do(s) matching {query:?}", todos.len());
    }
    super::print_todos(&mut std::io::stdout().lock(), &todos)?;
    Ok(())
}
