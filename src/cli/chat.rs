//! CLI `chat` command: wire config, database, and model into the prompt loop.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};

use crate::config::TodoChatConfig;
use crate::llm::openai::OpenAiChatModel;
use crate::llm::ChatSession;
use crate::tools::{self, TodoTools};

/// Start the interactive assistant on stdin/stdout.
pub async fn chat(config: &TodoChatConfig) -> Result<()> {
    let api_key = config.api_key()?;
    let model = OpenAiChatModel::with_base_url(api_key, &config.llm.base_url)
        .context("failed to create model client")?;

    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), model = %config.llm.model, "starting chat");

    let tools = TodoTools::new(Arc::new(Mutex::new(conn)));
    let mut session = ChatSession::new(
        model,
        &config.llm.model,
        config.llm.max_tokens,
        &config.llm.system_prompt,
        tools::declarations(),
    );

    let stdin = std::io::stdin();
    crate::chat::run_chat(
        &mut session,
        &tools,
        config.llm.max_tool_rounds,
        stdin.lock(),
        std::io::stdout(),
    )
    .await
}
