#![allow(dead_code)]

use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use todo_chat::llm::{ChatModel, ChatRequest, LlmError, ModelReply, ToolCall};
use todo_chat::tools::TodoTools;

/// Open a fresh in-memory database with the schema applied.
pub fn test_db() -> Connection {
    todo_chat::db::open_memory_database().unwrap()
}

/// Dispatch table over a fresh in-memory database, plus a handle to inspect it.
pub fn test_tools() -> (TodoTools, Arc<Mutex<Connection>>) {
    let db = Arc::new(Mutex::new(test_db()));
    (TodoTools::new(Arc::clone(&db)), db)
}

/// A model that plays back canned replies in order and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, LlmError>>>,
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Parse("script exhausted".into())))
    }
}

pub fn text(reply: &str) -> Result<ModelReply, LlmError> {
    Ok(ModelReply {
        text: Some(reply.to_string()),
        tool_calls: vec![],
    })
}

pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> Result<ModelReply, LlmError> {
    Ok(ModelReply {
        text: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
    })
}
