//! Chat model abstraction with function calling.
//!
//! [`ChatModel`] is the seam between the chat loop and a hosted model.
//! [`openai::OpenAiChatModel`] talks to any OpenAI-compatible Chat Completions
//! endpoint; [`session::ChatSession`] keeps the running transcript.

pub mod error;
pub mod openai;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{LlmError, Result};
pub use session::ChatSession;

/// One message in the conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// The result of running one function call, keyed by the call's id.
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A function the model may call: name, description, and JSON Schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Everything needed for one completion call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    pub functions: Vec<FunctionDeclaration>,
}

/// What the model said back: optional text and zero or more function calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn wants_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A hosted chat model that supports function calling.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &'static str;

    /// Run one non-streaming completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply>;
}
