//! Conversation state for one interactive run.

use super::error::Result;
use super::{ChatModel, ChatRequest, FunctionDeclaration, Message, ModelReply};

/// Output of one function call, ready to be sent back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: String,
}

/// A chat session: the model handle, the declared functions, and the transcript so far.
pub struct ChatSession<M> {
    model: M,
    model_name: String,
    max_tokens: u32,
    functions: Vec<FunctionDeclaration>,
    history: Vec<Message>,
}

impl<M: ChatModel> ChatSession<M> {
    pub fn new(
        model: M,
        model_name: impl Into<String>,
        max_tokens: u32,
        system_prompt: &str,
        functions: Vec<FunctionDeclaration>,
    ) -> Self {
        let mut history = Vec::new();
        if !system_prompt.trim().is_empty() {
            history.push(Message::System(system_prompt.to_string()));
        }
        Self {
            model,
            model_name: model_name.into(),
            max_tokens,
            functions,
            history,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Mark the current end of the transcript.
    pub fn checkpoint(&self) -> usize {
        self.history.len()
    }

    /// Drop everything appended after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        if checkpoint < self.history.len() {
            tracing::debug!(
                dropped = self.history.len() - checkpoint,
                "rolling back chat history"
            );
            self.history.truncate(checkpoint);
        }
    }

    /// Send a user prompt and record the model's reply.
    pub async fn send_user(&mut self, text: &str) -> Result<ModelReply> {
        self.history.push(Message::User(text.to_string()));
        self.complete().await
    }

    /// Send function results back for the calls in the last reply.
    pub async fn send_tool_results(&mut self, results: Vec<ToolResult>) -> Result<ModelReply> {
        self.record_tool_results(results);
        self.complete().await
    }

    /// Append function results to the transcript without calling the model.
    pub fn record_tool_results(&mut self, results: Vec<ToolResult>) {
        self.history
            .extend(results.into_iter().map(|r| Message::Tool {
                tool_call_id: r.tool_call_id,
                content: r.content,
            }));
    }

    async fn complete(&mut self) -> Result<ModelReply> {
        let request = ChatRequest {
            model: self.model_name.clone(),
            max_tokens: self.max_tokens,
            messages: self.history.clone(),
            functions: self.functions.clone(),
        };

        tracing::debug!(
            provider = self.model.name(),
            model = %self.model_name,
            messages = request.messages.len(),
            "calling chat model"
        );
        let reply = self.model.complete(&request).await?;

        self.history.push(Message::Assistant {
            content: reply.text.clone(),
            tool_calls: reply.tool_calls.clone(),
        });
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, ToolCall};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies "ok" and remembers how many messages each request carried.
    struct EchoModel {
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ModelReply> {
            self.seen.lock().unwrap().push(request.messages.len());
            Ok(ModelReply {
                text: Some("ok".into()),
                tool_calls: vec![],
            })
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn complete(&self, _request: &ChatRequest) -> Result<ModelReply> {
            Err(LlmError::Parse("boom".into()))
        }
    }

    fn echo() -> EchoModel {
        EchoModel {
            seen: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn system_prompt_seeds_history() {
        let session = ChatSession::new(echo(), "m", 64, "be nice", vec![]);
        assert_eq!(session.history(), &[Message::System("be nice".into())]);

        let session = ChatSession::new(echo(), "m", 64, "  ", vec![]);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn send_user_records_both_sides() {
        let mut session = ChatSession::new(echo(), "m", 64, "sys", vec![]);
        let reply = session.send_user("hello").await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("ok"));
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[1], Message::User("hello".into()));
        assert_eq!(*session.model.seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn tool_results_follow_the_call() {
        let mut session = ChatSession::new(echo(), "m", 64, "", vec![]);
        session.history.push(Message::Assistant {
            content: None,
            tool_calls: vec![ToolCall {
                id: "c1".into(),
                name: "list_todos".into(),
                arguments: serde_json::json!({}),
            }],
        });
        session
            .send_tool_results(vec![ToolResult {
                tool_call_id: "c1".into(),
                content: "[]".into(),
            }])
            .await
            .unwrap();

        assert!(matches!(
            &session.history()[1],
            Message::Tool { tool_call_id, .. } if tool_call_id == "c1"
        ));
    }

    #[test]
    fn record_tool_results_skips_the_model() {
        let mut session = ChatSession::new(echo(), "m", 64, "sys", vec![]);
        session.record_tool_results(vec![ToolResult {
            tool_call_id: "c9".into(),
            content: r#"{"error":"function call limit reached"}"#.into(),
        }]);

        assert_eq!(session.history().len(), 2);
        assert!(session.model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rollback_discards_failed_turn() {
        let mut session = ChatSession::new(FailingModel, "m", 64, "sys", vec![]);
        let checkpoint = session.checkpoint();
        assert!(session.send_user("hello").await.is_err());
        assert_eq!(session.history().len(), 2);

        session.rollback(checkpoint);
        assert_eq!(session.history().len(), 1);
    }
}
