//! `OpenAI` Chat Completions client.
//!
//! Non-streaming: one request per turn, function calls read from the first choice.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::error::{LlmError, Result};
use super::{ChatModel, ChatRequest, FunctionDeclaration, Message, ModelReply, ToolCall};

/// Endpoint used when no `base_url` is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat model backed by the `OpenAI` API or a compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChatModel {
    /// Create a client for an OpenAI-compatible endpoint (e.g. a local server).
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::ApiKeyMissing);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

// Request types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API sends and expects them.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: FunctionDeclaration,
}

fn function_type() -> String {
    "function".to_string()
}

// Response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

/// Convert our transcript to the wire message format.
fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
    messages
        .iter()
        .map(|msg| match msg {
            Message::System(text) => OpenAiMessage {
                role: "system",
                content: Some(text.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::User(text) => OpenAiMessage {
                role: "user",
                content: Some(text.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let tool_calls = if tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        tool_calls
                            .iter()
                            .map(|call| OpenAiToolCall {
                                id: call.id.clone(),
                                call_type: function_type(),
                                function: OpenAiFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.to_string(),
                                },
                            })
                            .collect(),
                    )
                };
                OpenAiMessage {
                    role: "assistant",
                    content: content.clone(),
                    tool_calls,
                    tool_call_id: None,
                }
            }
            Message::Tool {
                tool_call_id,
                content,
            } => OpenAiMessage {
                role: "tool",
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(tool_call_id.clone()),
            },
        })
        .collect()
}

/// Convert function declarations to the tools format.
fn convert_tools(functions: &[FunctionDeclaration]) -> Option<Vec<OpenAiTool>> {
    if functions.is_empty() {
        return None;
    }
    Some(
        functions
            .iter()
            .map(|f| OpenAiTool {
                tool_type: "function",
                function: f.clone(),
            })
            .collect(),
    )
}

/// Pull text and function calls out of the first choice.
fn parse_reply(response: OpenAiResponse) -> Result<ModelReply> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("response contained no choices".into()))?;

    tracing::debug!(finish_reason = ?choice.finish_reason, "model replied");

    let text = choice.message.content.filter(|t| !t.trim().is_empty());

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| -> Result<ToolCall> {
            let arguments = if call.function.arguments.trim().is_empty() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    LlmError::Parse(format!(
                        "arguments for {} are not valid JSON: {e}",
                        call.function.name
                    ))
                })?
            };
            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ModelReply { text, tool_calls })
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::ApiKeyMissing)?,
        );

        let body = OpenAiRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages: convert_messages(&request.messages),
            tools: convert_tools(&request.functions),
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(url = %url, messages = body.messages.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: OpenAiResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Parse(e.to_string()))?;

        parse_reply(parsed)
    }
}
