//! Model client error types.

/// Errors from talking to the chat model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// API key not configured.
    #[error("API key not configured")]
    ApiKeyMissing,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse API response.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, LlmError>;
