//! LLM error types.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM reply had no content")]
    EmptyReply,

    #[error("LLM reply was not valid JSON: {0}")]
    Parse(String),

    #[error("LLM reply failed validation: {0}")]
    Validation(String),
}

impl LlmError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Config(_) => "config",
            LlmError::Http(e) if e.is_timeout() => "timeout",
            LlmError::Http(_) => "http",
            LlmError::Status { .. } => "status",
            LlmError::EmptyReply => "empty",
            LlmError::Parse(_) => "parse",
            LlmError::Validation(_) => "validation",
        }
    }
}
