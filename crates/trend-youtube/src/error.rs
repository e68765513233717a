//! Trending API error types.

use thiserror::Error;

pub type TrendingResult<T> = Result<T, TrendingError>;

#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Trending API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Undecodable trending response: {0}")]
    Decode(String),
}

impl TrendingError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TrendingError::Config(_) => "config",
            TrendingError::Http(e) if e.is_timeout() => "timeout",
            TrendingError::Http(_) => "http",
            TrendingError::Status { .. } => "status",
            TrendingError::Decode(_) => "decode",
        }
    }
}
