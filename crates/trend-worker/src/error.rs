//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Target timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Target task aborted: {0}")]
    TaskAborted(String),

    #[error("Firestore error: {0}")]
    Firestore(#[from] trend_firestore::FirestoreError),

    #[error("Model error: {0}")]
    Model(#[from] trend_models::ModelError),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn analysis_failed(msg: impl Into<String>) -> Self {
        Self::AnalysisFailed(msg.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::ConfigError(_) => "config",
            WorkerError::AnalysisFailed(_) => "analysis",
            WorkerError::Timeout(_) => "timeout",
            WorkerError::TaskAborted(_) => "aborted",
            WorkerError::Firestore(_) => "store",
            WorkerError::Model(_) => "model",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(WorkerError::analysis_failed("bad reply").kind(), "analysis");
        assert_eq!(WorkerError::Timeout(Duration::from_secs(1)).kind(), "timeout");
        assert_eq!(
            WorkerError::TaskAborted("panicked".to_string()).kind(),
            "aborted"
        );
    }
}
