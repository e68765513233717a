//! Structured logging for cache writer targets.

use tracing::{error, info, warn, Span};

/// Logs lifecycle events of one target within one run, always tagged with
/// the run id and the target key.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    target: String,
}

impl RunLogger {
    pub fn new(run_id: &str, target: impl ToString) -> Self {
        Self {
            run_id: run_id.to_string(),
            target: target.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, target_key = %self.target, "Target started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, target_key = %self.target, "Target progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, target_key = %self.target, "Target warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, target_key = %self.target, "Target error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, target_key = %self.target, "Target completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Span carrying the run id and target key.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("cache_target", run_id = %self.run_id, target_key = %self.target)
    }
}
