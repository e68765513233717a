//! Trend analysis of fetched videos.

use metrics::counter;
use tracing::{info, warn};
use trend_models::{AnalysisDocument, AnalysisOutcome, VideoRecord};

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::prompts::{schema_json, TREND_ANALYSIS};
use crate::reply::parse_validated;

/// Sentinel message when there is nothing to analyze.
pub const EMPTY_INPUT_ERROR: &str = "No video data to analyze";

/// Produces an [`AnalysisOutcome`] for a batch of trending videos.
#[derive(Clone)]
pub struct TrendAnalyzer {
    client: LlmClient,
    model: String,
    schema: String,
}

impl TrendAnalyzer {
    pub fn new(client: LlmClient) -> Self {
        let model = client.config().analysis_model.clone();
        Self {
            client,
            model,
            schema: schema_json::<AnalysisDocument>(),
        }
    }

    /// Analyze `videos`. Failures come back as the sentinel, never as `Err`.
    pub async fn analyze(&self, videos: &[VideoRecord]) -> AnalysisOutcome {
        if videos.is_empty() {
            return AnalysisOutcome::failed(EMPTY_INPUT_ERROR);
        }

        match self.try_analyze(videos).await {
            Ok(doc) => {
                info!(
                    template = %TREND_ANALYSIS.id(),
                    videos = videos.len(),
                    dominant_theme = %doc.dominant_theme,
                    "Trend analysis complete"
                );
                AnalysisOutcome::from(doc)
            }
            Err(e) => {
                counter!("trend_llm_invalid_replies_total", "operation" => TREND_ANALYSIS.name, "reason" => e.kind())
                    .increment(1);
                warn!(
                    template = %TREND_ANALYSIS.id(),
                    videos = videos.len(),
                    error = %e,
                    "Trend analysis failed, returning sentinel"
                );
                AnalysisOutcome::failed(e.to_string())
            }
        }
    }

    async fn try_analyze(&self, videos: &[VideoRecord]) -> LlmResult<AnalysisDocument> {
        let videos_json =
            serde_json::to_string(videos).map_err(|e| LlmError::Parse(e.to_string()))?;
        let messages =
            TREND_ANALYSIS.messages(&[("schema", &self.schema), ("videos", &videos_json)]);

        let raw = self
            .client
            .complete_json(TREND_ANALYSIS.name, &self.model, &messages)
            .await?;
        parse_validated(&raw)
    }
}
