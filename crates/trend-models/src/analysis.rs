//! LLM trend analysis models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of per-video breakdowns an analysis must contain.
pub const BREAKDOWN_COUNT: u64 = 5;

/// Why one trending video works and how a creator could adapt it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct VideoBreakdown {
    /// Title of the analyzed video
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    /// Format of the video (e.g. "challenge", "reaction", "tutorial")
    #[validate(length(min = 1, message = "format_type must not be empty"))]
    pub format_type: String,

    /// The main reason the video is trending
    #[validate(length(min = 1, message = "success_factor must not be empty"))]
    pub success_factor: String,

    /// How a small creator could adapt the idea
    #[validate(length(min = 1, message = "adaptable_angle must not be empty"))]
    pub adaptable_angle: String,
}

/// Analysis of a batch of trending videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct AnalysisDocument {
    /// The single theme shared by most of the trending videos
    #[validate(length(min = 1, message = "dominant_theme must not be empty"))]
    pub dominant_theme: String,

    /// A smaller pattern that is gaining momentum
    #[validate(length(min = 1, message = "emerging_trend must not be empty"))]
    pub emerging_trend: String,

    /// Exactly five per-video breakdowns
    #[validate(
        length(equal = 5, message = "video_breakdowns must contain exactly 5 entries"),
        nested
    )]
    pub video_breakdowns: Vec<VideoBreakdown>,
}

/// Result of an analysis request: the document or the sentinel error document.
///
/// Untagged so the failure variant is exactly `{"error": "..."}` on the wire
/// and in storage. Callers branch on the variant instead of on an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Failed { error: String },
    Ready(AnalysisDocument),
}

impl AnalysisOutcome {
    /// Build the sentinel error document.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed { error: msg.into() }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, AnalysisOutcome::Failed { .. })
    }

    /// The analysis, if this is not the sentinel.
    pub fn document(&self) -> Option<&AnalysisDocument> {
        match self {
            AnalysisOutcome::Ready(doc) => Some(doc),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    pub fn into_document(self) -> Option<AnalysisDocument> {
        match self {
            AnalysisOutcome::Ready(doc) => Some(doc),
            AnalysisOutcome::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Failed { error } => Some(error),
            AnalysisOutcome::Ready(_) => None,
        }
    }
}

impl From<AnalysisDocument> for AnalysisOutcome {
    fn from(doc: AnalysisDocument) -> Self {
        Self::Ready(doc)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_analysis() -> AnalysisDocument {
        AnalysisDocument {
            dominant_theme: "Big-budget challenges".to_string(),
            emerging_trend: "Low-fi cooking vlogs".to_string(),
            video_breakdowns: (1..=5)
                .map(|i| VideoBreakdown {
                    title: format!("Video {i}"),
                    format_type: "challenge".to_string(),
                    success_factor: "high stakes".to_string(),
                    adaptable_angle: "do it on a budget".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_analysis_passes() {
        assert!(sample_analysis().validate().is_ok());
    }

    #[test]
    fn test_breakdown_count_enforced() {
        let mut doc = sample_analysis();
        doc.video_breakdowns.pop();
        assert!(doc.validate().is_err());

        let mut doc = sample_analysis();
        doc.video_breakdowns.push(doc.video_breakdowns[0].clone());
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_nested_breakdown_fields_enforced() {
        let mut doc = sample_analysis();
        doc.video_breakdowns[2].success_factor.clear();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_sentinel_wire_shape() {
        let outcome = AnalysisOutcome::failed("LLM reply was not valid JSON");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, serde_json::json!({"error": "LLM reply was not valid JSON"}));

        let parsed: AnalysisOutcome = serde_json::from_value(value).unwrap();
        assert!(parsed.is_sentinel());
    }

    #[test]
    fn test_ready_outcome_is_plain_document() {
        let outcome = AnalysisOutcome::from(sample_analysis());
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("dominant_theme").is_some());
        assert!(value.get("error").is_none());

        let parsed: AnalysisOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.document(), Some(&sample_analysis()));
    }
}
