//! Cached region documents.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOutcome;
use crate::region::{ContentType, RegionCode};
use crate::video::VideoRecord;

/// Trending data and its analysis for one region (optionally one content type).
///
/// This is the only trend artifact the system persists. The cache writer
/// replaces it wholesale on every successful run for its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRegionDocument {
    pub country: RegionCode,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,

    pub data: Vec<VideoRecord>,

    pub ai_analysis: AnalysisOutcome,

    pub updated_at: DateTime<Utc>,
}

impl CachedRegionDocument {
    pub fn new(
        country: RegionCode,
        content_type: Option<ContentType>,
        data: Vec<VideoRecord>,
        ai_analysis: AnalysisOutcome,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            country,
            content_type,
            data,
            ai_analysis,
            updated_at,
        }
    }

    /// Storage key: `US` for the unscoped document, `US_music` when scoped.
    pub fn document_id(country: &RegionCode, content_type: Option<ContentType>) -> String {
        match content_type {
            Some(ct) => format!("{}_{}", country, ct),
            None => country.to_string(),
        }
    }

    /// Storage key of this document.
    pub fn id(&self) -> String {
        Self::document_id(&self.country, self.content_type)
    }

    /// True if `updated_at` is within `window` of `now`.
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.updated_at < window
    }
}
