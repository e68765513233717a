//! Cached trend reads.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info};
use trend_models::{CachedRegionDocument, ContentType, RegionCode, VideoRecord};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// `GET /api/analyze/`: cached trending videos for a region.
///
/// Returns the concatenated `data` of every fresh document for the region,
/// 202 if documents exist but all are stale, 404 if none exist.
pub async fn analyze_trends(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> ApiResult<Json<Vec<VideoRecord>>> {
    let (country, content_type) = parse_region_query(&query)?;

    let docs = state
        .trends
        .load_region(&country, content_type)
        .await
        .map_err(|e| {
            error!(country = %country, error = %e, "Failed to load cached trends");
            metrics::record_cache_read("error");
            ApiError::error_body(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving cached data.")
        })?;

    if docs.is_empty() {
        metrics::record_cache_read("missing");
        return Err(ApiError::message_body(
            StatusCode::NOT_FOUND,
            format!("No trending data available for {}.", country),
        ));
    }

    let total = docs.len();
    let data = fresh_data(docs, state.config.staleness_chrono());

    let Some(data) = data else {
        info!(country = %country, documents = total, "Cached trends are stale");
        metrics::record_cache_read("stale");
        return Err(ApiError::message_body(
            StatusCode::ACCEPTED,
            format!(
                "Trending data for {} is being refreshed or not yet available.",
                country
            ),
        ));
    };

    debug!(country = %country, videos = data.len(), "Serving cached trends");
    metrics::record_cache_read("fresh");
    Ok(Json(data))
}

/// Concatenated data of the fresh documents, or `None` if every one is stale.
///
/// `docs` arrive ordered by document id, which fixes the output order.
fn fresh_data(
    docs: Vec<CachedRegionDocument>,
    window: chrono::Duration,
) -> Option<Vec<VideoRecord>> {
    let now = Utc::now();
    let fresh: Vec<CachedRegionDocument> = docs
        .into_iter()
        .filter(|doc| doc.is_fresh(window, now))
        .collect();

    if fresh.is_empty() {
        return None;
    }
    Some(fresh.into_iter().flat_map(|doc| doc.data).collect())
}

/// Validate `country` and optional `type` query parameters.
pub(crate) fn parse_region_query(
    query: &AnalyzeQuery,
) -> ApiResult<(RegionCode, Option<ContentType>)> {
    let raw = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            ApiError::error_body(
                StatusCode::BAD_REQUEST,
                "Missing required query parameter: country",
            )
        })?;

    let country = RegionCode::parse(raw)
        .map_err(|e| ApiError::error_body(StatusCode::BAD_REQUEST, e.to_string()))?;

    let content_type = parse_content_type(query.content_type.as_deref())?;
    Ok((country, content_type))
}

pub(crate) fn parse_content_type(raw: Option<&str>) -> ApiResult<Option<ContentType>> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t
            .parse::<ContentType>()
            .map(Some)
            .map_err(|e| ApiError::error_body(StatusCode::BAD_REQUEST, e.to_string())),
        None => Ok(None),
    }
}
