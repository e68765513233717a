//! Content idea handlers.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use trend_firestore::FirestoreError;
use trend_models::{
    validation_messages, AnalysisDocument, CreatorProfile, Idea, IdeaDetailsRequest, IdeaPlan,
    RegionCode,
};
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::trends::parse_content_type;
use crate::metrics;
use crate::state::AppState;

/// Body of `POST /api/suggest-ideas/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestIdeasRequest {
    #[serde(flatten)]
    pub profile: CreatorProfile,

    /// Steer ideas with this region's cached analysis.
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdeasResponse {
    pub ideas: Vec<Idea>,
}

#[derive(Debug, Serialize)]
pub struct IdeaDetailsResponse {
    pub details: IdeaPlan,
}

/// `POST /api/suggest-ideas/`
pub async fn suggest_ideas(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SuggestIdeasRequest>,
) -> ApiResult<Json<IdeasResponse>> {
    if let Err(errors) = request.profile.validate() {
        return Err(missing_fields("Missing required fields", &errors));
    }

    let analysis = match request.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => Some(load_analysis(&state, raw, request.content_type.as_deref()).await?),
        None => None,
    };

    match state.ideas.list_ideas(&request.profile, analysis.as_ref()).await {
        Some(ideas) => {
            info!(
                category = %request.profile.primary_category,
                trend_steered = analysis.is_some(),
                "Generated content ideas"
            );
            metrics::record_idea_request("list", "success");
            Ok(Json(IdeasResponse { ideas }))
        }
        None => {
            metrics::record_idea_request("list", "failure");
            Err(ApiError::error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate or parse content ideas",
            ))
        }
    }
}

/// `POST /api/get-idea-details/`
pub async fn idea_details(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdeaDetailsRequest>,
) -> ApiResult<Json<IdeaDetailsResponse>> {
    if let Err(errors) = request.validate() {
        return Err(missing_fields(
            "Missing required fields for detailed idea",
            &errors,
        ));
    }

    match state.ideas.expand_idea(&request).await {
        Some(details) => {
            metrics::record_idea_request("details", "success");
            Ok(Json(IdeaDetailsResponse { details }))
        }
        None => {
            metrics::record_idea_request("details", "failure");
            Err(ApiError::error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate detailed content idea",
            ))
        }
    }
}

/// Cached analysis for a region; 404 when none is usable.
///
/// Without a content type the unscoped document is preferred. When it is
/// missing or holds the error sentinel, the first scoped document (by id)
/// with a real analysis is used instead.
async fn load_analysis(
    state: &AppState,
    raw_country: &str,
    raw_type: Option<&str>,
) -> ApiResult<AnalysisDocument> {
    let country = RegionCode::parse(raw_country)
        .map_err(|e| ApiError::error_body(StatusCode::BAD_REQUEST, e.to_string()))?;
    let content_type = parse_content_type(raw_type)?;

    let store_error = |e: FirestoreError| {
        error!(country = %country, error = %e, "Failed to load cached analysis");
        ApiError::error_body(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving cached data.")
    };

    let exact = state
        .trends
        .get(&country, content_type)
        .await
        .map_err(store_error)?
        .and_then(|doc| doc.ai_analysis.into_document());
    if let Some(analysis) = exact {
        return Ok(analysis);
    }

    if content_type.is_none() {
        let docs = state
            .trends
            .load_region(&country, None)
            .await
            .map_err(store_error)?;
        if let Some(analysis) = docs
            .into_iter()
            .find_map(|doc| doc.ai_analysis.into_document())
        {
            return Ok(analysis);
        }
    }

    warn!(country = %country, content_type = ?content_type, "No usable cached analysis");
    Err(ApiError::message_body(
        StatusCode::NOT_FOUND,
        format!("No trend analysis available for {}.", country),
    ))
}

/// 400 `{"error": msg, "fields": {field: [messages]}}`.
fn missing_fields(msg: &str, errors: &ValidationErrors) -> ApiError {
    let fields: BTreeMap<String, Vec<String>> = validation_messages(errors).into_iter().collect();
    ApiError::Reply(
        StatusCode::BAD_REQUEST,
        serde_json::json!({ "error": msg, "fields": fields }),
    )
}
