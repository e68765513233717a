//! `GET /api/analyze/` against in-memory cached documents.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use trend_models::{AnalysisOutcome, ContentType};

use common::{analysis, document, TestApp};

#[tokio::test]
async fn test_analyze_returns_stored_data_exactly() {
    let app = TestApp::new().await;
    let doc = document(
        "US",
        None,
        &["a", "b", "c"],
        analysis().into(),
        Utc::now() - Duration::minutes(10),
    );
    let expected = serde_json::to_value(&doc.data).unwrap();
    app.seed_document(doc).await;

    let response = app.client().get("/api/analyze/?country=US").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, expected);
}

#[tokio::test]
async fn test_analyze_without_trailing_slash_and_lowercase_country() {
    let app = TestApp::new().await;
    app.seed_document(document("GB", None, &["x"], analysis().into(), Utc::now()))
        .await;

    let response = app.client().get("/api/analyze?country=gb").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_stale_only_is_accepted_not_ready() {
    let app = TestApp::new().await;
    app.seed_document(document(
        "JP",
        None,
        &["a"],
        analysis().into(),
        Utc::now() - Duration::days(2),
    ))
    .await;

    let response = app.client().get("/api/analyze/?country=JP").await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(
        response.body,
        json!({"message": "Trending data for JP is being refreshed or not yet available."})
    );
}

#[tokio::test]
async fn test_analyze_mixed_returns_only_fresh_documents() {
    let app = TestApp::new().await;
    app.seed_document(document(
        "US",
        None,
        &["fresh-1", "fresh-2"],
        analysis().into(),
        Utc::now() - Duration::hours(2),
    ))
    .await;
    app.seed_document(document(
        "US",
        Some(ContentType::Music),
        &["stale-1"],
        AnalysisOutcome::failed("LLM error"),
        Utc::now() - Duration::days(3),
    ))
    .await;
    app.seed_document(document(
        "US",
        Some(ContentType::Now),
        &["fresh-3"],
        analysis().into(),
        Utc::now(),
    ))
    .await;

    let response = app.client().get("/api/analyze/?country=US").await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["videoId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["fresh-1", "fresh-2", "fresh-3"]);
}

#[tokio::test]
async fn test_analyze_type_scopes_to_one_document() {
    let app = TestApp::new().await;
    app.seed_document(document("US", None, &["all"], analysis().into(), Utc::now()))
        .await;
    app.seed_document(document(
        "US",
        Some(ContentType::Music),
        &["song"],
        analysis().into(),
        Utc::now(),
    ))
    .await;

    let response = app.client().get("/api/analyze/?country=US&type=music").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body[0]["videoId"], "song");
    assert_eq!(response.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_unknown_region_is_not_found() {
    let app = TestApp::new().await;
    let response = app.client().get("/api/analyze/?country=FR").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({"message": "No trending data available for FR."})
    );
}

#[tokio::test]
async fn test_analyze_requires_country() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client.get("/api/analyze/").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"error": "Missing required query parameter: country"})
    );

    let response = client.get("/api/analyze/?country=USA").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = TestApp::new().await;
    let mut client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("x-request-id"));

    let response = client.get("/ready").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["checks"]["store"]["status"], "ok");
}
