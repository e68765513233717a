//! Idea endpoints against a mocked LLM provider.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::json;
use trend_models::{AnalysisOutcome, ContentType};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{analysis, document, ideas_reply, plan_reply, profile_body, TestApp};

#[tokio::test]
async fn test_suggest_ideas_returns_five_ideas() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ideas_reply()))
        .expect(1)
        .mount(&app.llm)
        .await;

    let response = app
        .client()
        .post("/api/suggest-ideas/", profile_body())
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let ideas = response.body["ideas"].as_array().unwrap();
    assert_eq!(ideas.len(), 5);
    assert_eq!(ideas[0]["title"], "Idea 0");
    assert_eq!(ideas[0]["short_description"], "Description 0");
}

#[tokio::test]
async fn test_suggest_ideas_empty_field_never_calls_llm() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ideas_reply()))
        .expect(0)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["budget"] = json!("");
    let response = app.client().post("/api/suggest-ideas/", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Missing required fields");
    assert!(response.body["fields"]["budget"].is_array());

    let mut body = profile_body();
    body.as_object_mut().unwrap().remove("video_style");
    let response = app.client().post("/api/suggest-ideas", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggest_ideas_rejects_invalid_json() {
    let app = TestApp::new().await;
    let response = app
        .client()
        .send(
            Method::POST,
            "/api/suggest-ideas/",
            None,
            &[("content-type", "application/json")],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"error": "Invalid JSON in request body"}));
}

#[tokio::test]
async fn test_suggest_ideas_country_without_analysis_is_not_found() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ideas_reply()))
        .expect(0)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["country"] = json!("US");
    let response = app.client().post("/api/suggest-ideas/", body.clone()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // A cached sentinel counts as no analysis
    app.seed_document(document(
        "US",
        None,
        &["a"],
        AnalysisOutcome::failed("Failed to parse LLM response"),
        Utc::now(),
    ))
    .await;
    let response = app.client().post("/api/suggest-ideas/", body).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggest_ideas_with_country_sends_cached_analysis() {
    let app = TestApp::new().await;
    app.seed_document(document("US", None, &["a"], analysis().into(), Utc::now()))
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Cozy cooking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ideas_reply()))
        .expect(1)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["country"] = json!("us");
    let response = app.client().post("/api/suggest-ideas/", body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ideas"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_suggest_ideas_with_country_uses_scoped_analysis() {
    let app = TestApp::new().await;
    app.seed_document(document(
        "US",
        Some(ContentType::Music),
        &["song"],
        analysis().into(),
        Utc::now(),
    ))
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Cozy cooking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ideas_reply()))
        .expect(2)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["country"] = json!("US");
    let response = app.client().post("/api/suggest-ideas/", body.clone()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ideas"].as_array().unwrap().len(), 5);

    // A sentinel in the unscoped document does not hide the scoped analysis
    app.seed_document(document(
        "US",
        None,
        &["a"],
        AnalysisOutcome::failed("LLM error"),
        Utc::now(),
    ))
    .await;
    let response = app.client().post("/api/suggest-ideas/", body.clone()).await;
    assert_eq!(response.status, StatusCode::OK);

    // An explicit type that has no document is still a miss
    body["type"] = json!("games");
    let response = app.client().post("/api/suggest-ideas/", body).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggest_ideas_bad_reply_is_server_error() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::completion(json!({
            "ideas": [{"title": "only one", "short_description": "d"}]
        }))))
        .mount(&app.llm)
        .await;

    let response = app
        .client()
        .post("/api/suggest-ideas/", profile_body())
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({"error": "Failed to generate or parse content ideas"})
    );
}

#[tokio::test]
async fn test_idea_details_returns_plan() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Budget speedrun"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_reply()))
        .expect(1)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["topic"] = json!("Budget speedrun");
    body["description"] = json!("Beat the game with a $10 setup");
    let response = app.client().post("/api/get-idea-details/", body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["details"]["video_title"], "Budget Challenge");
    assert_eq!(
        response.body["details"]["main_content"].as_array().unwrap().len(),
        4
    );
}

#[tokio::test]
async fn test_idea_details_missing_topic_never_calls_llm() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_reply()))
        .expect(0)
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["description"] = json!("something");
    let response = app.client().post("/api/get-idea-details/", body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Missing required fields for detailed idea"
    );
}

#[tokio::test]
async fn test_idea_details_provider_failure_is_server_error() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.llm)
        .await;

    let mut body = profile_body();
    body["topic"] = json!("t");
    body["short_description"] = json!("d");
    let response = app.client().post("/api/get-idea-details/", body).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({"error": "Failed to generate detailed content idea"})
    );
}
