//! Shared fixtures for router tests: in-memory stores, a mocked LLM provider
//! and a cookie-carrying client.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use trend_api::{create_router, ApiConfig, AppState};
use trend_firestore::{MemoryStore, TrendCacheStore, UserStore};
use trend_llm::{IdeaGenerator, LlmClient, LlmConfig};
use trend_models::{
    AnalysisDocument, AnalysisOutcome, CachedRegionDocument, ContentType, RegionCode, User,
    VideoBreakdown, VideoRecord,
};
use wiremock::MockServer;

pub const SECRET: &str = "router-test-secret-key-0123456789abcdef";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        secret_key: SECRET.to_string(),
        ..ApiConfig::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub llm: MockServer,
}

impl TestApp {
    pub async fn new() -> Self {
        let llm = MockServer::start().await;
        let client = LlmClient::new(LlmConfig {
            api_key: "gsk_test".to_string(),
            base_url: llm.uri(),
            timeout: Duration::from_secs(5),
            ..LlmConfig::default()
        })
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::in_memory(test_config(), store.clone(), IdeaGenerator::new(client));
        Self {
            router: create_router(state, None),
            store,
            llm,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookies: BTreeMap::new(),
        }
    }

    pub async fn seed_document(&self, doc: CachedRegionDocument) {
        self.store.upsert(&doc).await.unwrap();
    }

    pub async fn seed_user(&self, username: &str, password: &str) -> User {
        let hash = trend_api::auth::hash_password(password).unwrap();
        let user = User::new(username, format!("{username}@example.com"), "Test", "User", hash);
        self.store.create_user(&user).await.unwrap();
        user
    }
}

/// Replays cookies between requests like a browser would.
pub struct TestClient {
    router: Router,
    pub cookies: BTreeMap<String, String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body), &[]).await
    }

    /// POST echoing the `csrftoken` cookie in `X-CSRFToken`.
    pub async fn post_csrf(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send_csrf(Method::POST, uri, body).await
    }

    pub async fn send_csrf(&mut self, method: Method, uri: &str, body: Value) -> TestResponse {
        let token = self.cookies.get("csrftoken").cloned().unwrap_or_default();
        self.send(method, uri, Some(body), &[("x-csrftoken", token.as_str())])
            .await
    }

    pub async fn send(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header("cookie", cookie);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        self.store_cookies(&headers);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all("set-cookie") {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
}

pub fn region(code: &str) -> RegionCode {
    RegionCode::parse(code).unwrap()
}

pub fn video(id: &str) -> VideoRecord {
    VideoRecord {
        video_id: Some(id.to_string()),
        title: Some(format!("Video {id}")),
        description: Some("desc".to_string()),
        thumbnail_url: format!("https://i.ytimg.com/vi/{id}/default.jpg"),
        channel_title: Some("Channel".to_string()),
        view_count: Some("1000".to_string()),
        published_text: Some("2 days ago".to_string()),
    }
}

pub fn analysis() -> AnalysisDocument {
    AnalysisDocument {
        dominant_theme: "Gaming challenges".to_string(),
        emerging_trend: "Cozy cooking".to_string(),
        video_breakdowns: (0..5)
            .map(|i| VideoBreakdown {
                title: format!("Video {i}"),
                format_type: "challenge".to_string(),
                success_factor: "stakes".to_string(),
                adaptable_angle: "budget version".to_string(),
            })
            .collect(),
    }
}

pub fn document(
    country: &str,
    content_type: Option<ContentType>,
    ids: &[&str],
    outcome: AnalysisOutcome,
    updated_at: DateTime<Utc>,
) -> CachedRegionDocument {
    CachedRegionDocument::new(
        region(country),
        content_type,
        ids.iter().map(|id| video(id)).collect(),
        outcome,
        updated_at,
    )
}

pub fn profile_body() -> Value {
    json!({
        "primary_category": "Gaming",
        "ideal_creator": "MrBeast",
        "budget": "low",
        "resources": "phone, laptop",
        "video_style": "vlog"
    })
}

/// Chat completion reply wrapping `content` as the assistant message.
pub fn completion(content: Value) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}]
    })
}

pub fn ideas_reply() -> Value {
    completion(json!({
        "ideas": (0..5).map(|i| json!({
            "title": format!("Idea {i}"),
            "short_description": format!("Description {i}")
        })).collect::<Vec<_>>()
    }))
}

pub fn plan_reply() -> Value {
    completion(json!({
        "video_title": "Budget Challenge",
        "video_description": "We try it on a budget.",
        "hook": "Can you win with $10?",
        "intro": "Today we find out.",
        "main_content": ["Setup", "Round one", "Round two", "Finale"],
        "outro": "That was wild.",
        "call_to_action": "Subscribe for more.",
        "thumbnail_text": "$10 CHALLENGE",
        "hashtags": "#gaming #challenge"
    }))
}
