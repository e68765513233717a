//! Firestore client and repository tests against a mock REST endpoint.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trend_models::{AnalysisOutcome, CachedRegionDocument, ContentType, RegionCode, User};

use crate::account_repo::FirestoreUserStore;
use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreError;
use crate::retry::RetryConfig;
use crate::store::{TrendCacheStore, UserStore};
use crate::trend_repo::FirestoreTrendStore;

const DOCS: &str = "/v1/projects/test-project/databases/test-db/documents";

fn test_config() -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "test-db".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
        emulator_host: None,
    }
}

fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::with_endpoint(test_config(), format!("{}{}", server.uri(), DOCS), "owner")
        .unwrap()
}

fn region_doc_json(id: &str, country: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/test-project/databases/test-db/documents/trending_data_grouped/{}", id),
        "fields": {
            "country": {"stringValue": country},
            "data": {"arrayValue": {"values": [{"mapValue": {"fields": {
                "videoId": {"stringValue": id},
                "title": {"stringValue": "t"},
                "description": {"nullValue": null},
                "thumbnail": {"stringValue": ""},
                "channelTitle": {"stringValue": "c"},
                "viewCount": {"stringValue": "1"},
                "publishedText": {"stringValue": "1 day ago"}
            }}}]}},
            "ai_analysis": {"mapValue": {"fields": {"error": {"stringValue": "n/a"}}}},
            "updated_at": {"timestampValue": updated_at}
        }
    })
}

#[tokio::test]
async fn test_get_missing_document_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/trending_data_grouped/US", DOCS)))
        .and(header("authorization", "Bearer owner"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": {"code": 404}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestoreTrendStore::new(client(&server), "trending_data_grouped");
    let found = store
        .get(&RegionCode::parse("US").unwrap(), None)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_upsert_patches_full_document_with_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/trending_data_grouped/US_music", DOCS)))
        .and(body_partial_json(json!({
            "fields": {
                "country": {"stringValue": "US"},
                "type": {"stringValue": "music"},
                "updated_at": {"timestampValue": "2024-05-01T12:00:00Z"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x", "fields": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestoreTrendStore::new(client(&server), "trending_data_grouped");
    let doc = CachedRegionDocument::new(
        RegionCode::parse("US").unwrap(),
        Some(ContentType::Music),
        vec![],
        AnalysisOutcome::failed("n/a"),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    );
    store.upsert(&doc).await.unwrap();
}

#[tokio::test]
async fn test_load_region_queries_by_country_and_sorts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCS)))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{"collectionId": "trending_data_grouped"}],
                "where": {"fieldFilter": {
                    "field": {"fieldPath": "country"},
                    "op": "EQUAL",
                    "value": {"stringValue": "US"}
                }}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": region_doc_json("US_music", "US", "2024-05-01T12:00:00.123456Z"), "readTime": "2024-05-01T12:00:01Z"},
            {"document": region_doc_json("US", "US", "2024-05-01T11:00:00Z"), "readTime": "2024-05-01T12:00:01Z"},
            {"readTime": "2024-05-01T12:00:01Z"}
        ])))
        .mount(&server)
        .await;

    let store = FirestoreTrendStore::new(client(&server), "trending_data_grouped");
    let docs = store
        .load_region(&RegionCode::parse("us").unwrap(), None)
        .await
        .unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].data[0].video_id.as_deref(), Some("US"));
    assert_eq!(docs[1].data[0].video_id.as_deref(), Some("US_music"));
    assert!(docs[0].ai_analysis.is_sentinel());
    assert!(docs[0].data[0].description.is_none());
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    let doc_path = format!("{}/users/alice", DOCS);

    Mock::given(method("GET"))
        .and(path(doc_path.clone()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let user = User::new("alice", "a@example.com", "Alice", "", "hash");
    let mut fields = crate::types::to_fields(&user).unwrap();
    crate::types::mark_timestamp(&mut fields, "date_joined");
    Mock::given(method("GET"))
        .and(path(doc_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "users/alice", "fields": fields})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestoreUserStore::new(client(&server));
    let loaded = store.get_user("alice").await.unwrap().unwrap();
    assert_eq!(loaded.id, user.id);
    assert_eq!(loaded.email, "a@example.com");
}

#[tokio::test]
async fn test_create_conflict_maps_to_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/users", DOCS)))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestoreUserStore::new(client(&server));
    let err = store
        .create_user(&User::new("alice", "", "", "", "hash"))
        .await
        .unwrap_err();
    assert!(matches!(err, FirestoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_permission_denied_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/trending_data_grouped", DOCS)))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = FirestoreTrendStore::new(client(&server), "trending_data_grouped");
    let err = store.ping().await.unwrap_err();
    assert!(matches!(err, FirestoreError::PermissionDenied(_)));
}
