//! In-memory stores for local development (`STORE_BACKEND=memory`) and tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use trend_models::{CachedRegionDocument, ContentType, RegionCode, Session, User};

use crate::error::{FirestoreError, FirestoreResult};
use crate::store::{SessionStore, TrendCacheStore, UserStore};

/// Process-local store implementing every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    trends: RwLock<BTreeMap<String, CachedRegionDocument>>,
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached region documents.
    pub async fn trend_count(&self) -> usize {
        self.trends.read().await.len()
    }

    /// Number of live session records.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl TrendCacheStore for MemoryStore {
    async fn upsert(&self, doc: &CachedRegionDocument) -> FirestoreResult<()> {
        self.trends.write().await.insert(doc.id(), doc.clone());
        Ok(())
    }

    async fn get(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Option<CachedRegionDocument>> {
        let id = CachedRegionDocument::document_id(country, content_type);
        Ok(self.trends.read().await.get(&id).cloned())
    }

    async fn load_region(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Vec<CachedRegionDocument>> {
        if content_type.is_some() {
            return Ok(self.get(country, content_type).await?.into_iter().collect());
        }
        // BTreeMap iteration is already ordered by document id.
        Ok(self
            .trends
            .read()
            .await
            .values()
            .filter(|d| &d.country == country)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> FirestoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, username: &str) -> FirestoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, user: &User) -> FirestoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(FirestoreError::AlreadyExists(format!(
                "users/{}",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> FirestoreResult<()> {
        self.users
            .write()
            .await
            .insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session(&self, session_key: &str) -> FirestoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(session_key).cloned())
    }

    async fn save_session(&self, session: &Session) -> FirestoreResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_key.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_key: &str) -> FirestoreResult<()> {
        self.sessions.write().await.remove(session_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use trend_models::AnalysisOutcome;

    use super::*;

    fn region(code: &str) -> RegionCode {
        RegionCode::parse(code).unwrap()
    }

    fn doc(code: &str, content_type: Option<ContentType>) -> CachedRegionDocument {
        CachedRegionDocument::new(
            region(code),
            content_type,
            vec![],
            AnalysisOutcome::failed("n/a"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store.upsert(&doc("US", None)).await.unwrap();
        let mut newer = doc("US", None);
        newer.updated_at = Utc::now() + Duration::seconds(5);
        store.upsert(&newer).await.unwrap();

        assert_eq!(store.trend_count().await, 1);
        let stored = store.get(&region("US"), None).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, newer.updated_at);
    }

    #[tokio::test]
    async fn test_load_region_orders_by_id_and_filters_country() {
        let store = MemoryStore::new();
        store.upsert(&doc("US", Some(ContentType::Music))).await.unwrap();
        store.upsert(&doc("GB", None)).await.unwrap();
        store.upsert(&doc("US", None)).await.unwrap();
        store.upsert(&doc("US", Some(ContentType::Games))).await.unwrap();

        let ids: Vec<String> = store
            .load_region(&region("US"), None)
            .await
            .unwrap()
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(ids, vec!["US", "US_games", "US_music"]);

        let music = store
            .load_region(&region("US"), Some(ContentType::Music))
            .await
            .unwrap();
        assert_eq!(music.len(), 1);
        assert!(store
            .load_region(&region("US"), Some(ContentType::Movies))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = MemoryStore::new();
        let user = User::new("alice", "", "", "", "hash");
        store.create_user(&user).await.unwrap();
        let err = store.create_user(&user).await.unwrap_err();
        assert!(matches!(err, FirestoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_session_delete_is_idempotent() {
        let store = MemoryStore::new();
        let session = Session::new("k1", "alice", "fp", Duration::days(14));
        store.save_session(&session).await.unwrap();
        assert!(store.get_session("k1").await.unwrap().is_some());
        store.delete_session("k1").await.unwrap();
        store.delete_session("k1").await.unwrap();
        assert_eq!(store.session_count().await, 0);
    }
}
