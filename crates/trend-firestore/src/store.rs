//! Storage interfaces used by the worker and the API.
//!
//! Each has a Firestore implementation and an in-memory one
//! ([`crate::memory::MemoryStore`]) for local development and tests.

use async_trait::async_trait;
use trend_models::{CachedRegionDocument, ContentType, RegionCode, Session, User};

use crate::error::FirestoreResult;

/// Cached region documents.
#[async_trait]
pub trait TrendCacheStore: Send + Sync {
    /// Replace (or create) the document keyed by the document's region and type.
    async fn upsert(&self, doc: &CachedRegionDocument) -> FirestoreResult<()>;

    /// The single document for `(country, content_type)`.
    async fn get(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Option<CachedRegionDocument>>;

    /// Every document for `country`, or only the one for `content_type` when
    /// given, ordered by document id.
    async fn load_region(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Vec<CachedRegionDocument>>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> FirestoreResult<()>;
}

/// User accounts keyed by username.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, username: &str) -> FirestoreResult<Option<User>>;

    /// Insert a new user; `AlreadyExists` if the username is taken.
    async fn create_user(&self, user: &User) -> FirestoreResult<()>;

    /// Overwrite an existing user record.
    async fn save_user(&self, user: &User) -> FirestoreResult<()>;
}

/// Login sessions keyed by session key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session(&self, session_key: &str) -> FirestoreResult<Option<Session>>;

    async fn save_session(&self, session: &Session) -> FirestoreResult<()>;

    /// Idempotent.
    async fn delete_session(&self, session_key: &str) -> FirestoreResult<()>;
}
