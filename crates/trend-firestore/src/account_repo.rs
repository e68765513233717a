//! Firestore-backed user and session stores.

use async_trait::async_trait;
use tracing::info;
use trend_models::{Session, User};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::store::{SessionStore, UserStore};
use crate::types::{mark_timestamp, to_fields, Value};

pub const USERS_COLLECTION: &str = "users";
pub const SESSIONS_COLLECTION: &str = "sessions";

fn user_fields(user: &User) -> FirestoreResult<std::collections::HashMap<String, Value>> {
    let mut fields = to_fields(user)?;
    mark_timestamp(&mut fields, "date_joined");
    mark_timestamp(&mut fields, "last_login");
    Ok(fields)
}

/// Repository for `users/{username}`.
#[derive(Clone)]
pub struct FirestoreUserStore {
    client: FirestoreClient,
}

impl FirestoreUserStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserStore for FirestoreUserStore {
    async fn get_user(&self, username: &str) -> FirestoreResult<Option<User>> {
        match self.client.get_document(USERS_COLLECTION, username).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &User) -> FirestoreResult<()> {
        self.client
            .create_document(USERS_COLLECTION, &user.username, user_fields(user)?)
            .await?;
        info!(username = %user.username, user_id = %user.id, "Created user");
        Ok(())
    }

    async fn save_user(&self, user: &User) -> FirestoreResult<()> {
        self.client
            .set_document(USERS_COLLECTION, &user.username, user_fields(user)?)
            .await
            .map(|_| ())
    }
}

/// Repository for `sessions/{session_key}`.
#[derive(Clone)]
pub struct FirestoreSessionStore {
    client: FirestoreClient,
}

impl FirestoreSessionStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for FirestoreSessionStore {
    async fn get_session(&self, session_key: &str) -> FirestoreResult<Option<Session>> {
        match self
            .client
            .get_document(SESSIONS_COLLECTION, session_key)
            .await?
        {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &Session) -> FirestoreResult<()> {
        let mut fields = to_fields(session)?;
        mark_timestamp(&mut fields, "created_at");
        mark_timestamp(&mut fields, "expires_at");
        self.client
            .set_document(SESSIONS_COLLECTION, &session.session_key, fields)
            .await
            .map(|_| ())
    }

    async fn delete_session(&self, session_key: &str) -> FirestoreResult<()> {
        self.client
            .delete_document(SESSIONS_COLLECTION, session_key)
            .await
    }
}
