//! User accounts and login sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account, keyed by `username` in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// Argon2 PHC string.
    pub password_hash: String,

    pub date_joined: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new account with a fresh id.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    /// Public projection without credentials.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// What clients see of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Server-side login session, keyed by `session_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_key: String,

    pub username: String,

    /// Fingerprint of the user's password hash when the session was bound.
    /// A password change elsewhere invalidates sessions whose hash no
    /// longer matches.
    pub auth_hash: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_key: impl Into<String>,
        username: impl Into<String>,
        auth_hash: impl Into<String>,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_key: session_key.into(),
            username: username.into(),
            auth_hash: auth_hash.into(),
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
