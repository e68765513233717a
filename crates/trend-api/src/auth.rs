//! Session-cookie authentication.
//!
//! A login stores a [`Session`] keyed by a random `sessionid` cookie. The
//! session remembers a fingerprint of the user's password hash; once the
//! password changes, every session bound to the old hash stops resolving.
//! Unsafe requests that resolve to a user must echo the `csrftoken` cookie
//! in the `X-CSRFToken` header.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use tracing::{debug, info};
use trend_models::{Session, User};

use crate::error::{ApiError, ApiResult};
use crate::security::{
    constant_time_eq, generate_session_key, session_auth_hash, verify_csrf_token,
};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// CSRF cookie lifetime (one year).
const CSRF_COOKIE_AGE_SECS: i64 = 31_449_600;

pub const MIN_PASSWORD_LEN: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "admin123",
    "abc12345",
    "trustno1",
    "monkey123",
    "dragon123",
];

/// A request whose session cookie resolved to a live user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

/// Like [`AuthUser`] but never rejects for a missing session.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

/// Session resolution result cached in request extensions so the CSRF
/// middleware and the extractors share one store lookup.
#[derive(Debug, Clone)]
pub(crate) struct SessionLookup(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(SessionLookup(resolved)) = parts.extensions.get::<SessionLookup>() {
            return Ok(MaybeUser(resolved.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let resolved = resolve_session(state, &jar).await?;
        parts.extensions.insert(SessionLookup(resolved.clone()));
        Ok(MaybeUser(resolved))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        MaybeUser::from_request_parts(parts, state)
            .await?
            .0
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided."))
    }
}

/// Look up the user behind the request's `sessionid` cookie.
///
/// Expired sessions and sessions whose password fingerprint no longer
/// matches are deleted and resolve to `None`.
pub async fn resolve_session(state: &AppState, jar: &CookieJar) -> ApiResult<Option<AuthUser>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let key = cookie.value();
    if key.is_empty() {
        return Ok(None);
    }

    let Some(session) = state.sessions.get_session(key).await? else {
        return Ok(None);
    };

    if session.is_expired(chrono::Utc::now()) {
        debug!(username = %session.username, "Session expired");
        state.sessions.delete_session(key).await?;
        return Ok(None);
    }

    let Some(user) = state.users.get_user(&session.username).await? else {
        state.sessions.delete_session(key).await?;
        return Ok(None);
    };

    if !constant_time_eq(&session.auth_hash, &session_auth_hash(&user.password_hash)) {
        info!(username = %user.username, "Session invalidated by password change");
        state.sessions.delete_session(key).await?;
        return Ok(None);
    }

    Ok(Some(AuthUser { user, session }))
}

/// Create and persist a session for `user`.
pub async fn start_session(state: &AppState, user: &User) -> ApiResult<Session> {
    let session = Session::new(
        generate_session_key(),
        &user.username,
        session_auth_hash(&user.password_hash),
        state.config.session_lifetime(),
    );
    state.sessions.save_session(&session).await?;
    Ok(session)
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// The `X-CSRFToken` header must match the `csrftoken` cookie and carry a
/// valid signature.
pub fn check_csrf(secret: &str, headers: &HeaderMap, jar: &CookieJar) -> ApiResult<()> {
    let cookie = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::forbidden("CSRF Failed: CSRF cookie not set."))?;

    let header = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::forbidden("CSRF Failed: CSRF token missing."))?;

    if !constant_time_eq(header, &cookie) || !verify_csrf_token(secret, header) {
        return Err(ApiError::forbidden("CSRF Failed: CSRF token incorrect."));
    }
    Ok(())
}

pub fn session_cookie(key: &str, max_age: std::time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, key.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(max_age.as_secs() as i64))
        .build()
}

/// Readable by scripts so the frontend can echo it in `X-CSRFToken`.
pub fn csrf_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token.to_string()))
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(CSRF_COOKIE_AGE_SECS))
        .build()
}

pub fn session_removal() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::internal(format!("password salt encoding failed: {e}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Verify against the stored hash, or against a fixed hash when the
/// account does not exist so both paths run argon2. Unknown accounts never
/// verify.
pub fn verify_login_password(password: &str, password_hash: Option<&str>) -> bool {
    match password_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, dummy_password_hash());
            false
        }
    }
}

fn dummy_password_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("unknown-account-placeholder").unwrap_or_default())
}

/// Messages for every rule `password` breaks; empty when acceptable.
pub fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LEN
        ));
    }
    if !username.is_empty() && password.to_lowercase() == username.to_lowercase() {
        problems.push("The password is too similar to the username.".to_string());
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}
