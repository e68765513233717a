//! Account and session handlers under `/auth`.

use std::borrow::Cow;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use trend_firestore::FirestoreError;
use trend_models::{User, UserProfile};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::auth::{
    csrf_cookie, hash_password, password_problems, session_cookie, session_removal,
    start_session, verify_login_password, verify_password, AuthUser, MaybeUser, CSRF_COOKIE,
    SESSION_COOKIE,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::metrics;
use crate::security::{issue_csrf_token, verify_csrf_token};
use crate::state::AppState;

const USERNAME_MAX_LEN: usize = 150;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// `GET /auth/status/`: CSRF token plus the current user, if any.
pub async fn status(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let secret = &state.config.secret_key;
    let token = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| verify_csrf_token(secret, t))
        .unwrap_or_else(|| issue_csrf_token(secret));

    let mut body = json!({
        "isAuthenticated": auth.is_some(),
        "csrfToken": token,
    });
    if let (Some(auth), Some(obj)) = (&auth, body.as_object_mut()) {
        if let Ok(Value::Object(profile)) = serde_json::to_value(auth.user.profile()) {
            obj.extend(profile);
        }
    }

    let jar = jar.add(csrf_cookie(&token, state.config.is_production()));
    (jar, Json(body))
}

/// `POST /auth/login/`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<UserProfile>)> {
    let (Some(username), Some(password)) = (
        request.username.filter(|u| !u.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::error_body(
            StatusCode::BAD_REQUEST,
            "Please provide both username and password",
        ));
    };

    let user = state.users.get_user(&username).await?;
    let valid = verify_login_password(&password, user.as_ref().map(|u| u.password_hash.as_str()));
    let mut user = match user {
        Some(user) if valid => user,
        _ => {
            warn!(username = %username, "Failed login attempt");
            metrics::record_login_attempt(false);
            return Err(ApiError::error_body(
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
            ));
        }
    };

    end_previous_session(&state, &jar).await?;

    user.last_login = Some(Utc::now());
    state.users.save_user(&user).await?;

    let jar = login_cookies(&state, jar, &user).await?;
    info!(username = %user.username, "User logged in");
    metrics::record_login_attempt(true);
    Ok((jar, Json(user.profile())))
}

/// `POST /auth/logout/`
pub async fn logout(
    State(state): State<AppState>,
    MaybeUser(auth): MaybeUser,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Value>)> {
    if let Some(auth) = auth {
        state.sessions.delete_session(&auth.session.session_key).await?;
        info!(username = %auth.user.username, "User logged out");
    } else if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.delete_session(cookie.value()).await?;
    }

    Ok((
        jar.remove(session_removal()),
        Json(json!({ "message": "Successfully logged out" })),
    ))
}

/// `POST /auth/register/`: create the account and log it in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<UserProfile>)> {
    let mut fields = match request.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => trend_models::validation_messages(&errors),
    };
    let password_errors = if request.password.is_empty() {
        vec!["This field is required.".to_string()]
    } else {
        password_problems(&request.password, &request.username)
    };
    if !password_errors.is_empty() {
        fields.push(("password".to_string(), password_errors));
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    let mut user = User::new(
        request.username.trim(),
        request.email.trim(),
        request.first_name.trim(),
        request.last_name.trim(),
        hash_password(&request.password)?,
    );
    user.last_login = Some(Utc::now());

    match state.users.create_user(&user).await {
        Ok(()) => {}
        Err(FirestoreError::AlreadyExists(_)) => {
            return Err(ApiError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
        Err(e) => return Err(e.into()),
    }

    end_previous_session(&state, &jar).await?;
    let jar = login_cookies(&state, jar, &user).await?;
    info!(username = %user.username, "User registered");
    Ok((StatusCode::CREATED, jar, Json(user.profile())))
}

/// `GET /auth/profile/`
pub async fn get_profile(auth: AuthUser) -> Json<UserProfile> {
    Json(auth.user.profile())
}

/// `PATCH /auth/profile/`: partial update of the editable profile fields.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    update.validate()?;

    let mut user = auth.user;
    if let Some(email) = update.email {
        user.email = email.trim().to_string();
    }
    if let Some(first_name) = update.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = update.last_name {
        user.last_name = last_name.trim().to_string();
    }

    state.users.save_user(&user).await?;
    Ok(Json(user.profile()))
}

/// `POST /auth/change-password/`
///
/// Other sessions of the user stop resolving; the current one is rebound to
/// the new password hash.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    let mut fields = Vec::new();
    if request.old_password.is_empty() {
        fields.push(("old_password".to_string(), vec!["This field is required.".to_string()]));
    }
    if request.new_password.is_empty() {
        fields.push(("new_password".to_string(), vec!["This field is required.".to_string()]));
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    let AuthUser { mut user, mut session } = auth;

    if !verify_password(&request.old_password, &user.password_hash) {
        return Err(ApiError::field("old_password", "Wrong password."));
    }

    let problems = password_problems(&request.new_password, &user.username);
    if !problems.is_empty() {
        return Err(ApiError::Validation(vec![("new_password".to_string(), problems)]));
    }

    user.password_hash = hash_password(&request.new_password)?;
    state.users.save_user(&user).await?;

    session.auth_hash = crate::security::session_auth_hash(&user.password_hash);
    state.sessions.save_session(&session).await?;

    info!(username = %user.username, "Password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Drop the session named by the incoming cookie, if any.
async fn end_previous_session(state: &AppState, jar: &CookieJar) -> ApiResult<()> {
    if let Some(previous) = jar.get(SESSION_COOKIE) {
        state.sessions.delete_session(previous.value()).await?;
    }
    Ok(())
}

/// Start a session for `user` and attach its cookie.
async fn login_cookies(state: &AppState, jar: CookieJar, user: &User) -> ApiResult<CookieJar> {
    let session = start_session(state, user).await?;
    Ok(jar.add(session_cookie(
        &session.session_key,
        state.config.session_cookie_age,
        state.config.is_production(),
    )))
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let message = if username.is_empty() {
        "This field is required."
    } else if username.chars().count() > USERNAME_MAX_LEN {
        "Ensure this field has no more than 150 characters."
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    } else if is_reserved_document_id(username) {
        "Enter a valid username."
    } else {
        return Ok(());
    };
    Err(ValidationError::new("username").with_message(Cow::Borrowed(message)))
}

/// Ids Firestore refuses: `.`, `..` and anything shaped `__name__`.
fn is_reserved_document_id(id: &str) -> bool {
    id == "." || id == ".." || (id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}

fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("Enter a valid email address.")))
    }
}
