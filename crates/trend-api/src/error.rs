//! API error types.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;
use trend_models::validation_messages;
use validator::ValidationErrors;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Field name to messages; rendered as a JSON object.
    #[error("Validation error")]
    Validation(Vec<(String, Vec<String>)>),

    /// A reply whose body shape is fixed by the endpoint contract.
    #[error("{0}: {1}")]
    Reply(StatusCode, Value),

    #[error("Firestore error: {0}")]
    Firestore(#[from] trend_firestore::FirestoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// `{"error": msg}` with the given status.
    pub fn error_body(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::Reply(status, serde_json::json!({ "error": msg.into() }))
    }

    /// `{"message": msg}` with the given status.
    pub fn message_body(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::Reply(status, serde_json::json!({ "message": msg.into() }))
    }

    /// A single field error, rendered `{"field": ["msg"]}`.
    pub fn field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(vec![(field.into(), vec![msg.into()])])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Reply(status, _) => *status,
            ApiError::Internal(_) | ApiError::Config(_) | ApiError::Firestore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(validation_messages(&errors))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::Reply(status, body) => (status, Json(body)).into_response(),
            ApiError::Validation(fields) => {
                let body: BTreeMap<String, Vec<String>> = fields.into_iter().collect();
                (status, Json(body)).into_response()
            }
            other => {
                let detail = match &other {
                    ApiError::Internal(_) | ApiError::Config(_) | ApiError::Firestore(_) => {
                        error!(error = %other, "Request failed with internal error");
                        // Don't expose internal error details in production
                        if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                            "An internal error occurred".to_string()
                        } else {
                            other.to_string()
                        }
                    }
                    ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => msg.clone(),
                    _ => other.to_string(),
                };
                (status, Json(ErrorResponse { detail })).into_response()
            }
        }
    }
}
