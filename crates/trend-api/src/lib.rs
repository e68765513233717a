//! Axum HTTP API server.
//!
//! This crate provides:
//! - Cached trend reads and LLM-backed content idea endpoints under `/api`
//! - Session-cookie accounts with CSRF protection under `/auth`
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
