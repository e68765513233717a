//! API configuration.

use std::time::Duration;

use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::warn;
use trend_firestore::StoreBackend;

use crate::error::{ApiError, ApiResult};

/// Minimum length accepted for `SECRET_KEY`.
const MIN_SECRET_KEY_LEN: usize = 32;

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (`/api`)
    pub rate_limit_rps: u32,
    /// Rate limit burst (`/api`)
    pub rate_limit_burst: u32,
    /// Rate limit requests per second (`/auth`)
    pub auth_rate_limit_rps: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Key for CSRF token signatures
    pub secret_key: String,
    /// Maximum age of a cached region document served by `/api/analyze/`
    pub staleness_window: Duration,
    /// Login session lifetime
    pub session_cookie_age: Duration,
    pub store_backend: StoreBackend,
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .field("auth_rate_limit_rps", &self.auth_rate_limit_rps)
            .field("request_timeout", &self.request_timeout)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("secret_key", &"<redacted>")
            .field("staleness_window", &self.staleness_window)
            .field("session_cookie_age", &self.session_cookie_age)
            .field("store_backend", &self.store_backend)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            rate_limit_burst: 20,
            auth_rate_limit_rps: 2,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            secret_key: random_secret(),
            staleness_window: Duration::from_secs(86_400),
            session_cookie_age: Duration::from_secs(1_209_600), // 14 days
            store_backend: StoreBackend::default(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    ///
    /// `SECRET_KEY` is mandatory in production; elsewhere a random key is
    /// generated, so CSRF tokens do not survive a restart.
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| defaults.environment.clone());
        let production = environment.to_lowercase() == "production";

        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(key) if key.len() >= MIN_SECRET_KEY_LEN => key,
            Ok(_) if production => {
                return Err(ApiError::config(format!(
                    "SECRET_KEY must be at least {} characters",
                    MIN_SECRET_KEY_LEN
                )))
            }
            Err(_) if production => {
                return Err(ApiError::config("SECRET_KEY must be set in production"))
            }
            _ => {
                warn!("SECRET_KEY unset or too short, using a random per-process key");
                defaults.secret_key.clone()
            }
        };

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| defaults.host.clone()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| defaults.cors_origins.clone()),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_burst),
            auth_rate_limit_rps: std::env::var("AUTH_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.auth_rate_limit_rps),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment,
            secret_key,
            staleness_window: Duration::from_secs(
                std::env::var("TREND_STALENESS_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(86_400),
            ),
            session_cookie_age: Duration::from_secs(
                std::env::var("SESSION_COOKIE_AGE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1_209_600),
            ),
            store_backend: StoreBackend::from_env()
                .map_err(|e| ApiError::config(e.to_string()))?,
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    pub fn staleness_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.staleness_window).unwrap_or(chrono::Duration::days(1))
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_cookie_age).unwrap_or(chrono::Duration::days(14))
    }
}

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
