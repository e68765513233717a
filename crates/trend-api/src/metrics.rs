//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return the handle `/metrics` renders.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "trend_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "trend_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "trend_http_requests_in_flight";

    // Domain metrics
    pub const CACHE_READS_TOTAL: &str = "trend_cache_reads_total";
    pub const IDEA_REQUESTS_TOTAL: &str = "trend_idea_requests_total";
    pub const LOGIN_ATTEMPTS_TOTAL: &str = "trend_login_attempts_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "trend_rate_limit_hits_total";
}

/// Route templates used as the `path` label; anything else is `unmatched`.
const KNOWN_ROUTES: &[&str] = &[
    "/api/analyze",
    "/api/suggest-ideas",
    "/api/get-idea-details",
    "/auth/status",
    "/auth/login",
    "/auth/logout",
    "/auth/register",
    "/auth/profile",
    "/auth/change-password",
    "/health",
    "/healthz",
    "/ready",
    "/metrics",
];

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a cached-trend read by result (`fresh`, `stale`, `missing`, `error`).
pub fn record_cache_read(result: &'static str) {
    counter!(names::CACHE_READS_TOTAL, "result" => result).increment(1);
}

/// Record an idea request by kind (`list`, `details`) and outcome.
pub fn record_idea_request(kind: &'static str, outcome: &'static str) {
    counter!(names::IDEA_REQUESTS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record a login attempt.
pub fn record_login_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(names::LOGIN_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    counter!(names::RATE_LIMIT_HITS_TOTAL, "endpoint" => sanitize_path(endpoint)).increment(1);
}

/// Collapse a request path onto a known route so label cardinality stays
/// bounded.
pub fn sanitize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
    KNOWN_ROUTES
        .iter()
        .find(|route| **route == trimmed)
        .map(|route| route.to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/analyze/"), "/api/analyze");
        assert_eq!(sanitize_path("/api/analyze"), "/api/analyze");
        assert_eq!(sanitize_path("/auth/change-password/"), "/auth/change-password");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "unmatched");
        assert_eq!(sanitize_path("/"), "unmatched");
    }
}
