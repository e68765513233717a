//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::auth::{
    change_password, get_profile, login, logout, register, status, update_profile,
};
use crate::handlers::{analyze_trends, health, idea_details, ready, suggest_ideas};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, csrf_protect, rate_limit_middleware, request_id, request_logging,
    security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Register `handler` at `path` with and without a trailing slash.
fn route_both(router: Router<AppState>, path: &str, handler: MethodRouter<AppState>) -> Router<AppState> {
    let slashed = format!("{}/", path.trim_end_matches('/'));
    router.route(path, handler.clone()).route(&slashed, handler)
}

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let config = &state.config;

    let rate_limiter = Arc::new(RateLimiterCache::new(
        config.rate_limit_rps,
        config.rate_limit_burst,
    ));
    // Stricter bucket for login and registration
    let auth_rate_limiter = Arc::new(RateLimiterCache::new(
        config.auth_rate_limit_rps,
        config.auth_rate_limit_rps.saturating_mul(2),
    ));

    let mut api_routes = Router::new();
    api_routes = route_both(api_routes, "/analyze", get(analyze_trends));
    api_routes = route_both(api_routes, "/suggest-ideas", post(suggest_ideas));
    api_routes = route_both(api_routes, "/get-idea-details", post(idea_details));
    let api_routes = api_routes.layer(middleware::from_fn_with_state(
        rate_limiter,
        rate_limit_middleware,
    ));

    let mut auth_routes = Router::new();
    auth_routes = route_both(auth_routes, "/status", get(status));
    auth_routes = route_both(auth_routes, "/login", post(login));
    auth_routes = route_both(auth_routes, "/logout", post(logout));
    auth_routes = route_both(auth_routes, "/register", post(register));
    auth_routes = route_both(auth_routes, "/profile", get(get_profile).patch(update_profile));
    auth_routes = route_both(auth_routes, "/change-password", post(change_password));
    let auth_routes = auth_routes.layer(middleware::from_fn_with_state(
        auth_rate_limiter,
        rate_limit_middleware,
    ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .nest("/auth", auth_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn_with_state(state.clone(), csrf_protect))
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}
