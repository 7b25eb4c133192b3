//! # consign-api — Axum API Services for the Consign Platform
//!
//! HTTP surface over the contract lifecycle engine: templates, contract
//! creation and dispatch, e-signature collection, signing workflows, and
//! the tamper-evident audit trail. In-memory stores serve all reads;
//! Postgres write-through persistence is optional.
//!
//! ## API Surface
//!
//! | Prefix              | Module                  | Domain                  |
//! |---------------------|-------------------------|-------------------------|
//! | `/v1/templates/*`   | [`routes::templates`]   | Contract templates      |
//! | `/v1/contracts/*`   | [`routes::contracts`]   | Contract lifecycle      |
//! | `/v1/signatures/*`  | [`routes::signatures`]  | Signing and declining   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI spec via utoipa derive macros at `/openapi.json`.

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::RateLimiter;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the middleware stack
/// so they stay cheap and never rate-limited.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(state.config.rate_limit.clone());

    let api = Router::new()
        .merge(routes::templates::router())
        .merge(routes::contracts::router())
        .merge(routes::signatures::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
