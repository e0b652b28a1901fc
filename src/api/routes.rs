//! API Routes
//!
//! Every path is content, so the router is a single fallback.

use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::handlers::{serve_handler, AppState};

/// Creates the main router.
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(serve_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answers requests that run longer than `secs` seconds with
/// 408 Request Timeout. Zero leaves the router unbounded.
pub fn with_request_timeout(router: Router, secs: u64) -> Router {
    if secs == 0 {
        return router;
    }
    router.layer(TimeoutLayer::new(Duration::from_secs(secs)))
}
