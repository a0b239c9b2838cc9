//! Application builder: wires router, middleware and state into an Axum app.

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = state.config.server.request_timeout_seconds;
    let cors = build_cors_layer(&state.config.server.cors);

    let mut app = build_router(state.clone());
    if timeout > 0 {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(timeout)));
    }

    app.layer(axum_middleware::from_fn_with_state(state, request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
