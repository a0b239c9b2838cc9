//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

use crate::state::AppState;

/// Logs request method, path, status, and duration.
///
/// With `logging.verbose` every request is logged at INFO, otherwise at DEBUG.
/// The query string is left out since it carries the session token.
pub async fn request_logging(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if state.config.logging.verbose {
        info!(method = %method, path = %path, status, duration_ms, "HTTP request");
    } else {
        debug!(method = %method, path = %path, status, duration_ms, "HTTP request");
    }

    response
}
