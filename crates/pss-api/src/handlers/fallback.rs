//! Handlers for requests that match no route.

use axum::extract::State;
use axum::http::{Method, Uri};

use crate::error::ApiError;
use crate::middleware::auth::authenticate;
use crate::state::AppState;

/// Unknown route, answered without looking at the session.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::route_not_found(method.as_str(), uri.path())
}

/// Unknown route, answered only to callers with a valid session.
///
/// Anonymous callers get the same 401 as on any protected route, so route
/// existence is not revealed.
pub async fn guarded_not_found(State(state): State<AppState>, method: Method, uri: Uri) -> ApiError {
    if let Err(e) = authenticate(&state, &uri).await {
        return e;
    }
    ApiError::route_not_found(method.as_str(), uri.path())
}
