//! Session middleware for protected routes.
//!
//! Reads the `?token=` query parameter, asks the auth service to verify it
//! (signature, expiry and the stored session counter) and attaches the
//! resulting [`Identity`] to the request.

use axum::extract::{Query, Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;

use pss_core::error::AppError;
use pss_entity::user::Identity;

use crate::dto::request::TokenQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Pulls the session token out of the query string.
pub fn token_from_uri(uri: &Uri) -> Result<String, ApiError> {
    let Query(query) = Query::<TokenQuery>::try_from_uri(uri)?;
    query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Missing session token").into())
}

/// Verifies the token of a request and returns the caller.
pub async fn authenticate(state: &AppState, uri: &Uri) -> Result<Identity, ApiError> {
    let token = token_from_uri(uri)?;
    Ok(state.auth.verify(&token).await?)
}

/// Rejects requests without a valid session; otherwise stores the caller's
/// [`Identity`] in the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authenticate(&state, request.uri()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
