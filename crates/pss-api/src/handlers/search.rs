//! Search handler.

use axum::Json;
use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use validator::Validate;

use pss_core::error::AppError;
use pss_entity::fs::FsEntry;

use crate::dto::request::SearchQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /search?query=
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<FsEntry>>, ApiError> {
    let Query(query) = query?;
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let results = state.storage.search(&query.query).await?;
    Ok(Json(results))
}
