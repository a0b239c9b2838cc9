//! Free-space handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::SpaceResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /space
pub async fn space(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<SpaceResponse>, ApiError> {
    let usage = state.storage.get_disk_info().await?;
    Ok(Json(SpaceResponse {
        total: usage.total_bytes,
        free: usage.available_bytes,
    }))
}
