//! Filesystem handlers: browse, download, upload, delete.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;

use pss_core::error::AppError;
use pss_storage::ByteStream;

use crate::dto::request::UploadQuery;
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

const OCTET_STREAM: &str = "application/octet-stream";

/// GET /fs and GET /fs/
pub async fn get_root(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Response, ApiError> {
    browse(&state, "").await
}

/// GET /fs/{*path}
pub async fn get_path(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    browse(&state, &path).await
}

/// Directory: JSON listing. File: raw byte stream.
async fn browse(state: &AppState, path: &str) -> Result<Response, ApiError> {
    if state.storage.is_directory(path).await? {
        let info = state.storage.get_directory_info(path).await?;
        return Ok(Json(info).into_response());
    }

    let download = state.storage.read_file(path).await?;
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, OCTET_STREAM)
        .header(header::CONTENT_LENGTH, download.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_safe(&download.name)),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// POST /fs/{*path}
///
/// Streams the body to `path`, or with `?dir=true` creates a directory.
pub async fn post_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<String>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(query) = query?;

    if query.dir {
        state.storage.create_directory(&path).await?;
        return Ok(Json(MessageResponse::new("Directory was created.")));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(OCTET_STREAM) {
        return Err(AppError::validation(format!(
            "Content-Type must be {OCTET_STREAM}"
        ))
        .into());
    }

    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| AppError::validation("Content-Length header is required"))?;

    let stream: ByteStream = Box::pin(body.into_data_stream().map_err(std::io::Error::other));

    let written = state
        .storage
        .write_file(&path, stream, declared_length)
        .await?;

    tracing::debug!(username = %auth.username, path = %path, bytes = written, "Upload accepted");
    Ok(Json(MessageResponse::new("File was uploaded.")))
}

/// DELETE /fs/{*path}
pub async fn delete_path(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.storage.delete_path(&path).await?;
    Ok(Json(MessageResponse::new("Path was deleted.")))
}

fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_safe_replaces_quotes_and_non_ascii() {
        assert_eq!(header_safe("notes.txt"), "notes.txt");
        assert_eq!(header_safe("my \"file\".txt"), "my _file_.txt");
        assert_eq!(header_safe("übung.pdf"), "_bung.pdf");
    }
}
