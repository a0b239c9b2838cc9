//! Maps domain `AppError` to HTTP responses.
//!
//! Every failure leaves the server as `{ "error": true, "code", "message" }`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use pss_core::error::{AppError, ErrorKind};

/// Wire code for requests that match no route.
pub const ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `true`.
    pub error: bool,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    code: &'static str,
}

impl ApiError {
    /// The request matched no route.
    pub fn route_not_found(method: &str, path: &str) -> Self {
        Self {
            error: AppError::not_found(format!("Route {method} {path} does not exist")),
            code: ROUTE_NOT_FOUND,
        }
    }

    /// The underlying error.
    pub fn inner(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let code = error.kind.code();
        Self { error, code }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text()).into()
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authentication | ErrorKind::Authorization => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict | ErrorKind::Filesystem | ErrorKind::Validation => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Database | ErrorKind::Configuration | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.error.kind);
        if status.is_server_error() {
            tracing::error!(code = self.code, error = %self.error.message, "Request failed");
        }

        let body = ApiErrorResponse {
            error: true,
            code: self.code.to_string(),
            message: self.error.message,
        };

        (status, Json(body)).into_response()
    }
}
