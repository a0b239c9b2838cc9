//! Request DTOs with validation.
//!
//! Passwords arrive base64-encoded and are decoded by the handlers.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 6, max = 32, message = "Username must be 6 to 32 characters"))]
    pub username: String,
    /// Base64-encoded password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Whether the new account is an admin.
    pub admin: bool,
}

/// Delete-user request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteUserRequest {
    /// Account to delete.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Required to delete an admin account.
    #[serde(default)]
    pub force: bool,
}

/// Password rotation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    /// Account whose password changes.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Base64-encoded new password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Access code; required unless the caller is an admin.
    #[serde(default)]
    pub code: Option<String>,
}

/// Self-service recovery request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecoverRequest {
    /// Account to recover.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Base64-encoded new password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Access code issued by an admin.
    #[validate(length(min = 1, message = "Access code is required"))]
    pub code: String,
}

/// Body for admin actions targeting one user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsernameRequest {
    /// Target account.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Query parameters of `POST /fs/*`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    /// Create a directory instead of uploading a file.
    #[serde(default)]
    pub dir: bool,
}

/// Query parameters of `GET /search`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    /// Substring to look for in entry names.
    #[validate(length(min = 1, message = "Query must not be empty"))]
    pub query: String,
}

/// Session token passed as a query parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    /// Session token.
    pub token: Option<String>,
}
