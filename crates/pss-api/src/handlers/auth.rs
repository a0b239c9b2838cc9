//! Auth handlers: login, sessions, accounts and recovery.

use axum::Json;
use axum::extract::State;

use pss_auth::PasswordPolicy;
use pss_entity::user::UserSummary;

use crate::dto::request::{
    DeleteUserRequest, RecoverRequest, RegisterRequest, UpdatePasswordRequest, UsernameRequest,
};
use crate::dto::response::{AccessCodeResponse, MessageResponse, TokenResponse};
use crate::error::ApiError;
use crate::extractors::{AdminUser, AuthUser, BasicCredentials, ValidatedJson};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    creds: BasicCredentials,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth.login(&creds.username, &creds.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout(&auth.username).await?;
    Ok(Json(MessageResponse::new("User was successfully logged out.")))
}

/// POST /auth/renew
pub async fn renew(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth.renew(&auth.username).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let password = PasswordPolicy::decode_and_validate(&req.password)?;
    state
        .auth
        .register(&req.username, &password, req.admin)
        .await?;
    Ok(Json(MessageResponse::new("User was registered successfully.")))
}

/// DELETE /auth/user
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<DeleteUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .delete_user(&auth, &req.username, req.force)
        .await?;
    Ok(Json(MessageResponse::new("User was successfully deleted.")))
}

/// PUT /auth/user
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let password = PasswordPolicy::decode_and_validate(&req.password)?;
    state
        .auth
        .update_password(&auth, &req.username, &password, req.code.as_deref())
        .await?;
    Ok(Json(MessageResponse::new(
        "User password was successfully updated.",
    )))
}

/// PUT /auth/recover
pub async fn recover(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RecoverRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let password = PasswordPolicy::decode_and_validate(&req.password)?;
    state
        .auth
        .recover(&req.username, &password, &req.code)
        .await?;
    Ok(Json(MessageResponse::new(
        "User password was successfully updated.",
    )))
}

/// GET /auth/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.auth.list_users().await?))
}

/// GET /auth/user
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserSummary>, ApiError> {
    Ok(Json(state.auth.get_user(&auth.username).await?))
}

/// POST /auth/user/code
pub async fn create_access_code(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UsernameRequest>,
) -> Result<Json<AccessCodeResponse>, ApiError> {
    let code = state.auth.create_temp_access_code(&req.username).await?;
    Ok(Json(AccessCodeResponse { code }))
}

/// POST /auth/user/promote
pub async fn promote(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.promote(&req.username).await?;
    Ok(Json(MessageResponse::new("User was promoted to admin.")))
}

/// POST /auth/user/demote
pub async fn demote(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.demote(&req.username).await?;
    Ok(Json(MessageResponse::new("User admin rights were revoked.")))
}

/// POST /auth/user/revoke
pub async fn revoke(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.revoke_sessions(&req.username).await?;
    Ok(Json(MessageResponse::new("User sessions were revoked.")))
}
