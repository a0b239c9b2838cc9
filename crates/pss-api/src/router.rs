//! Route definitions for the storage server HTTP API.
//!
//! Routes are split into a public group and a protected group. The
//! protected group sits behind [`require_session`]; handlers there read the
//! caller through the [`AuthUser`](crate::extractors::AuthUser) and
//! [`AdminUser`](crate::extractors::AdminUser) extractors.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware::auth::require_session;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// With `server.predictive_404` enabled unknown routes answer 404 right
/// away; otherwise the session is checked first and anonymous callers get
/// 401.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(user_routes())
        .merge(fs_routes())
        .merge(search_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let router = Router::new().merge(public_routes()).merge(protected);

    let router = if state.config.server.predictive_404 {
        router.fallback(handlers::fallback::not_found)
    } else {
        router.fallback(handlers::fallback::guarded_not_found)
    };

    router.with_state(state)
}

/// Endpoints reachable without a session.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/recover", put(handlers::auth::recover))
}

/// Session lifecycle for the caller.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/renew", post(handlers::auth::renew))
}

/// Account management.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/users", get(handlers::auth::list_users))
        .route(
            "/auth/user",
            get(handlers::auth::get_user)
                .put(handlers::auth::update_password)
                .delete(handlers::auth::delete_user),
        )
        .route("/auth/user/code", post(handlers::auth::create_access_code))
        .route("/auth/user/promote", post(handlers::auth::promote))
        .route("/auth/user/demote", post(handlers::auth::demote))
        .route("/auth/user/revoke", post(handlers::auth::revoke))
}

/// Browse, download, upload and delete under the storage root.
fn fs_routes() -> Router<AppState> {
    Router::new()
        .route("/fs", get(handlers::fs::get_root))
        .route("/fs/", get(handlers::fs::get_root))
        .route(
            "/fs/{*path}",
            get(handlers::fs::get_path)
                .post(handlers::fs::post_path)
                .delete(handlers::fs::delete_path),
        )
        .route("/space", get(handlers::space::space))
        // Upload size is enforced by the storage service against the declared length.
        .layer(DefaultBodyLimit::disable())
}

/// Recursive name search.
fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(handlers::search::search))
}
