//! Identity extractors for handlers behind the session middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pss_core::error::AppError;
use pss_entity::user::Identity;

use crate::error::ApiError;

/// The verified caller, as resolved by the session middleware.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Missing session").into())
    }
}

/// A verified caller holding admin privileges.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl std::ops::Deref for AdminUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.admin {
            return Err(AppError::authorization(
                "User lacks proper permissions to perform this operation",
            )
            .into());
        }
        Ok(AdminUser(identity))
    }
}
