//! Custom Axum extractors.

pub mod auth;
pub mod basic;
pub mod json;

pub use auth::{AdminUser, AuthUser};
pub use basic::BasicCredentials;
pub use json::ValidatedJson;
