//! # pss-api
//!
//! HTTP API layer for the personal storage server built on Axum.
//!
//! Provides the REST endpoints, the session middleware, extractors, DTOs,
//! and the mapping from [`pss_core::AppError`] to the uniform error body.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
