//! Route handlers.

pub mod auth;
pub mod fallback;
pub mod fs;
pub mod health;
pub mod search;
pub mod space;
