//! # pss-core
//!
//! Core crate for the personal storage server. Contains the configuration
//! schemas and the unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other pss crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
