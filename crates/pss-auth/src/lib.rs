//! # pss-auth
//!
//! Authentication and session revocation for the storage server.
//!
//! ## Modules
//!
//! - `jwt` — signed session tokens carrying the per-user session counter
//! - `password` — Argon2id hashing and the password policy
//! - `access_code` — temporary recovery codes
//! - `service` — the auth service tying them to the credential store

pub mod access_code;
pub mod jwt;
pub mod password;
pub mod service;

pub use jwt::{Claims, TokenDecoder, TokenEncoder};
pub use password::{PasswordHasher, PasswordPolicy};
pub use service::AuthService;
