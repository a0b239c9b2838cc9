//! Argon2id password hashing and verification.
//!
//! Hashing is CPU-bound; the async helpers run it on the blocking pool.

use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use pss_core::error::AppError;

/// Hashes and verifies passwords using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash verified against when the account does not exist.
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2 default cost parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Burns the same work as a real verification and always fails.
    pub fn verify_dummy(&self, password: &str) -> Result<bool, AppError> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash.clone(),
            None => {
                let hash = self.hash_password("pss-dummy-password-0")?;
                self.dummy_hash.get_or_init(|| hash).clone()
            }
        };
        self.verify_password(password, &hash)?;
        Ok(false)
    }

    /// [`hash_password`](Self::hash_password) on the blocking pool.
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }

    /// [`verify_password`](Self::verify_password) on the blocking pool.
    ///
    /// `None` verifies against the dummy hash so the caller spends the same
    /// time whether or not the account exists.
    pub async fn verify(&self, password: &str, hash: Option<&str>) -> Result<bool, AppError> {
        let hasher = self.clone();
        let password = password.to_string();
        let hash = hash.map(str::to_string);
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify_password(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
