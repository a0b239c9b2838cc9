//! The auth service: login, session rotation, accounts and recovery.
//!
//! A session token is valid only while its `iat` claim equals the user's
//! stored counter. Login and renew advance the counter, logout and
//! password changes reset it to zero, so every older token dies at once
//! regardless of its own expiry.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use pss_core::config::AuthConfig;
use pss_core::error::AppError;
use pss_core::result::AppResult;
use pss_database::{Guarded, UserStore};
use pss_entity::user::{Identity, NO_SESSION, NewUser, UserSummary};

use crate::access_code;
use crate::jwt::{TokenDecoder, TokenEncoder};
use crate::password::{PasswordHasher, PasswordPolicy};

/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 6;
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 32;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const SESSION_INVALIDATED: &str = "Session invalidated";
const INVALID_ACCESS_CODE: &str = "Invalid access code";

/// Owns every credential and session decision.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    encoder: TokenEncoder,
    decoder: TokenDecoder,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl AuthService {
    /// Creates the service over a credential store.
    pub fn new(store: Arc<dyn UserStore>, config: &AuthConfig) -> Self {
        Self::with_hasher(store, config, PasswordHasher::new())
    }

    /// Creates the service with a specific password hasher.
    pub fn with_hasher(
        store: Arc<dyn UserStore>,
        config: &AuthConfig,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            encoder: TokenEncoder::new(config),
            decoder: TokenDecoder::new(config),
            hasher,
            config: config.clone(),
        }
    }

    /// Checks credentials and starts a new session, superseding any other.
    ///
    /// The error is identical for unknown users and wrong passwords.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let user = self.store.find(username).await?;
        let hash = user.as_ref().map(|u| u.password_hash.as_str());

        let valid = self.hasher.verify(password, hash).await?;
        if !valid || user.is_none() {
            warn!(username = %username, "Login failed");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let token = self.start_session(username).await?;
        info!(username = %username, "Login successful");
        Ok(token)
    }

    /// Resolves a token to the caller's identity.
    ///
    /// The signature check alone is not enough: the claim's `iat` must match
    /// the stored counter.
    pub async fn verify(&self, token: &str) -> AppResult<Identity> {
        let claims = self.decoder.decode(token)?;

        let user = self
            .store
            .find(&claims.username)
            .await?
            .ok_or_else(|| AppError::authentication(SESSION_INVALIDATED))?;

        if user.iat == NO_SESSION || user.iat != claims.iat {
            return Err(AppError::authentication(SESSION_INVALIDATED));
        }

        Ok(Identity {
            username: user.username,
            admin: user.admin,
        })
    }

    /// Ends every session of `username`, including the caller's own.
    pub async fn logout(&self, username: &str) -> AppResult<()> {
        self.store.clear_iat(username).await?;
        info!(username = %username, "Logged out");
        Ok(())
    }

    /// Issues a fresh token and invalidates the one used to call this.
    pub async fn renew(&self, username: &str) -> AppResult<String> {
        let token = self.start_session(username).await?;
        info!(username = %username, "Session renewed");
        Ok(token)
    }

    /// Admin-forced rotation: ends every session of `username`.
    pub async fn revoke_sessions(&self, username: &str) -> AppResult<()> {
        if !self.store.clear_iat(username).await? {
            return Err(not_found(username));
        }
        info!(username = %username, "Sessions revoked");
        Ok(())
    }

    /// Creates an account. The caller must already have checked that the
    /// requestor is an admin.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        admin: bool,
    ) -> AppResult<UserSummary> {
        validate_username(username)?;
        let password_hash = self.hasher.hash(password).await?;

        let user = self
            .store
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
                admin,
            })
            .await?;

        info!(username = %username, admin, "User registered");
        Ok(user.summary())
    }

    /// Creates an admin account with no requesting identity (first-run setup).
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> AppResult<UserSummary> {
        PasswordPolicy::validate(password)?;
        self.register(username, password, true).await
    }

    /// Deletes an account.
    ///
    /// Only the user themself or an admin may delete; admin accounts also
    /// need `force`. The last admin cannot be deleted.
    pub async fn delete_user(
        &self,
        requestor: &Identity,
        username: &str,
        force: bool,
    ) -> AppResult<()> {
        if !requestor.admin && !requestor.is(username) {
            return Err(AppError::authorization(
                "Only admins can delete other users",
            ));
        }

        let target = self
            .store
            .find(username)
            .await?
            .ok_or_else(|| not_found(username))?;

        if target.admin && !force {
            return Err(AppError::authorization(
                "Admin accounts can only be deleted with force",
            ));
        }

        match self.store.delete(username).await? {
            Guarded::Applied => {}
            Guarded::Missing => return Err(not_found(username)),
            Guarded::LastAdmin => {
                return Err(AppError::authorization("Cannot delete the last admin"));
            }
        }

        info!(username = %username, by = %requestor.username, "User deleted");
        Ok(())
    }

    /// Rotates a password.
    ///
    /// Admins may set any password unconditionally. Anyone else may only
    /// change their own, and only with a valid access code.
    pub async fn update_password(
        &self,
        requestor: &Identity,
        username: &str,
        password: &str,
        code: Option<&str>,
    ) -> AppResult<()> {
        if requestor.admin {
            let hash = self.hasher.hash(password).await?;
            if !self.store.set_password(username, &hash).await? {
                return Err(not_found(username));
            }
            info!(username = %username, by = %requestor.username, "Password set by admin");
            return Ok(());
        }

        if !requestor.is(username) {
            return Err(AppError::authorization(
                "Only admins can change other users' passwords",
            ));
        }

        let code = code.ok_or_else(|| AppError::authentication("Access code required"))?;
        self.redeem_access_code(username, password, code).await
    }

    /// Self-service reset with an access code; needs no session.
    pub async fn recover(&self, username: &str, password: &str, code: &str) -> AppResult<()> {
        self.redeem_access_code(username, password, code).await
    }

    /// Issues a new access code for `username`, replacing any previous one.
    pub async fn create_temp_access_code(&self, username: &str) -> AppResult<String> {
        let code = access_code::generate(self.config.access_code_length);
        let now = Utc::now().timestamp_millis();

        if !self.store.set_access_code(username, &code, now).await? {
            return Err(not_found(username));
        }

        info!(username = %username, "Access code issued");
        Ok(code)
    }

    /// Grants admin privileges.
    pub async fn promote(&self, username: &str) -> AppResult<()> {
        let user = self
            .store
            .find(username)
            .await?
            .ok_or_else(|| not_found(username))?;

        if user.admin {
            return Err(AppError::authorization(format!(
                "User '{username}' is already an admin"
            )));
        }

        if !self.store.grant_admin(username).await? {
            return Err(not_found(username));
        }
        info!(username = %username, "User promoted");
        Ok(())
    }

    /// Revokes admin privileges; the last admin cannot be demoted.
    pub async fn demote(&self, username: &str) -> AppResult<()> {
        let user = self
            .store
            .find(username)
            .await?
            .ok_or_else(|| not_found(username))?;

        if !user.admin {
            return Err(AppError::authorization(format!(
                "User '{username}' is not an admin"
            )));
        }

        match self.store.revoke_admin(username).await? {
            Guarded::Applied => {}
            Guarded::Missing => {
                return Err(AppError::authorization(format!(
                    "User '{username}' is not an admin"
                )));
            }
            Guarded::LastAdmin => {
                return Err(AppError::authorization("Cannot demote the last admin"));
            }
        }
        info!(username = %username, "User demoted");
        Ok(())
    }

    /// Every account, without hashes or codes.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let users = self.store.list().await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// A single account, without hashes or codes.
    pub async fn get_user(&self, username: &str) -> AppResult<UserSummary> {
        self.store
            .find(username)
            .await?
            .map(|u| u.summary())
            .ok_or_else(|| not_found(username))
    }

    /// Hashes a password on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        self.hasher.hash(password).await
    }

    async fn start_session(&self, username: &str) -> AppResult<String> {
        let floor = Utc::now().timestamp_millis();
        // The counter is written before the token leaves this function.
        let iat = self
            .store
            .advance_iat(username, floor)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        self.encoder.issue(username, iat)
    }

    async fn redeem_access_code(&self, username: &str, password: &str, code: &str) -> AppResult<()> {
        let stored = self
            .store
            .find(username)
            .await?
            .and_then(|u| u.access_code())
            .ok_or_else(|| AppError::authentication(INVALID_ACCESS_CODE))?;

        if !stored.matches(code) {
            warn!(username = %username, "Access code mismatch");
            return Err(AppError::authentication(INVALID_ACCESS_CODE));
        }

        let now = Utc::now().timestamp_millis();
        if stored.is_expired(now, self.config.access_code_expiration_ms) {
            return Err(AppError::authentication("Access code expired"));
        }

        let hash = self.hasher.hash(password).await?;
        // Compare-and-swap on the stored code: a concurrent redemption wins once.
        if !self
            .store
            .redeem_access_code(username, &stored.code, &hash)
            .await?
        {
            return Err(AppError::authentication(INVALID_ACCESS_CODE));
        }

        info!(username = %username, "Password reset with access code");
        Ok(())
    }
}

fn not_found(username: &str) -> AppError {
    AppError::not_found(format!("User '{username}' not found"))
}

/// Checks the username length rule.
pub fn validate_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters long"
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::validation(
            "Username must not contain whitespace",
        ));
    }
    Ok(())
}
