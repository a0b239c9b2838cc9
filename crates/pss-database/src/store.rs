//! The credential store contract.

use async_trait::async_trait;

use pss_core::result::AppResult;
use pss_entity::user::{NewUser, User};

/// Outcome of a change that must leave at least one admin behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guarded {
    /// The change was applied.
    Applied,
    /// No matching user.
    Missing,
    /// The user is the only remaining admin.
    LastAdmin,
}

/// Persistence of user records, keyed by username.
///
/// Every mutating method is a single atomic update on one record; callers
/// rely on that and hold no locks of their own. Methods returning `bool`
/// report whether the user existed. Changes that can remove an admin are
/// serialised against each other, so the admin count they check cannot go
/// stale before they apply.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a user by username.
    async fn find(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a user. Fails with `Conflict` if the username is taken.
    async fn insert(&self, user: NewUser) -> AppResult<User>;

    /// Remove a user unless it is the last admin.
    async fn delete(&self, username: &str) -> AppResult<Guarded>;

    /// All users ordered by username.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Set the admin flag.
    async fn grant_admin(&self, username: &str) -> AppResult<bool>;

    /// Clear the admin flag unless it is the last admin.
    ///
    /// `Missing` when no admin named `username` exists.
    async fn revoke_admin(&self, username: &str) -> AppResult<Guarded>;

    /// Atomically set `iat = max(iat + 1, floor)` and return the new value.
    async fn advance_iat(&self, username: &str, floor: i64) -> AppResult<Option<i64>>;

    /// Reset `iat` to zero, ending every session of the user.
    async fn clear_iat(&self, username: &str) -> AppResult<bool>;

    /// Replace the password hash; also clears any access code and `iat`.
    async fn set_password(&self, username: &str, password_hash: &str) -> AppResult<bool>;

    /// Store an access code and its issue time, replacing any previous one.
    async fn set_access_code(&self, username: &str, code: &str, issued_at: i64)
    -> AppResult<bool>;

    /// Consume an access code.
    ///
    /// Only succeeds while the stored code still equals `code`; then sets the
    /// new hash and clears the code and `iat` in the same update.
    async fn redeem_access_code(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
    ) -> AppResult<bool>;
}
