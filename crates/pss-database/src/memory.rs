//! In-memory credential store using a concurrent map.
//!
//! Each operation holds the shard lock of a single entry for its whole
//! read-modify-write, which gives the same per-record atomicity as a
//! single-row SQL update. Changes that can remove an admin also hold a
//! store-wide lock while they count the remaining admins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;

use pss_core::error::AppError;
use pss_core::result::AppResult;
use pss_entity::user::{NO_SESSION, NewUser, User};

use crate::store::{Guarded, UserStore};

/// Process-local credential store.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<String, User>>,
    admin_changes: Arc<Mutex<()>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn is_admin(&self, username: &str) -> Option<bool> {
        self.users.get(username).map(|u| u.admin)
    }

    fn admin_count(&self) -> usize {
        self.users.iter().filter(|e| e.value().admin).count()
    }

    fn update<F>(&self, username: &str, f: F) -> bool
    where
        F: FnOnce(&mut User),
    {
        match self.users.get_mut(username) {
            Some(mut user) => {
                f(user.value_mut());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "User '{}' already exists",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let record = User {
                    username: user.username,
                    password_hash: user.password_hash,
                    admin: user.admin,
                    iat: NO_SESSION,
                    access_code: None,
                    access_code_issued_at: None,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn delete(&self, username: &str) -> AppResult<Guarded> {
        let _lock = self.admin_changes.lock().await;
        let Some(admin) = self.is_admin(username) else {
            return Ok(Guarded::Missing);
        };
        if admin && self.admin_count() <= 1 {
            return Ok(Guarded::LastAdmin);
        }
        Ok(match self.users.remove(username) {
            Some(_) => Guarded::Applied,
            None => Guarded::Missing,
        })
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn grant_admin(&self, username: &str) -> AppResult<bool> {
        let _lock = self.admin_changes.lock().await;
        Ok(self.update(username, |u| u.admin = true))
    }

    async fn revoke_admin(&self, username: &str) -> AppResult<Guarded> {
        let _lock = self.admin_changes.lock().await;
        if self.is_admin(username) != Some(true) {
            return Ok(Guarded::Missing);
        }
        if self.admin_count() <= 1 {
            return Ok(Guarded::LastAdmin);
        }
        Ok(if self.update(username, |u| u.admin = false) {
            Guarded::Applied
        } else {
            Guarded::Missing
        })
    }

    async fn advance_iat(&self, username: &str, floor: i64) -> AppResult<Option<i64>> {
        Ok(self.users.get_mut(username).map(|mut user| {
            let next = (user.iat + 1).max(floor);
            user.iat = next;
            next
        }))
    }

    async fn clear_iat(&self, username: &str) -> AppResult<bool> {
        Ok(self.update(username, |u| u.iat = NO_SESSION))
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> AppResult<bool> {
        Ok(self.update(username, |u| {
            u.password_hash = password_hash.to_string();
            u.access_code = None;
            u.access_code_issued_at = None;
            u.iat = NO_SESSION;
        }))
    }

    async fn set_access_code(
        &self,
        username: &str,
        code: &str,
        issued_at: i64,
    ) -> AppResult<bool> {
        Ok(self.update(username, |u| {
            u.access_code = Some(code.to_string());
            u.access_code_issued_at = Some(issued_at);
        }))
    }

    async fn redeem_access_code(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
    ) -> AppResult<bool> {
        let Some(mut user) = self.users.get_mut(username) else {
            return Ok(false);
        };
        if user.access_code.as_deref() != Some(code) {
            return Ok(false);
        }
        user.password_hash = password_hash.to_string();
        user.access_code = None;
        user.access_code_issued_at = None;
        user.iat = NO_SESSION;
        Ok(true)
    }
}
