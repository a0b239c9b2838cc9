//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use pss_core::error::{AppError, ErrorKind};
use pss_core::result::AppResult;
use pss_entity::user::{NewUser, User};

use crate::store::{Guarded, UserStore};

/// Credential store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a transaction holding the admin lock until it ends.
    async fn admin_transaction(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock admin changes"))?;
        Ok(tx)
    }
}

async fn admin_flag(
    tx: &mut Transaction<'static, Postgres>,
    username: &str,
) -> AppResult<Option<bool>> {
    sqlx::query_scalar::<_, bool>("SELECT admin FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("Failed to find user"))
}

async fn admin_count(tx: &mut Transaction<'static, Postgres>) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE admin")
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to count admins"))
}

/// Advisory lock key serialising changes to the set of admins.
const ADMIN_LOCK_KEY: i64 = 0x7073_735f_6164_6d6e;

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, admin) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false);
            if unique {
                AppError::conflict(format!("User '{}' already exists", user.username))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create user", e)
            }
        })
    }

    async fn delete(&self, username: &str) -> AppResult<Guarded> {
        let mut tx = self.admin_transaction().await?;
        let Some(admin) = admin_flag(&mut tx, username).await? else {
            return Ok(Guarded::Missing);
        };
        if admin && admin_count(&mut tx).await? <= 1 {
            return Ok(Guarded::LastAdmin);
        }

        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete user"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to delete user"))?;

        Ok(if result.rows_affected() > 0 {
            Guarded::Applied
        } else {
            Guarded::Missing
        })
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))
    }

    async fn grant_admin(&self, username: &str) -> AppResult<bool> {
        let mut tx = self.admin_transaction().await?;
        let result = sqlx::query("UPDATE users SET admin = TRUE WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update admin flag"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to update admin flag"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_admin(&self, username: &str) -> AppResult<Guarded> {
        let mut tx = self.admin_transaction().await?;
        if admin_flag(&mut tx, username).await? != Some(true) {
            return Ok(Guarded::Missing);
        }
        if admin_count(&mut tx).await? <= 1 {
            return Ok(Guarded::LastAdmin);
        }

        sqlx::query("UPDATE users SET admin = FALSE WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to update admin flag"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to update admin flag"))?;
        Ok(Guarded::Applied)
    }

    async fn advance_iat(&self, username: &str, floor: i64) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET iat = GREATEST(iat + 1, $2) WHERE username = $1 RETURNING iat",
        )
        .bind(username)
        .bind(floor)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to advance session counter"))
    }

    async fn clear_iat(&self, username: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET iat = 0 WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clear session counter"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, access_code = NULL, \
             access_code_issued_at = NULL, iat = 0 WHERE username = $1",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_access_code(
        &self,
        username: &str,
        code: &str,
        issued_at: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET access_code = $2, access_code_issued_at = $3 WHERE username = $1",
        )
        .bind(username)
        .bind(code)
        .bind(issued_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store access code"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn redeem_access_code(
        &self,
        username: &str,
        code: &str,
        password_hash: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $3, access_code = NULL, \
             access_code_issued_at = NULL, iat = 0 \
             WHERE username = $1 AND access_code = $2",
        )
        .bind(username)
        .bind(code)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to redeem access code"))?;
        Ok(result.rows_affected() > 0)
    }
}
