//! Schema migrations for the `users` table.

use sqlx::PgPool;
use tracing::info;

use pss_core::error::{AppError, ErrorKind};
use pss_core::result::AppResult;

/// Applies pending migrations from `migrations/` at the workspace root.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Credential store migration failed: {e}"),
            e,
        )
    })?;

    info!(known = migrator.iter().count(), "Credential store schema up to date");
    Ok(())
}
