//! PostgreSQL pool setup for the credential store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use pss_core::config::{DatabaseConfig, mask_password};
use pss_core::error::{AppError, ErrorKind};
use pss_core::result::AppResult;

/// Opens the pool described by `database.*`.
///
/// An idle timeout of zero keeps idle connections forever.
pub async fn open_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let target = mask_password(&config.url);
    debug!(
        url = %target,
        max = config.max_connections,
        min = config.min_connections,
        "Opening credential store pool"
    );

    let idle = (config.idle_timeout_seconds > 0)
        .then(|| Duration::from_secs(config.idle_timeout_seconds));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(idle)
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Cannot reach credential store at {target}: {e}"),
                e,
            )
        })?;

    info!(url = %target, "Credential store pool ready");
    Ok(pool)
}
