//! Credential store for the personal storage server.
//!
//! [`UserStore`] is the only contract the services consume. Two
//! implementations exist: [`PgUserStore`] backed by PostgreSQL and
//! [`MemoryUserStore`] for tests and single-process deployments.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn};

use pss_core::config::{DatabaseConfig, StoreBackend};
use pss_core::result::AppResult;

pub use connection::open_pool;
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use store::{Guarded, UserStore};

/// Build the store selected by `database.backend`.
///
/// The PostgreSQL backend connects and applies pending migrations first.
pub async fn build_store(config: &DatabaseConfig) -> AppResult<Arc<dyn UserStore>> {
    match config.backend {
        StoreBackend::Postgres => {
            let pool = open_pool(config).await?;
            migration::run_migrations(&pool).await?;
            info!("Using PostgreSQL credential store");
            Ok(Arc::new(PgUserStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory credential store; accounts are lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}
