//! Volume statistics for quota checks and the free-space endpoint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use pss_core::error::AppError;
use pss_core::result::AppResult;
use pss_entity::disk::DiskUsage;

/// Reports size and free space of the volume holding a path.
#[async_trait]
pub trait VolumeProbe: Send + Sync + std::fmt::Debug + 'static {
    /// Current usage; never cached.
    async fn usage(&self, path: &Path) -> AppResult<DiskUsage>;
}

/// Queries the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumeProbe;

#[async_trait]
impl VolumeProbe for SystemVolumeProbe {
    async fn usage(&self, path: &Path) -> AppResult<DiskUsage> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let total_bytes = fs2::total_space(&path)?;
            let available_bytes = fs2::available_space(&path)?;
            Ok::<_, std::io::Error>(DiskUsage {
                total_bytes,
                available_bytes,
            })
        })
        .await
        .map_err(|e| AppError::internal(format!("Disk probe task failed: {e}")))?
        .map_err(|e| AppError::filesystem(format!("Failed to read disk usage: {e}")))
    }
}
