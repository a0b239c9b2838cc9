//! The storage service.
//!
//! Every public method confines its path argument before doing anything
//! else. Concurrent writers to the same path are not serialised; the last
//! one to finish wins.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use pss_core::config::StorageConfig;
use pss_core::error::AppError;
use pss_core::result::AppResult;
use pss_entity::disk::DiskUsage;
use pss_entity::fs::{DirectoryInfo, FsEntry};

use crate::ByteStream;
use crate::listing::read_children;
use crate::sandbox::{ConfinedPath, Sandbox};
use crate::search;
use crate::volume::{SystemVolumeProbe, VolumeProbe};

/// An open file ready to be streamed to a client.
pub struct FileDownload {
    /// File name (last path segment).
    pub name: String,
    /// Size in bytes at open time.
    pub size: u64,
    /// File contents.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish()
    }
}

/// Filesystem operations confined to the storage root.
#[derive(Debug, Clone)]
pub struct StorageService {
    sandbox: Sandbox,
    probe: Arc<dyn VolumeProbe>,
    max_upload_bytes: u64,
    search_case_sensitive: bool,
}

impl StorageService {
    /// Creates the root if needed and probes the real volume.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        Self::with_probe(config, Arc::new(SystemVolumeProbe)).await
    }

    /// Same as [`new`](Self::new) with a custom volume probe.
    pub async fn with_probe(
        config: &StorageConfig,
        probe: Arc<dyn VolumeProbe>,
    ) -> AppResult<Self> {
        fs::create_dir_all(&config.root).await.map_err(|e| {
            AppError::configuration(format!(
                "Failed to create storage root '{}': {e}",
                config.root
            ))
        })?;
        let root = fs::canonicalize(&config.root).await.map_err(|e| {
            AppError::configuration(format!(
                "Failed to resolve storage root '{}': {e}",
                config.root
            ))
        })?;

        info!(root = %root.display(), "Storage root ready");

        Ok(Self {
            sandbox: Sandbox::new(root),
            probe,
            max_upload_bytes: config.max_upload_size_bytes(),
            search_case_sensitive: config.search_case_sensitive,
        })
    }

    /// The canonical storage root.
    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// The per-upload limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Normalises `path` and proves it lies inside the root.
    pub async fn normalize_and_confine(&self, path: &str) -> AppResult<ConfinedPath> {
        self.sandbox.confine(path).await
    }

    /// Whether anything exists at `path`.
    pub async fn exists(&self, path: &str) -> AppResult<bool> {
        let target = self.sandbox.confine(path).await?;
        Ok(fs::symlink_metadata(target.absolute()).await.is_ok())
    }

    /// Whether `path` is a directory.
    pub async fn is_directory(&self, path: &str) -> AppResult<bool> {
        let target = self.sandbox.confine(path).await?;
        Ok(fs::metadata(target.absolute())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    /// Lists the immediate children of a directory.
    pub async fn get_directory_info(&self, path: &str) -> AppResult<DirectoryInfo> {
        let target = self.sandbox.confine(path).await?;
        let meta = stat(&target).await?;
        if !meta.is_dir() {
            return Err(AppError::filesystem(format!(
                "'{}' is not a directory",
                target.relative()
            )));
        }

        let children = read_children(target.absolute(), target.relative()).await?;
        Ok(DirectoryInfo {
            name: target.name().to_string(),
            path: target.relative().to_string(),
            children,
        })
    }

    /// Every entry at any depth whose name contains `query`.
    pub async fn search(&self, query: &str) -> AppResult<Vec<FsEntry>> {
        let results = search::search(self.root(), query, self.search_case_sensitive).await?;
        debug!(query, hits = results.len(), "Search completed");
        Ok(results)
    }

    /// Removes a file, or a directory with everything below it.
    pub async fn delete_path(&self, path: &str) -> AppResult<()> {
        let target = self.sandbox.confine(path).await?;
        if target.is_root() {
            return Err(AppError::filesystem("Cannot delete root"));
        }

        let meta = fs::symlink_metadata(target.absolute())
            .await
            .map_err(|e| path_error(&target, e))?;

        let result = if meta.is_dir() {
            fs::remove_dir_all(target.absolute()).await
        } else {
            fs::remove_file(target.absolute()).await
        };
        result.map_err(|e| {
            AppError::filesystem(format!("Failed to delete '{}': {e}", target.relative()))
        })?;

        info!(path = %target.relative(), "Deleted");
        Ok(())
    }

    /// Creates a directory and any missing parents. Succeeds if it exists.
    pub async fn create_directory(&self, path: &str) -> AppResult<()> {
        let target = self.sandbox.confine(path).await?;
        fs::create_dir_all(target.absolute()).await.map_err(|e| {
            AppError::filesystem(format!(
                "Failed to create directory '{}': {e}",
                target.relative()
            ))
        })?;
        debug!(path = %target.relative(), "Directory ensured");
        Ok(())
    }

    /// Opens a file for streaming without buffering it.
    pub async fn read_file(&self, path: &str) -> AppResult<FileDownload> {
        let target = self.sandbox.confine(path).await?;
        let meta = stat(&target).await?;
        if !meta.is_file() {
            return Err(AppError::filesystem(format!(
                "'{}' is not a file",
                target.relative()
            )));
        }

        let file = fs::File::open(target.absolute())
            .await
            .map_err(|e| path_error(&target, e))?;

        Ok(FileDownload {
            name: target.name().to_string(),
            size: meta.len(),
            stream: Box::pin(ReaderStream::new(file)),
        })
    }

    /// Streams an upload to `path`.
    ///
    /// The declared length is checked against the upload limit, then against
    /// the live free space, before anything is created on disk. If the
    /// stream fails or delivers a different number of bytes than declared,
    /// the partial file is removed and the upload fails.
    pub async fn write_file(
        &self,
        path: &str,
        mut stream: ByteStream,
        declared_length: u64,
    ) -> AppResult<u64> {
        let target = self.sandbox.confine(path).await?;
        if target.is_root() {
            return Err(AppError::filesystem("Cannot write to root"));
        }

        if declared_length > self.max_upload_bytes {
            return Err(AppError::filesystem(format!(
                "File size {declared_length} exceeds the upload limit of {} bytes",
                self.max_upload_bytes
            )));
        }

        let usage = self.get_disk_info().await?;
        if declared_length > usage.available_bytes {
            return Err(AppError::filesystem(format!(
                "Not enough disk space: {declared_length} bytes requested, {} available",
                usage.available_bytes
            )));
        }

        if let Ok(meta) = fs::metadata(target.absolute()).await {
            if meta.is_dir() {
                return Err(AppError::filesystem(format!(
                    "'{}' is a directory",
                    target.relative()
                )));
            }
        }

        if let Some(parent) = target.absolute().parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::filesystem(format!("Failed to create parent directory: {e}"))
            })?;
        }

        let mut file = fs::File::create(target.absolute()).await.map_err(|e| {
            AppError::filesystem(format!("Failed to create '{}': {e}", target.relative()))
        })?;

        let outcome = async {
            let mut written = 0u64;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::filesystem(format!("Upload stream error: {e}")))?;
                written += chunk.len() as u64;
                if written > declared_length {
                    return Err(AppError::filesystem(
                        "Upload is larger than its declared length",
                    ));
                }
                file.write_all(&chunk)
                    .await
                    .map_err(|e| AppError::filesystem(format!("Failed to write: {e}")))?;
            }
            file.flush()
                .await
                .map_err(|e| AppError::filesystem(format!("Failed to flush: {e}")))?;
            if written != declared_length {
                return Err(AppError::filesystem(format!(
                    "Upload ended after {written} of {declared_length} bytes"
                )));
            }
            Ok::<u64, AppError>(written)
        }
        .await;

        match outcome {
            Ok(written) => {
                info!(path = %target.relative(), bytes = written, "Upload stored");
                Ok(written)
            }
            Err(e) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(target.absolute()).await {
                    warn!(
                        path = %target.relative(),
                        error = %cleanup,
                        "Failed to remove partial upload"
                    );
                }
                warn!(path = %target.relative(), error = %e.message, "Upload failed");
                Err(e)
            }
        }
    }

    /// Total and available bytes on the storage volume, read fresh.
    pub async fn get_disk_info(&self) -> AppResult<DiskUsage> {
        self.probe.usage(self.root()).await
    }
}

async fn stat(target: &ConfinedPath) -> AppResult<std::fs::Metadata> {
    fs::metadata(target.absolute())
        .await
        .map_err(|e| path_error(target, e))
}

fn path_error(target: &ConfinedPath, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::filesystem(format!("Path '{}' not found", target.relative()))
    } else {
        AppError::filesystem(format!("Cannot access '{}': {e}", target.relative()))
    }
}
