//! One-level directory listings.

use std::fs::Metadata;
use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::fs;

use pss_core::error::AppError;
use pss_core::result::AppResult;
use pss_entity::fs::{DirectoryInfo, FileInfo, FsEntry};

/// Joins a root-relative parent and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Builds the file variant from metadata.
pub fn file_info(name: &str, relative: &str, meta: &Metadata) -> FileInfo {
    FileInfo {
        name: name.to_string(),
        path: relative.to_string(),
        size: meta.len(),
        created_at: meta.created().ok().map(DateTime::<Utc>::from),
        modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
    }
}

/// Lists the immediate children of `absolute`, whose root-relative path is
/// `relative`. Directories come first, then entries sort by name.
///
/// Symbolic links are left out; only regular files and directories appear.
pub async fn read_children(absolute: &Path, relative: &str) -> AppResult<Vec<FsEntry>> {
    let mut dir = fs::read_dir(absolute)
        .await
        .map_err(|e| AppError::filesystem(format!("Failed to list '{relative}': {e}")))?;

    let mut entries = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| AppError::filesystem(format!("Failed to read directory entry: {e}")))?
    {
        let meta = match fs::symlink_metadata(entry.path()).await {
            Ok(meta) => meta,
            // Removed between read_dir and stat.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(AppError::filesystem(format!(
                    "Failed to read metadata in '{relative}': {e}"
                )));
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let path = join(relative, &name);

        if meta.is_dir() {
            entries.push(FsEntry::Directory(DirectoryInfo {
                name,
                path,
                children: Vec::new(),
            }));
        } else if meta.is_file() {
            entries.push(FsEntry::File(file_info(&name, &path, &meta)));
        }
    }

    entries.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name().cmp(b.name()))
    });

    Ok(entries)
}
