//! Path confinement.
//!
//! Client paths are root-relative, `/`-delimited strings. [`Sandbox::confine`]
//! first normalises them lexically, rejecting anything that could climb out
//! of the root, and only then touches the filesystem to make sure no symlink
//! on the way leads outside.

use std::path::{Path, PathBuf};

use pss_core::error::AppError;
use pss_core::result::AppResult;

/// A path proven to lie inside the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfinedPath {
    relative: String,
    absolute: PathBuf,
}

impl ConfinedPath {
    /// Normalised root-relative path (`""` for the root itself).
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Absolute location on disk.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Returns `true` if this is the storage root.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Last path segment (`""` for the root).
    pub fn name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or("")
    }
}

/// The storage root and the rules for staying inside it.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Creates a sandbox over an already canonical root directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexical normalisation. Never touches the filesystem.
    ///
    /// Empty and `.` segments are dropped. `..`, backslashes, NUL bytes and
    /// drive prefixes are rejected outright rather than resolved.
    pub fn normalize(path: &str) -> AppResult<String> {
        let mut segments = Vec::new();

        for (i, segment) in path.split('/').enumerate() {
            match segment {
                "" | "." => continue,
                ".." => return Err(escape_error(path)),
                _ => {}
            }
            if segment.contains('\\') || segment.contains('\0') {
                return Err(escape_error(path));
            }
            if i <= 1 && segments.is_empty() && is_drive_prefix(segment) {
                return Err(escape_error(path));
            }
            segments.push(segment);
        }

        Ok(segments.join("/"))
    }

    /// Normalises `path` and confirms it stays under the root.
    ///
    /// Every existing component that is a symlink must resolve to a location
    /// inside the root. Dangling links are refused because creating the
    /// path would follow them to wherever they point.
    pub async fn confine(&self, path: &str) -> AppResult<ConfinedPath> {
        let relative = Self::normalize(path)?;
        let absolute = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&relative)
        };

        self.check_links(&relative, path).await?;

        Ok(ConfinedPath { relative, absolute })
    }

    /// Walks the path from the root down to the first component that does
    /// not exist.
    async fn check_links(&self, relative: &str, original: &str) -> AppResult<()> {
        let mut current = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            current.push(segment);

            let meta = match tokio::fs::symlink_metadata(&current).await {
                Ok(meta) => meta,
                Err(e) if is_absent(&e) => return Ok(()),
                Err(e) => return Err(resolve_error(original, &e)),
            };
            if !meta.file_type().is_symlink() {
                continue;
            }

            match tokio::fs::canonicalize(&current).await {
                Ok(real) if real.starts_with(&self.root) => {}
                Ok(_) => return Err(escape_error(original)),
                Err(e) if is_absent(&e) => {
                    return Err(AppError::filesystem(format!(
                        "Path '{original}' goes through a dangling link"
                    )));
                }
                Err(e) => return Err(resolve_error(original, &e)),
            }
        }
        Ok(())
    }
}

/// `NotFound`, or a file used as a directory further up the path.
fn is_absent(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

fn resolve_error(path: &str, error: &std::io::Error) -> AppError {
    AppError::filesystem(format!("Cannot resolve '{path}': {error}"))
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn escape_error(path: &str) -> AppError {
    AppError::filesystem(format!("Path '{path}' is outside the storage root"))
}
