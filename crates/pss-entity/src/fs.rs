//! Filesystem entries exposed to clients.
//!
//! Every `path` is relative to the storage root, `/`-delimited and never
//! contains `..` segments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file or directory under the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FsEntry {
    /// A regular file.
    File(FileInfo),
    /// A directory.
    Directory(DirectoryInfo),
}

impl FsEntry {
    /// The entry's own name (last path segment).
    pub fn name(&self) -> &str {
        match self {
            FsEntry::File(f) => &f.name,
            FsEntry::Directory(d) => &d.name,
        }
    }

    /// The root-relative path.
    pub fn path(&self) -> &str {
        match self {
            FsEntry::File(f) => &f.path,
            FsEntry::Directory(d) => &d.path,
        }
    }

    /// Returns `true` for directories.
    pub fn is_directory(&self) -> bool {
        matches!(self, FsEntry::Directory(_))
    }
}

/// Metadata of a regular file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name.
    pub name: String,
    /// Root-relative path.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time, when the platform reports one.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub modified_at: Option<DateTime<Utc>>,
}

/// A directory and its immediate children.
///
/// Children that are directories are listed without their own children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryInfo {
    /// Directory name (empty for the root).
    pub name: String,
    /// Root-relative path (empty for the root).
    pub path: String,
    /// Immediate children, directories first then by name.
    #[serde(default)]
    pub children: Vec<FsEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_carry_an_explicit_discriminant() {
        let entry = FsEntry::Directory(DirectoryInfo {
            name: "docs".to_string(),
            path: "docs".to_string(),
            children: vec![FsEntry::File(FileInfo {
                name: "a.txt".to_string(),
                path: "docs/a.txt".to_string(),
                size: 3,
                created_at: None,
                modified_at: None,
            })],
        });

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "directory");
        assert_eq!(json["children"][0]["type"], "file");
        assert_eq!(json["children"][0]["size"], 3);

        let back: FsEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
