//! Recursive name search over the whole storage tree.

use std::path::{Path, PathBuf};

use pss_core::result::AppResult;
use pss_entity::fs::FsEntry;

use crate::listing::read_children;

/// Returns every entry below `root`, at any depth, whose name contains
/// `query`. Results are ordered by path.
///
/// Traversal uses an explicit work stack so deep trees cannot overflow the
/// call stack. Cost is proportional to the total number of entries.
pub async fn search(root: &Path, query: &str, case_sensitive: bool) -> AppResult<Vec<FsEntry>> {
    let needle = if case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };

    let mut results = Vec::new();
    let mut stack: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];

    while let Some((absolute, relative)) = stack.pop() {
        for entry in read_children(&absolute, &relative).await? {
            if entry.is_directory() {
                stack.push((root.join(entry.path()), entry.path().to_string()));
            }

            let matched = if case_sensitive {
                entry.name().contains(&needle)
            } else {
                entry.name().to_lowercase().contains(&needle)
            };
            if matched {
                results.push(entry);
            }
        }
    }

    results.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        tokio::fs::create_dir_all(root.join("reports/2023/q1")).await.unwrap();
        tokio::fs::create_dir_all(root.join("misc")).await.unwrap();
        tokio::fs::write(root.join("reports/2023/q1/annual_report.pdf"), b"x")
            .await
            .unwrap();
        tokio::fs::write(root.join("misc/Report-old.txt"), b"x").await.unwrap();
        tokio::fs::write(root.join("misc/notes.txt"), b"x").await.unwrap();
        dir
    }

    #[tokio::test]
    async fn finds_matches_at_every_depth() {
        let dir = tree().await;
        let hits = search(dir.path(), "report", true).await.unwrap();
        let paths: Vec<&str> = hits.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["reports", "reports/2023/q1/annual_report.pdf"]);
        assert!(hits[0].is_directory());
    }

    #[tokio::test]
    async fn case_insensitive_mode() {
        let dir = tree().await;
        let hits = search(dir.path(), "REPORT", false).await.unwrap();
        let paths: Vec<&str> = hits.iter().map(|e| e.path()).collect();
        assert_eq!(
            paths,
            vec![
                "misc/Report-old.txt",
                "reports",
                "reports/2023/q1/annual_report.pdf"
            ]
        );
    }

    #[tokio::test]
    async fn no_matches_is_empty() {
        let dir = tree().await;
        assert!(search(dir.path(), "zzz", true).await.unwrap().is_empty());
    }
}
