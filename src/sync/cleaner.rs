//! Removal of stale local D1 state before an import.
//!
//! Wrangler keeps local D1 databases as files under `.wrangler/`. Any file
//! whose name contains the database name (or id) is deleted so that the
//! import starts from an empty store.

use miette::Diagnostic;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DatabaseTarget;

#[derive(Error, Diagnostic, Debug)]
pub enum CleanError {
    #[error("Failed to read directory {}: {source}", .path.display())]
    #[diagnostic(code(d1_sync::sync::cleaner::read_dir))]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Delete local state files belonging to `target` under `state_dir`.
///
/// Returns the number of files removed. A missing `state_dir` removes nothing.
/// Files that cannot be deleted are logged and skipped.
pub fn clean_local_database(state_dir: &Path, target: &DatabaseTarget) -> Result<usize, CleanError> {
    let needles: Vec<&str> = std::iter::once(target.database_name.as_str())
        .chain(target.database_id.as_deref())
        .filter(|n| !n.is_empty())
        .collect();

    if needles.is_empty() || !state_dir.is_dir() {
        return Ok(0);
    }

    let deleted = remove_matching(state_dir, &needles)?;
    debug!(dir = %state_dir.display(), deleted, "cleaned local state");
    Ok(deleted)
}

fn remove_matching(dir: &Path, needles: &[&str]) -> Result<usize, CleanError> {
    let read_dir_error = |source| CleanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut deleted = 0;

    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(read_dir_error)?;

        if file_type.is_dir() {
            deleted += remove_matching(&path, needles)?;
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !needles.iter().any(|needle| name.contains(needle)) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(file = %path.display(), "removed local state file");
                deleted += 1;
            }
            Err(e) => warn!(file = %path.display(), error = %e, "could not remove local state file"),
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn target(name: &str, id: Option<&str>) -> DatabaseTarget {
        DatabaseTarget {
            key: "local".to_string(),
            display_name: "Local/Default".to_string(),
            binding: "DB".to_string(),
            database_name: name.to_string(),
            database_id: id.map(str::to_string),
            env: None,
        }
    }

    #[test]
    fn test_missing_state_dir_removes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let removed =
            clean_local_database(&temp_dir.path().join(".wrangler"), &target("app", None)).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_removes_matching_files_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let d1_dir = temp_dir.path().join("state/v3/d1/miniflare-D1DatabaseObject");
        fs::create_dir_all(&d1_dir).unwrap();
        fs::write(d1_dir.join("app-dev.sqlite"), "").unwrap();
        fs::write(d1_dir.join("app-dev.sqlite-wal"), "").unwrap();
        fs::write(d1_dir.join("other.sqlite"), "").unwrap();
        fs::write(temp_dir.path().join("app-dev.lock"), "").unwrap();

        let removed = clean_local_database(temp_dir.path(), &target("app-dev", None)).unwrap();

        assert_eq!(removed, 3);
        assert!(d1_dir.join("other.sqlite").exists());
        assert!(!d1_dir.join("app-dev.sqlite").exists());
        assert!(d1_dir.exists());
    }

    #[test]
    fn test_matches_database_id() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("1234-abcd.sqlite"), "").unwrap();
        fs::write(temp_dir.path().join("unrelated.sqlite"), "").unwrap();

        let removed =
            clean_local_database(temp_dir.path(), &target("app-dev", Some("1234-abcd"))).unwrap();

        assert_eq!(removed, 1);
        assert!(temp_dir.path().join("unrelated.sqlite").exists());
    }

    #[test]
    fn test_empty_name_matches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("keep.sqlite"), "").unwrap();

        let removed = clean_local_database(temp_dir.path(), &target("", Some(""))).unwrap();

        assert_eq!(removed, 0);
        assert!(temp_dir.path().join("keep.sqlite").exists());
    }
}
