//! Path resolution for export files and wrangler state.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Default directory for exported and repaired dumps, relative to the project.
pub const DEFAULT_EXPORT_DIR: &str = ".d1-sync-exports";

/// Directory where wrangler keeps local D1 state.
pub const WRANGLER_STATE_DIR: &str = ".wrangler";

/// Timestamped export file path inside `dir`.
///
/// Colons are replaced so the name is valid on every filesystem:
/// `export_2024-05-01T12-30-00.sql`.
pub fn export_file_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    dir.join(format!("export_{}.sql", at.format("%Y-%m-%dT%H-%M-%S")))
}

/// Path of the repaired dump written next to `export`.
pub fn fixed_file_path(export: &Path) -> PathBuf {
    let stem = export
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    let ext = export
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sql".to_string());
    export.with_file_name(format!("{stem}_fixed.{ext}"))
}
