//! Sync module - remote D1 to local synchronization.
//!
//! This module exports a remote database with wrangler, repairs the dump,
//! wipes the local store and imports the repaired dump into it.

mod cleaner;
mod paths;
mod prompt;
mod runner;
mod validate;
mod wrangler;
#[cfg(test)]
mod wrangler_test;

pub use cleaner::{CleanError, clean_local_database};
pub use paths::{DEFAULT_EXPORT_DIR, WRANGLER_STATE_DIR, export_file_path, fixed_file_path};
#[cfg(test)]
pub use prompt::MockPrompter;
pub use prompt::{PromptError, Prompter, TerminalPrompter};
pub use runner::{SyncError, SyncOptions, SyncOutcome, SyncReport, SyncRunner};
pub use validate::{TableCount, count_rows, list_tables, render_counts, validate_sync};
#[cfg(test)]
pub use wrangler::MockWranglerOps;
pub use wrangler::{NpxWrangler, WranglerError, WranglerOps};
