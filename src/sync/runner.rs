//! Sync runner - drives a full remote-to-local sync.
//!
//! Coordinates config reading, source selection, export, cleaning, repair,
//! import and validation.

use chrono::Utc;
use colored::Colorize;
use miette::Diagnostic;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::{
    cleaner::{CleanError, clean_local_database},
    paths::{DEFAULT_EXPORT_DIR, WRANGLER_STATE_DIR, export_file_path, fixed_file_path},
    prompt::{PromptError, Prompter},
    validate::{TableCount, render_counts, validate_sync},
    wrangler::{WranglerError, WranglerOps},
};
use crate::config::{ConfigError, DatabaseTarget, DatabaseTargets};
use crate::locale::Messages;
use crate::repair::{RepairError, RepairSummary, repair_file};

/// Errors that can occur during a sync.
#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Wrangler(#[from] WranglerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Clean(#[from] CleanError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repair(#[from] RepairError),

    #[error("Unknown source database '{key}' (available: {available})")]
    #[diagnostic(
        code(d1_sync::sync::unknown_target),
        help("Run `d1-sync list` to see the configured targets.")
    )]
    UnknownTarget { key: String, available: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(d1_sync::sync::io))]
    Io(#[from] std::io::Error),
}

/// Knobs for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Target key to sync from. Prompts when `None`.
    pub source: Option<String>,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
    /// Keep the raw and repaired dumps after a successful import.
    pub keep_exports: bool,
    pub validate: bool,
    pub export_dir: PathBuf,
    /// Wrangler's local state directory.
    pub state_dir: PathBuf,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            source: None,
            assume_yes: false,
            keep_exports: false,
            validate: true,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            state_dir: PathBuf::from(WRANGLER_STATE_DIR),
        }
    }
}

/// How a sync run ended.
#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// The user declined the confirmation.
    Cancelled,
    /// The user aborted the source selection.
    NoSelection,
}

/// What a completed sync did.
#[derive(Debug)]
pub struct SyncReport {
    pub source: DatabaseTarget,
    pub local: DatabaseTarget,
    pub cleaned_files: usize,
    pub repair: RepairSummary,
    /// `None` when validation was skipped or failed.
    pub tables: Option<Vec<TableCount>>,
    /// Dump files left on disk (only with `keep_exports`).
    pub kept_files: Vec<PathBuf>,
}

/// Sync runner handles one remote-to-local sync.
pub struct SyncRunner<W: WranglerOps, P: Prompter> {
    wrangler: W,
    prompter: P,
    messages: &'static Messages,
    options: SyncOptions,
}

impl<W: WranglerOps, P: Prompter> SyncRunner<W, P> {
    pub fn new(wrangler: W, prompter: P, messages: &'static Messages) -> Self {
        Self {
            wrangler,
            prompter,
            messages,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the whole sync against the wrangler config at `config_path`,
    /// printing progress to `out`.
    pub fn run(&self, config_path: &Path, out: &mut impl Write) -> Result<SyncOutcome, SyncError> {
        let m = self.messages;

        writeln!(out, "{}\n", m.title.bold())?;
        writeln!(out, "{}", m.reading_config)?;
        let targets = DatabaseTargets::load(config_path)?;
        writeln!(out, "{} {}", "✓".green(), m.found_config)?;

        let local = targets.local().ok_or(ConfigError::NoLocalDatabase)?;
        writeln!(
            out,
            "{}: {}\n",
            m.local_database,
            local.database_name.cyan()
        )?;

        let Some(source) = self.select_source(&targets)? else {
            writeln!(out, "{}", m.no_db_selected.yellow())?;
            return Ok(SyncOutcome::NoSelection);
        };

        writeln!(
            out,
            "\n{} {}",
            "⚠".yellow(),
            m.sync_warning(&source.label()).yellow()
        )?;
        if !self.options.assume_yes && !self.prompter.confirm(m.confirm_replace)? {
            writeln!(out, "{}", m.cancelled.yellow())?;
            return Ok(SyncOutcome::Cancelled);
        }

        std::fs::create_dir_all(&self.options.export_dir)?;
        let export_file = export_file_path(&self.options.export_dir, Utc::now());
        let fixed_file = fixed_file_path(&export_file);

        writeln!(out, "\n{}", m.exporting_db)?;
        self.wrangler.export(source, &export_file)?;
        writeln!(out, "{} {}", "✓".green(), m.export_complete)?;

        writeln!(out, "{}", m.cleaning_local)?;
        let cleaned_files = clean_local_database(&self.options.state_dir, local)?;
        writeln!(out, "{} {}", "✓".green(), m.cleaned_local(cleaned_files))?;

        writeln!(out, "{}", m.processing_export)?;
        let repair = repair_file(&export_file, &fixed_file)?;
        writeln!(out, "{} {}", "✓".green(), m.export_processed)?;

        writeln!(out, "{}", m.importing_local)?;
        self.wrangler
            .execute_file(&local.database_name, &fixed_file)?;
        writeln!(out, "{} {}", "✓".green(), m.import_complete)?;

        let kept_files = if self.options.keep_exports {
            vec![export_file, fixed_file]
        } else {
            remove_quietly(&export_file);
            remove_quietly(&fixed_file);
            Vec::new()
        };

        let tables = if self.options.validate {
            self.validate(local, out)?
        } else {
            None
        };

        writeln!(out, "\n{}", m.sync_success.green().bold())?;
        info!(
            source = %source.database_name,
            local = %local.database_name,
            statements = repair.statements,
            "sync completed"
        );

        Ok(SyncOutcome::Completed(SyncReport {
            source: source.clone(),
            local: local.clone(),
            cleaned_files,
            repair,
            tables,
            kept_files,
        }))
    }

    /// Resolve the source target from `--source` or an interactive selection.
    fn select_source<'t>(
        &self,
        targets: &'t DatabaseTargets,
    ) -> Result<Option<&'t DatabaseTarget>, SyncError> {
        if let Some(key) = &self.options.source {
            return targets
                .get(key)
                .map(Some)
                .ok_or_else(|| SyncError::UnknownTarget {
                    key: key.clone(),
                    available: targets.keys().join(", "),
                });
        }

        let items: Vec<String> = targets
            .iter()
            .map(|t| format!("{} - {}: {}", t.label(), self.messages.binding, t.binding))
            .collect();
        let choice = self.prompter.select(self.messages.select_source, &items)?;
        Ok(choice.and_then(|i| targets.iter().nth(i)))
    }

    /// Count the local tables. Failures are reported but never fail the sync.
    fn validate(
        &self,
        local: &DatabaseTarget,
        out: &mut impl Write,
    ) -> Result<Option<Vec<TableCount>>, SyncError> {
        let m = self.messages;
        match validate_sync(&self.wrangler, &local.database_name) {
            Ok(counts) => {
                writeln!(out, "\n{}", m.synced_tables(counts.len()))?;
                writeln!(out, "{}", render_counts(&counts, m))?;
                Ok(Some(counts))
            }
            Err(e) => {
                warn!(error = %e, "validation failed");
                writeln!(out, "\n{} {}", m.validation_failed.yellow(), e)?;
                Ok(None)
            }
        }
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(file = %path.display(), error = %e, "could not remove export file");
    }
}
