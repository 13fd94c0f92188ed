//! Wrangler operations for sync functionality.
//!
//! This module provides a trait-based abstraction over `wrangler d1` commands
//! to enable easy mocking in tests.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

use crate::config::DatabaseTarget;

/// Errors that can occur during wrangler operations.
#[derive(Error, Diagnostic, Debug)]
pub enum WranglerError {
    #[error("Wrangler command failed: {0}")]
    #[diagnostic(code(d1_sync::sync::wrangler::command_failed))]
    CommandFailed(String),

    #[error("Wrangler command returned non-zero exit code {code}: {output}")]
    #[diagnostic(code(d1_sync::sync::wrangler::non_zero_exit))]
    NonZeroExit { code: i32, output: String },

    #[error("npx not installed or not in PATH")]
    #[diagnostic(
        code(d1_sync::sync::wrangler::not_found),
        help("Install Node.js so that `npx wrangler` can be run.")
    )]
    NpxNotFound,

    #[error("Unexpected wrangler output: {0}")]
    #[diagnostic(code(d1_sync::sync::wrangler::invalid_output))]
    InvalidOutput(String),
}

/// Trait for wrangler D1 operations. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait WranglerOps {
    /// Export a remote database to a SQL file.
    fn export(&self, target: &DatabaseTarget, output: &Path) -> Result<Output, WranglerError>;

    /// Execute a SQL file against the local copy of a database.
    fn execute_file(&self, database: &str, file: &Path) -> Result<Output, WranglerError>;

    /// Run a single SQL command against the local copy of a database, with
    /// JSON output.
    fn execute_command(&self, database: &str, sql: &str) -> Result<Output, WranglerError>;
}

/// Real implementation of WranglerOps using `npx wrangler`.
#[derive(Debug, Clone)]
pub struct NpxWrangler {
    program: String,
    working_dir: Option<PathBuf>,
}

impl NpxWrangler {
    pub fn new() -> Self {
        Self {
            program: "npx".to_string(),
            working_dir: None,
        }
    }

    /// Launch wrangler through another runner (e.g. `bunx`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run wrangler from a specific project directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Helper to run a wrangler command and return the output.
    fn run_wrangler(&self, args: &[String]) -> Result<Output, WranglerError> {
        debug!(program = %self.program, ?args, "running wrangler");

        let mut command = Command::new(&self.program);
        command.arg("wrangler").args(args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WranglerError::NpxNotFound
            } else {
                WranglerError::CommandFailed(e.to_string())
            }
        })
    }

    /// Check if the output indicates success, otherwise return an error.
    fn check_output(&self, output: Output) -> Result<Output, WranglerError> {
        if output.status.success() {
            Ok(output)
        } else {
            let code = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let combined = if !stdout.is_empty() && !stderr.is_empty() {
                format!("{}\n{}", stdout, stderr)
            } else if !stdout.is_empty() {
                stdout
            } else {
                stderr
            };
            Err(WranglerError::NonZeroExit {
                code,
                output: combined,
            })
        }
    }
}

impl Default for NpxWrangler {
    fn default() -> Self {
        Self::new()
    }
}

impl WranglerOps for NpxWrangler {
    #[instrument(skip(self, target), fields(database = %target.database_name))]
    fn export(&self, target: &DatabaseTarget, output: &Path) -> Result<Output, WranglerError> {
        let output = self.run_wrangler(&export_args(target, output))?;
        self.check_output(output)
    }

    #[instrument(skip(self))]
    fn execute_file(&self, database: &str, file: &Path) -> Result<Output, WranglerError> {
        let output = self.run_wrangler(&execute_file_args(database, file))?;
        self.check_output(output)
    }

    #[instrument(skip(self))]
    fn execute_command(&self, database: &str, sql: &str) -> Result<Output, WranglerError> {
        let output = self.run_wrangler(&execute_command_args(database, sql))?;
        self.check_output(output)
    }
}

/// Arguments for `wrangler d1 export` of a remote database.
pub(crate) fn export_args(target: &DatabaseTarget, output: &Path) -> Vec<String> {
    let mut args = vec![
        "d1".to_string(),
        "export".to_string(),
        target.database_name.clone(),
    ];
    if let Some(env) = &target.env {
        args.push("--env".to_string());
        args.push(env.clone());
    }
    args.push("--remote".to_string());
    args.push(format!("--output={}", output.display()));
    args
}

/// Arguments for importing a SQL file into the local store.
pub(crate) fn execute_file_args(database: &str, file: &Path) -> Vec<String> {
    vec![
        "d1".to_string(),
        "execute".to_string(),
        database.to_string(),
        "--local".to_string(),
        format!("--file={}", file.display()),
    ]
}

/// Arguments for a single JSON-producing query against the local store.
pub(crate) fn execute_command_args(database: &str, sql: &str) -> Vec<String> {
    vec![
        "d1".to_string(),
        "execute".to_string(),
        database.to_string(),
        "--local".to_string(),
        "--json".to_string(),
        format!("--command={}", sql),
    ]
}
