use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::repair::RepairError;
use crate::sync::SyncError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repair(#[from] RepairError),

    #[error("IO error: {0}")]
    #[diagnostic(code(d1_sync::cli::io))]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// The config error behind this failure, if any.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            CliError::Config(err) | CliError::Sync(SyncError::Config(err)) => Some(err),
            _ => None,
        }
    }
}
