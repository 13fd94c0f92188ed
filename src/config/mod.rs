//! `wrangler.toml` reading.
//!
//! Only the D1 bindings are of interest. The top-level `[[d1_databases]]`
//! entry is the local/default target, every `[env.<name>]` with its own
//! `[[env.<name>.d1_databases]]` becomes a target named after the environment.

use miette::Diagnostic;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key of the top-level (non-environment) target.
pub const LOCAL_KEY: &str = "local";

/// Errors that can occur while reading the wrangler config.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("{} not found", .path.display())]
    #[diagnostic(
        code(d1_sync::config::not_found),
        help("Run d1-sync from your Worker project directory or pass --config <path>.")
    )]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(d1_sync::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid wrangler config: {0}")]
    #[diagnostic(code(d1_sync::config::parse))]
    Parse(#[from] toml::de::Error),

    #[error("No D1 databases found in wrangler config")]
    #[diagnostic(
        code(d1_sync::config::no_databases),
        help("Add a [[d1_databases]] entry with binding and database_name.")
    )]
    NoDatabases,

    #[error("No local D1 database configuration found")]
    #[diagnostic(
        code(d1_sync::config::no_local_database),
        help("The top-level [[d1_databases]] entry is used as the local import target.")
    )]
    NoLocalDatabase,
}

#[derive(Debug, Deserialize)]
struct WranglerToml {
    #[serde(default)]
    d1_databases: Vec<D1Database>,
    #[serde(default)]
    env: BTreeMap<String, EnvConfig>,
}

#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default)]
    d1_databases: Vec<D1Database>,
}

#[derive(Debug, Deserialize)]
struct D1Database {
    binding: String,
    database_name: String,
    database_id: Option<String>,
}

/// A D1 database that can be synced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    /// `local` or the environment name.
    pub key: String,
    pub display_name: String,
    pub binding: String,
    pub database_name: String,
    pub database_id: Option<String>,
    /// Environment passed to wrangler as `--env`, `None` for the default.
    pub env: Option<String>,
}

impl DatabaseTarget {
    fn local(db: D1Database) -> Self {
        Self {
            key: LOCAL_KEY.to_string(),
            display_name: "Local/Default".to_string(),
            binding: db.binding,
            database_name: db.database_name,
            database_id: db.database_id,
            env: None,
        }
    }

    fn for_env(env: &str, db: D1Database) -> Self {
        Self {
            key: env.to_string(),
            display_name: capitalize(env),
            binding: db.binding,
            database_name: db.database_name,
            database_id: db.database_id,
            env: Some(env.to_string()),
        }
    }

    /// `Display (database_name)`, as shown in the selection prompt.
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.database_name)
    }

    pub fn is_local(&self) -> bool {
        self.env.is_none()
    }
}

/// All D1 targets of a wrangler config, local first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseTargets {
    targets: Vec<DatabaseTarget>,
}

impl DatabaseTargets {
    /// Read and parse a `wrangler.toml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(&content)
    }

    /// Parse wrangler config text.
    ///
    /// When a section lists several databases the last one is used.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: WranglerToml = toml::from_str(content)?;
        let mut targets = Vec::new();

        if let Some(db) = config.d1_databases.pop() {
            targets.push(DatabaseTarget::local(db));
        }
        for (name, mut env) in config.env {
            if let Some(db) = env.d1_databases.pop() {
                targets.push(DatabaseTarget::for_env(&name, db));
            }
        }

        if targets.is_empty() {
            return Err(ConfigError::NoDatabases);
        }
        Ok(Self { targets })
    }

    /// The top-level target that imports go into.
    pub fn local(&self) -> Option<&DatabaseTarget> {
        self.targets.iter().find(|t| t.is_local())
    }

    pub fn get(&self, key: &str) -> Option<&DatabaseTarget> {
        self.targets.iter().find(|t| t.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.key.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DatabaseTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a DatabaseTargets {
    type Item = &'a DatabaseTarget;
    type IntoIter = std::slice::Iter<'a, DatabaseTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
