//! List command implementation.

use std::path::Path;
use tabled::{Table, Tabled};

use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, format_optional};
use crate::config::{DatabaseTarget, DatabaseTargets};

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Binding")]
    binding: String,
    #[tabled(rename = "Database")]
    database: String,
    #[tabled(rename = "Database ID")]
    database_id: String,
}

impl From<&DatabaseTarget> for TargetRow {
    fn from(target: &DatabaseTarget) -> Self {
        Self {
            key: target.key.clone(),
            name: target.display_name.clone(),
            binding: target.binding.clone(),
            database: target.database_name.clone(),
            database_id: format_optional(target.database_id.as_deref()),
        }
    }
}

/// Render the D1 targets of the wrangler config at `config`.
pub fn list_targets(config: &Path) -> CliResult<String> {
    let targets = DatabaseTargets::load(config)?;
    let rows: Vec<TargetRow> = targets.iter().map(TargetRow::from).collect();

    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    Ok(table.to_string())
}
