//! Shared utilities for CLI commands

use tabled::{Table, settings::Style};

/// Format an optional value for display
pub fn format_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
