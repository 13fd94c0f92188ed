//! Repair command implementation.

use std::path::Path;
use tabled::{Table, Tabled};

use crate::cli::error::CliResult;
use crate::cli::utils::apply_table_style;
use crate::repair::{RepairSummary, repair_file};
use crate::sync::fixed_file_path;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Repair `input` into `output` (default: `<input stem>_fixed.sql`).
pub fn repair(input: &Path, output: Option<&Path>) -> CliResult<String> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fixed_file_path(input));
    let summary = repair_file(input, &output)?;

    Ok(format!(
        "✓ Wrote {}\n\n{}",
        output.display(),
        summary_table(&summary)
    ))
}

fn summary_table(summary: &RepairSummary) -> String {
    let rows = vec![
        SummaryRow {
            item: "Statements",
            count: summary.statements,
        },
        SummaryRow {
            item: "Tables dropped",
            count: summary.tables_dropped,
        },
        SummaryRow {
            item: "Inserts rewritten",
            count: summary.inserts_rewritten,
        },
        SummaryRow {
            item: "Values quoted",
            count: summary.values_quoted,
        },
    ];

    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}
