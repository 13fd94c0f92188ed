//! The repair pass itself: DROP insertion and INSERT requoting.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::scanner::{Statement, StatementKind, scan_statements};
use super::values::{SplitError, Value, classify, requote, split_tuple};

/// Errors that can occur while repairing a dump.
#[derive(Error, Diagnostic, Debug)]
pub enum RepairError {
    #[error("Malformed INSERT for table '{table}': {reason}\n{statement}")]
    #[diagnostic(
        code(d1_sync::repair::malformed_dump),
        help("The export could not be repaired safely. Nothing was written.")
    )]
    MalformedDump {
        table: String,
        statement: String,
        reason: SplitError,
    },

    #[error("Failed to read dump {}: {source}", .path.display())]
    #[diagnostic(code(d1_sync::repair::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write repaired dump {}: {source}", .path.display())]
    #[diagnostic(code(d1_sync::repair::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Non-empty statements seen.
    pub statements: usize,
    /// `DROP TABLE IF EXISTS` lines inserted.
    pub tables_dropped: usize,
    /// INSERT statements reassembled.
    pub inserts_rewritten: usize,
    /// Bare values that were wrapped in quotes.
    pub values_quoted: usize,
}

/// Repaired SQL together with its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    pub sql: String,
    pub summary: RepairSummary,
}

/// Repair an exported dump so a local import accepts it.
///
/// Every `CREATE TABLE <name>` gets a `DROP TABLE IF EXISTS <name>;` line in
/// front of it (unless one is already there) and every bare value in
/// `INSERT INTO <name> VALUES(...)` is quoted.
///
/// ```
/// let sql = "CREATE TABLE users (id INTEGER, name TEXT);\nINSERT INTO users VALUES(1,John,NULL);";
/// assert_eq!(
///     d1_sync::repair::repair(sql).unwrap(),
///     "DROP TABLE IF EXISTS users;\nCREATE TABLE users (id INTEGER, name TEXT);\nINSERT INTO users VALUES(1,'John',NULL);"
/// );
/// ```
pub fn repair(input: &str) -> Result<String, RepairError> {
    repair_with_summary(input).map(|repaired| repaired.sql)
}

/// Same as [`repair`], also reporting what was changed.
pub fn repair_with_summary(input: &str) -> Result<Repaired, RepairError> {
    let mut sql = String::with_capacity(input.len() + input.len() / 16);
    let mut summary = RepairSummary::default();
    let mut previous: Option<&str> = None;

    for statement in scan_statements(input) {
        sql.push_str(statement.prefix);

        match statement.kind() {
            StatementKind::CreateTable { table } => {
                if !previous.is_some_and(|prev| prev == drop_statement(table)) {
                    sql.push_str(&drop_statement(table));
                    sql.push('\n');
                    summary.tables_dropped += 1;
                }
                sql.push_str(statement.body);
            }
            StatementKind::InsertValues { table, values_at } => {
                match rewrite_insert(&statement, table, values_at)? {
                    Some((rewritten, quoted)) => {
                        sql.push_str(&rewritten);
                        summary.inserts_rewritten += 1;
                        summary.values_quoted += quoted;
                    }
                    None => sql.push_str(statement.body),
                }
            }
            StatementKind::Other => sql.push_str(statement.body),
        }

        if !statement.body.is_empty() {
            summary.statements += 1;
            previous = Some(statement.body);
        }
    }

    debug!(?summary, "repaired dump");
    Ok(Repaired { sql, summary })
}

/// Read `input`, repair it and write the result to `output`.
///
/// Nothing is written unless the whole dump was repaired.
pub fn repair_file(input: &Path, output: &Path) -> Result<RepairSummary, RepairError> {
    let content = std::fs::read_to_string(input).map_err(|source| RepairError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let repaired = repair_with_summary(&content)?;

    std::fs::write(output, &repaired.sql).map_err(|source| RepairError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        tables = repaired.summary.tables_dropped,
        inserts = repaired.summary.inserts_rewritten,
        "wrote repaired dump"
    );
    Ok(repaired.summary)
}

fn drop_statement(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table};")
}

/// Rebuild an INSERT with every value requoted.
///
/// Returns `None` when the tuples are followed by a clause this pass does not
/// model (`ON CONFLICT`, `RETURNING`, ...); such statements are left alone.
fn rewrite_insert(
    statement: &Statement<'_>,
    table: &str,
    values_at: usize,
) -> Result<Option<(String, usize)>, RepairError> {
    let malformed = |reason| RepairError::MalformedDump {
        table: table.to_string(),
        statement: statement.body.to_string(),
        reason,
    };

    let mut rewritten = format!("INSERT INTO {table} VALUES");
    let mut quoted = 0;
    let mut rest = &statement.body[values_at..];

    loop {
        let tuple = split_tuple(rest).map_err(malformed)?;

        rewritten.push('(');
        for (i, token) in tuple.values.iter().enumerate() {
            if i > 0 {
                rewritten.push(',');
            }
            if classify(token.trim()) == Value::Bare {
                quoted += 1;
            }
            rewritten.push_str(&requote(token));
        }
        rewritten.push(')');

        let tail = &rest[tuple.end..];
        rest = tail.trim_start();
        match rest.as_bytes().first() {
            Some(b',') => {
                rest = rest[1..].trim_start();
                if !rest.starts_with('(') {
                    return Err(malformed(SplitError::UnbalancedParens));
                }
                rewritten.push(',');
            }
            Some(b';') if rest.len() == 1 => {
                rewritten.push(';');
                return Ok(Some((rewritten, quoted)));
            }
            None if !statement.terminated => {
                rewritten.push_str(tail);
                return Ok(Some((rewritten, quoted)));
            }
            Some(b) if b.is_ascii_alphabetic() => return Ok(None),
            _ => return Err(malformed(SplitError::TrailingText)),
        }
    }
}
