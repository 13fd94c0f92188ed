//! Post-import validation: list the local tables and count their rows.

use serde::Deserialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{debug, warn};

use super::wrangler::{WranglerError, WranglerOps};
use crate::locale::Messages;

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table' \
     AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_cf_%' ORDER BY name";

/// Row count of a single table. `records` is `None` when counting failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub records: Option<u64>,
}

/// One statement's result block in `wrangler d1 execute --json` output.
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    results: Vec<Value>,
}

/// User tables of the local database, excluding SQLite and Cloudflare internals.
pub fn list_tables<W: WranglerOps>(wrangler: &W, database: &str) -> Result<Vec<String>, WranglerError> {
    let rows = query(wrangler, database, LIST_TABLES_SQL)?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// `COUNT(*)` of one table.
pub fn count_rows<W: WranglerOps>(
    wrangler: &W,
    database: &str,
    table: &str,
) -> Result<u64, WranglerError> {
    let sql = format!(
        "SELECT COUNT(*) AS count FROM \"{}\"",
        table.replace('"', "\"\"")
    );
    let rows = query(wrangler, database, &sql)?;
    rows.first()
        .and_then(|row| row.get("count"))
        .and_then(|count| match count {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .ok_or_else(|| WranglerError::InvalidOutput(format!("no count returned for {table}")))
}

/// Count every table of the local database.
///
/// A table whose count fails is reported with `records: None` instead of
/// failing the whole validation.
pub fn validate_sync<W: WranglerOps>(
    wrangler: &W,
    database: &str,
) -> Result<Vec<TableCount>, WranglerError> {
    let tables = list_tables(wrangler, database)?;
    debug!(count = tables.len(), "validating tables");

    Ok(tables
        .into_iter()
        .map(|table| {
            let records = match count_rows(wrangler, database, &table) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!(%table, error = %e, "could not count rows");
                    None
                }
            };
            TableCount { table, records }
        })
        .collect())
}

/// Render counts as a table in the user's language.
pub fn render_counts(counts: &[TableCount], messages: &Messages) -> String {
    let mut builder = Builder::default();
    builder.push_record([messages.table, messages.records]);
    for count in counts {
        let records = count
            .records
            .map_or_else(|| messages.unable_to_count.to_string(), |n| n.to_string());
        builder.push_record([count.table.clone(), records]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn query<W: WranglerOps>(wrangler: &W, database: &str, sql: &str) -> Result<Vec<Value>, WranglerError> {
    let output = wrangler.execute_command(database, sql)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_results(&stdout)
}

/// Extract result rows from wrangler's JSON output.
///
/// Wrangler may print banner lines before the JSON, and returns either an
/// array of result blocks or a single block.
fn parse_results(stdout: &str) -> Result<Vec<Value>, WranglerError> {
    let start = stdout
        .find(['[', '{'])
        .ok_or_else(|| WranglerError::InvalidOutput("no JSON in wrangler output".to_string()))?;
    let json = &stdout[start..];

    let blocks = match serde_json::from_str::<Vec<QueryResult>>(json) {
        Ok(blocks) => blocks,
        Err(_) => vec![
            serde_json::from_str::<QueryResult>(json)
                .map_err(|e| WranglerError::InvalidOutput(e.to_string()))?,
        ],
    };

    Ok(blocks.into_iter().flat_map(|block| block.results).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Language;
    use crate::sync::wrangler::MockWranglerOps;
    use mockall::predicate::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};

    fn mock_output(code: i32, stdout: &str, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_parse_results_array() {
        let rows = parse_results(r#"[{"results":[{"name":"users"},{"name":"posts"}],"success":true}]"#)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], "posts");
    }

    #[test]
    fn test_parse_results_with_banner_and_single_object() {
        let stdout = "⛅️ wrangler 3.60.0\n-------------------\n{\"results\":[{\"count\":4}]}";
        let rows = parse_results(stdout).unwrap();
        assert_eq!(rows[0]["count"], 4);
    }

    #[test]
    fn test_parse_results_without_json() {
        let result = parse_results("✘ [ERROR] something went wrong");
        assert!(matches!(result, Err(WranglerError::InvalidOutput(_))));
    }

    #[test]
    fn test_list_tables_uses_filtered_query() {
        let mut mock = MockWranglerOps::new();
        mock.expect_execute_command()
            .with(eq("app-dev"), eq(LIST_TABLES_SQL))
            .times(1)
            .returning(|_, _| {
                Ok(mock_output(
                    0,
                    r#"[{"results":[{"name":"posts"},{"name":"users"}]}]"#,
                    "",
                ))
            });

        let tables = list_tables(&mock, "app-dev").unwrap();
        assert_eq!(tables, vec!["posts", "users"]);
    }

    #[test]
    fn test_count_rows_accepts_string_count() {
        let mut mock = MockWranglerOps::new();
        mock.expect_execute_command()
            .with(eq("app-dev"), eq("SELECT COUNT(*) AS count FROM \"users\""))
            .returning(|_, _| Ok(mock_output(0, r#"[{"results":[{"count":"12"}]}]"#, "")));

        assert_eq!(count_rows(&mock, "app-dev", "users").unwrap(), 12);
    }

    #[test]
    fn test_validate_sync_marks_failed_counts() {
        let mut mock = MockWranglerOps::new();
        mock.expect_execute_command().returning(|_, sql| {
            if sql.starts_with("SELECT name") {
                Ok(mock_output(
                    0,
                    r#"[{"results":[{"name":"posts"},{"name":"users"}]}]"#,
                    "",
                ))
            } else if sql.contains("\"posts\"") {
                Err(WranglerError::NonZeroExit {
                    code: 1,
                    output: "no such table".to_string(),
                })
            } else {
                Ok(mock_output(0, r#"[{"results":[{"count":3}]}]"#, ""))
            }
        });

        let counts = validate_sync(&mock, "app-dev").unwrap();
        assert_eq!(
            counts,
            vec![
                TableCount {
                    table: "posts".to_string(),
                    records: None
                },
                TableCount {
                    table: "users".to_string(),
                    records: Some(3)
                },
            ]
        );
    }

    #[test]
    fn test_validate_sync_propagates_listing_failure() {
        let mut mock = MockWranglerOps::new();
        mock.expect_execute_command()
            .returning(|_, _| Err(WranglerError::NpxNotFound));

        assert!(matches!(
            validate_sync(&mock, "app-dev"),
            Err(WranglerError::NpxNotFound)
        ));
    }

    #[test]
    fn test_render_counts() {
        let counts = vec![
            TableCount {
                table: "users".to_string(),
                records: Some(3),
            },
            TableCount {
                table: "posts".to_string(),
                records: None,
            },
        ];
        let output = render_counts(&counts, Language::En.messages());
        assert!(output.contains("╭"));
        assert!(output.contains("users"));
        assert!(output.contains("unable to count"));
    }
}
