//! Export repair - make a `wrangler d1 export` dump importable locally.
//!
//! The remote export and the local `d1 execute --file` path disagree on two
//! things: the local store may already contain the exported tables, and some
//! values come out of the export unquoted. This module rewrites the dump so
//! that every `CREATE TABLE` is preceded by a matching `DROP TABLE IF EXISTS`
//! and every INSERT value is either `NULL`, numeric or a quoted string.
//!
//! The rewrite works on statements found by a small scanner rather than on
//! regular expressions, so `;`, `,` and `CREATE TABLE` inside string literals
//! and comments are never touched.

mod scanner;
mod transform;
mod values;

pub use scanner::{Statement, StatementKind, scan_statements};
pub use transform::{RepairError, RepairSummary, Repaired, repair, repair_file, repair_with_summary};
pub use values::{SplitError, Tuple, Value, classify, requote, split_tuple, split_values};
