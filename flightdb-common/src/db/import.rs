//! SQL dump import
//!
//! Statements run in file order on a single dedicated connection, so `USE`
//! and other session state inside the dump behave exactly as they do in the
//! mysql client. A statement that fails is logged and skipped rather than
//! aborting the import; dumps from other tools routinely contain statements
//! an older or newer server rejects.

use crate::config::OpsConfig;
use crate::db::connect::{connect_with_retry, ensure_database};
use crate::dump::{is_effectively_empty, StatementSplitter};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, Executor};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters from a single dump import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Statements yielded by the splitter, skipped ones included
    pub statements_total: usize,
    /// Statements executed successfully
    pub executed: usize,
    /// Statements that failed and were skipped
    pub warnings: usize,
    pub elapsed_seconds: f64,
}

/// Import a dump file into `target_db`, creating the database first if it
/// does not exist.
pub async fn import_dump(
    config: &OpsConfig,
    dump_path: &Path,
    target_db: &str,
) -> Result<ImportOutcome> {
    let started = Instant::now();

    let sql = tokio::fs::read_to_string(dump_path).await?;
    info!(path = %dump_path.display(), bytes = sql.len(), "Read dump file");

    // Server-level connection just to create the target database
    let mut conn = connect_with_retry(&config.connection.server_options(), &config.retry).await?;
    ensure_database(&mut conn, target_db).await?;
    conn.close().await?;

    let mut conn =
        connect_with_retry(&config.connection.options_for(target_db), &config.retry).await?;

    let mut statements_total = 0usize;
    let mut executed = 0usize;
    let mut warnings = 0usize;

    for stmt in StatementSplitter::new(&sql) {
        statements_total += 1;
        if is_effectively_empty(stmt) {
            continue;
        }
        match conn.execute(stmt).await {
            Ok(_) => {
                executed += 1;
                if executed % 500 == 0 {
                    debug!(executed, "Import progress");
                }
            }
            Err(e) => {
                warnings += 1;
                warn!(
                    statement = %statement_preview(stmt),
                    error = %e,
                    "Statement failed, continuing import"
                );
            }
        }
    }
    conn.close().await?;

    let outcome = ImportOutcome {
        statements_total,
        executed,
        warnings,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };
    info!(
        database = target_db,
        executed = outcome.executed,
        warnings = outcome.warnings,
        elapsed_seconds = format!("{:.2}", outcome.elapsed_seconds).as_str(),
        "Import finished"
    );
    Ok(outcome)
}

/// First line of a statement, truncated for log output
fn statement_preview(stmt: &str) -> String {
    const MAX: usize = 80;
    let line: String = stmt
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(MAX)
        .collect();
    if stmt.chars().count() > MAX {
        format!("{}...", line)
    } else {
        line
    }
}
