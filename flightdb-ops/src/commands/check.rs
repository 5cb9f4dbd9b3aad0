//! Consistency check subcommand
//!
//! Violations are findings about the data, not tool failures: the command
//! exits 0 even when checks find rows. Only a broken connection or a check
//! query the schema cannot answer is an error.

use crate::checks::run_checks;
use crate::report::write_json;
use anyhow::Result;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::pool_with_retry;
use std::path::Path;

pub async fn run(config: &OpsConfig, limit: usize, json: Option<&Path>) -> Result<()> {
    let database = config.connection.database.clone();
    let pool = pool_with_retry(&config.connection.database_options(), &config.retry, 5).await?;
    let report = run_checks(&pool, &database, limit).await?;
    pool.close().await;

    report.print_human();
    if let Some(path) = json {
        write_json(&report, path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
