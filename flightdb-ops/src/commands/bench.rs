//! Import/export benchmark
//!
//! Each iteration imports the dump into a fresh scratch database
//! `{prefix}_{i}` and then exports that database to
//! `benchmark_export_{i}.sql`, timing both phases. An iteration whose
//! import fails records the error and skips its export; the run continues
//! with the next iteration. Scratch databases are dropped after the report
//! is printed unless `--keep`, and a failed drop only warns; export files
//! are left in place for inspection.

use crate::report::{write_json, BenchIteration, BenchReport};
use anyhow::Result;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::{
    connect_with_retry, drop_database, export_dump, import_dump, validate_identifier,
};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run(
    config: &OpsConfig,
    dump: &Path,
    iterations: u32,
    prefix: &str,
    keep: bool,
    json: Option<&Path>,
) -> Result<()> {
    // The longest scratch name must be a usable identifier
    validate_identifier(&format!("{}_{}", prefix, iterations.max(1)))?;
    anyhow::ensure!(dump.exists(), "Dump file not found: {}", dump.display());

    let mut rows = Vec::with_capacity(iterations as usize);
    for i in 1..=iterations {
        let database = format!("{}_{}", prefix, i);
        let export_path = PathBuf::from(format!("benchmark_export_{}.sql", i));
        info!(iteration = i, database = database.as_str(), "Benchmark iteration starting");

        let import = match import_dump(config, dump, &database).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(iteration = i, error = %e, "Import failed, skipping export");
                rows.push(BenchIteration {
                    iteration: i,
                    database,
                    success: false,
                    error: Some(e.to_string()),
                    import_seconds: None,
                    export_seconds: None,
                    export_path: None,
                });
                continue;
            }
        };

        match export_dump(config, &export_path, &database).await {
            Ok(export) => rows.push(BenchIteration {
                iteration: i,
                database,
                success: true,
                error: None,
                import_seconds: Some(import.elapsed_seconds),
                export_seconds: Some(export.elapsed_seconds),
                export_path: Some(export.out_path),
            }),
            Err(e) => {
                warn!(iteration = i, error = %e, "Export failed");
                rows.push(BenchIteration {
                    iteration: i,
                    database,
                    success: false,
                    error: Some(e.to_string()),
                    import_seconds: Some(import.elapsed_seconds),
                    export_seconds: None,
                    export_path: None,
                });
            }
        }
    }

    let report = BenchReport::new(dump, prefix, iterations, rows);
    report.print_human();
    if let Some(path) = json {
        write_json(&report, path)?;
        println!("Report written to {}", path.display());
    }

    if keep {
        info!(prefix, iterations, "Keeping scratch databases");
    } else if let Err(e) = drop_scratch_databases(config, prefix, iterations).await {
        warn!(error = %e, prefix, "Failed to drop scratch databases");
    }
    Ok(())
}

async fn drop_scratch_databases(config: &OpsConfig, prefix: &str, iterations: u32) -> Result<()> {
    let mut conn = connect_with_retry(&config.connection.server_options(), &config.retry).await?;
    for i in 1..=iterations {
        drop_database(&mut conn, &format!("{}_{}", prefix, i)).await?;
    }
    conn.close().await?;
    info!(count = iterations, "Dropped scratch databases");
    Ok(())
}
