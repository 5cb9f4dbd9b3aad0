//! Concurrent import stress test
//!
//! Spawns N workers that each import the same dump into their own database
//! `{prefix}_{worker}` at the same time. Every worker gets its own
//! connection; a failing worker records its error without aborting the
//! others, so the report shows which imports survived contention. Worker
//! databases are dropped after the report is printed when `--drop-after`,
//! and a failed drop only warns.

use crate::report::{write_json, ParallelImportReport, WorkerOutcome};
use anyhow::Result;
use chrono::Utc;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::{connect_with_retry, drop_database, import_dump, validate_identifier};
use futures::future::join_all;
use sqlx::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub async fn run(
    config: &OpsConfig,
    dump: &Path,
    prefix: &str,
    workers: u32,
    drop_after: bool,
    json: Option<&Path>,
) -> Result<()> {
    anyhow::ensure!(workers > 0, "At least one worker is required");
    anyhow::ensure!(dump.exists(), "Dump file not found: {}", dump.display());
    validate_identifier(&format!("{}_{}", prefix, workers.saturating_sub(1)))?;

    let started_at = Utc::now();
    let started = Instant::now();
    let completed = Arc::new(AtomicUsize::new(0));
    let total = workers as usize;

    info!(workers, dump = %dump.display(), prefix, "Starting parallel import");

    let mut handles = Vec::with_capacity(total);
    for worker in 0..workers {
        let config = config.clone();
        let dump: PathBuf = dump.to_path_buf();
        let database = format!("{}_{}", prefix, worker);
        let completed = Arc::clone(&completed);
        handles.push(tokio::spawn(async move {
            let worker_started = Instant::now();
            let outcome = match import_dump(&config, &dump, &database).await {
                Ok(outcome) => WorkerOutcome {
                    worker,
                    database,
                    success: true,
                    statements_executed: Some(outcome.executed),
                    statement_warnings: Some(outcome.warnings),
                    elapsed_seconds: worker_started.elapsed().as_secs_f64(),
                    error: None,
                },
                Err(e) => {
                    warn!(worker, error = %e, "Worker import failed");
                    WorkerOutcome {
                        worker,
                        database,
                        success: false,
                        statements_executed: None,
                        statement_warnings: None,
                        elapsed_seconds: worker_started.elapsed().as_secs_f64(),
                        error: Some(e.to_string()),
                    }
                }
            };
            completed.fetch_add(1, Ordering::Relaxed);
            outcome
        }));
    }

    // Progress reporting task
    let progress_counter = Arc::clone(&completed);
    let progress_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
            let done = progress_counter.load(Ordering::Relaxed);
            if done >= total {
                break;
            }
            info!("Parallel import progress: {}/{} workers finished", done, total);
        }
    });

    let mut outcomes = Vec::with_capacity(total);
    for (worker, result) in join_all(handles).await.into_iter().enumerate() {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                completed.fetch_add(1, Ordering::Relaxed);
                outcomes.push(WorkerOutcome {
                    worker: worker as u32,
                    database: format!("{}_{}", prefix, worker),
                    success: false,
                    statements_executed: None,
                    statement_warnings: None,
                    elapsed_seconds: started.elapsed().as_secs_f64(),
                    error: Some(format!("worker panicked: {}", e)),
                });
            }
        }
    }
    let _ = progress_task.await;

    let elapsed_seconds = started.elapsed().as_secs_f64();

    let report = ParallelImportReport {
        run_id: uuid::Uuid::new_v4(),
        started_at,
        dump_path: dump.to_path_buf(),
        workers,
        elapsed_seconds,
        outcomes,
    };
    report.print_human();
    if let Some(path) = json {
        write_json(&report, path)?;
        println!("Report written to {}", path.display());
    }

    if drop_after {
        if let Err(e) = drop_worker_databases(config, prefix, workers).await {
            warn!(error = %e, prefix, "Failed to drop worker databases");
        }
    }
    Ok(())
}

async fn drop_worker_databases(config: &OpsConfig, prefix: &str, workers: u32) -> Result<()> {
    let mut conn = connect_with_retry(&config.connection.server_options(), &config.retry).await?;
    for worker in 0..workers {
        drop_database(&mut conn, &format!("{}_{}", prefix, worker)).await?;
    }
    conn.close().await?;
    info!(count = workers, "Dropped worker databases");
    Ok(())
}
