//! Report types for check, bench and parallel-import runs
//!
//! Every run gets a uuid and a UTC start timestamp so reports from repeated
//! runs can be collected and compared. `--json` writes the same structures
//! serde-serialized; the human rendering prints aligned tables with seconds
//! at two decimals.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Write any report as pretty-printed JSON
pub fn write_json<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

// === Consistency checks ===

/// Outcome of one consistency check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub description: String,
    /// Total violation rows found
    pub violations: u64,
    pub elapsed_seconds: f64,
    /// Up to the sample limit of violation rows, column name to value
    pub sample: Vec<serde_json::Value>,
}

/// Report from a `check` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub run_id: Uuid,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub checks: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn new(database: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            database: database.to_string(),
            started_at: Utc::now(),
            checks: Vec::new(),
        }
    }

    pub fn total_violations(&self) -> u64 {
        self.checks.iter().map(|c| c.violations).sum()
    }

    pub fn print_human(&self) {
        println!();
        println!("Consistency checks for `{}` (run {})", self.database, self.run_id);
        println!("{:<28} {:>12} {:>10}", "check", "violations", "seconds");
        println!("{}", "-".repeat(52));
        for check in &self.checks {
            println!(
                "{:<28} {:>12} {:>10.2}",
                check.name, check.violations, check.elapsed_seconds
            );
        }
        println!("{}", "-".repeat(52));
        println!("{:<28} {:>12}", "total", self.total_violations());
        for check in &self.checks {
            if !check.sample.is_empty() {
                println!();
                println!("{} ({}): first {} row(s)", check.name, check.description, check.sample.len());
                for row in &check.sample {
                    println!("  {}", row);
                }
            }
        }
    }
}

// === Import/export benchmark ===

/// One benchmark iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchIteration {
    /// 1-based iteration index
    pub iteration: u32,
    /// Scratch database the dump was imported into
    pub database: String,
    pub success: bool,
    pub error: Option<String>,
    pub import_seconds: Option<f64>,
    pub export_seconds: Option<f64>,
    pub export_path: Option<PathBuf>,
}

/// Min/mean/max over the successful iterations of one phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseStats {
    pub min_seconds: f64,
    pub mean_seconds: f64,
    pub max_seconds: f64,
}

impl PhaseStats {
    /// None when there are no samples
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &s in samples {
            min = min.min(s);
            max = max.max(s);
            sum += s;
        }
        Some(Self {
            min_seconds: min,
            mean_seconds: sum / samples.len() as f64,
            max_seconds: max,
        })
    }
}

/// Report from a `bench` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub dump_path: PathBuf,
    pub database_prefix: String,
    pub iterations: u32,
    pub rows: Vec<BenchIteration>,
    /// Aggregates over successful iterations only
    pub import_stats: Option<PhaseStats>,
    pub export_stats: Option<PhaseStats>,
}

impl BenchReport {
    pub fn new(dump_path: &Path, prefix: &str, iterations: u32, rows: Vec<BenchIteration>) -> Self {
        let import_samples: Vec<f64> = rows
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.import_seconds)
            .collect();
        let export_samples: Vec<f64> = rows
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.export_seconds)
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            dump_path: dump_path.to_path_buf(),
            database_prefix: prefix.to_string(),
            iterations,
            import_stats: PhaseStats::from_samples(&import_samples),
            export_stats: PhaseStats::from_samples(&export_samples),
            rows,
        }
    }

    pub fn print_human(&self) {
        println!();
        println!(
            "Benchmark of {} over {} iteration(s) (run {})",
            self.dump_path.display(),
            self.iterations,
            self.run_id
        );
        println!(
            "{:<5} {:<20} {:>12} {:>12}  {}",
            "iter", "database", "import s", "export s", "result"
        );
        println!("{}", "-".repeat(64));
        for row in &self.rows {
            println!(
                "{:<5} {:<20} {:>12} {:>12}  {}",
                row.iteration,
                row.database,
                format_opt_seconds(row.import_seconds),
                format_opt_seconds(row.export_seconds),
                if row.success {
                    "ok".to_string()
                } else {
                    row.error.clone().unwrap_or_else(|| "failed".to_string())
                }
            );
        }
        println!("{}", "-".repeat(64));
        if let Some(stats) = &self.import_stats {
            println!(
                "import: min {:.2} s, mean {:.2} s, max {:.2} s",
                stats.min_seconds, stats.mean_seconds, stats.max_seconds
            );
        }
        if let Some(stats) = &self.export_stats {
            println!(
                "export: min {:.2} s, mean {:.2} s, max {:.2} s",
                stats.min_seconds, stats.mean_seconds, stats.max_seconds
            );
        }
        if self.import_stats.is_none() {
            println!("No successful iterations");
        }
    }
}

// === Parallel import ===

/// Outcome of one parallel-import worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerOutcome {
    /// 0-based worker index
    pub worker: u32,
    /// Database this worker imported into
    pub database: String,
    pub success: bool,
    pub statements_executed: Option<usize>,
    pub statement_warnings: Option<usize>,
    pub elapsed_seconds: f64,
    pub error: Option<String>,
}

/// Report from a `parallel-import` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelImportReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub dump_path: PathBuf,
    pub workers: u32,
    pub elapsed_seconds: f64,
    pub outcomes: Vec<WorkerOutcome>,
}

impl ParallelImportReport {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn print_human(&self) {
        println!();
        println!(
            "Parallel import of {} across {} worker(s) in {:.2} s (run {})",
            self.dump_path.display(),
            self.workers,
            self.elapsed_seconds,
            self.run_id
        );
        println!(
            "{:<7} {:<24} {:>10} {:>9} {:>9}  {}",
            "worker", "database", "executed", "warnings", "seconds", "result"
        );
        println!("{}", "-".repeat(72));
        for outcome in &self.outcomes {
            println!(
                "{:<7} {:<24} {:>10} {:>9} {:>9.2}  {}",
                outcome.worker,
                outcome.database,
                format_opt_count(outcome.statements_executed),
                format_opt_count(outcome.statement_warnings),
                outcome.elapsed_seconds,
                if outcome.success {
                    "ok".to_string()
                } else {
                    outcome.error.clone().unwrap_or_else(|| "failed".to_string())
                }
            );
        }
        println!("{}", "-".repeat(72));
        println!("{} of {} workers succeeded", self.successes(), self.workers);
    }
}

fn format_opt_seconds(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn format_opt_count(value: Option<usize>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
