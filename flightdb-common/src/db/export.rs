//! SQL dump export
//!
//! Produces a dump the stock mysql client (and [`crate::db::import`]) loads
//! back without warnings: per table a `DROP TABLE IF EXISTS`, the server's
//! own `SHOW CREATE TABLE` DDL, and multi-row INSERTs chunked to keep
//! statement sizes bounded. Foreign key checks are disabled across the dump
//! with the usual conditional comments, so table order never matters on
//! reload, and the session time zone is pinned to UTC so TIMESTAMP text
//! reloads unshifted on servers running in another zone.

use crate::config::OpsConfig;
use crate::db::connect::connect_with_retry;
use crate::db::values::{quote_identifier, sql_literal};
use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnection;
use sqlx::{Column, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Counters from a single dump export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub tables: usize,
    pub rows: u64,
    pub out_path: PathBuf,
    pub elapsed_seconds: f64,
}

/// Export `source_db` as a SQL dump file at `out_path`.
pub async fn export_dump(
    config: &OpsConfig,
    out_path: &Path,
    source_db: &str,
) -> Result<ExportOutcome> {
    let started = Instant::now();

    let mut conn =
        connect_with_retry(&config.connection.options_for(source_db), &config.retry).await?;

    // Views are definitions over base tables, not data to be dumped
    let table_rows = sqlx::query("SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'")
        .fetch_all(&mut conn)
        .await?;
    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        tables.push(row.try_get::<String, _>(0)?);
    }

    let file = File::create(out_path).await?;
    let mut out = BufWriter::new(file);

    let header = format!(
        "-- Database dump for `{}`\n\
         -- Generated: {}\n\
         \n\
         /*!40101 SET NAMES utf8mb4 */;\n\
         /*!40103 SET @OLD_TIME_ZONE=@@TIME_ZONE */;\n\
         /*!40103 SET TIME_ZONE='+00:00' */;\n\
         /*!40014 SET @OLD_FOREIGN_KEY_CHECKS=@@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS=0 */;\n\
         \n",
        source_db,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );
    out.write_all(header.as_bytes()).await?;

    let mut total_rows = 0u64;
    for table in &tables {
        let rows = export_table(&mut conn, &mut out, table, config.export.insert_chunk_rows).await?;
        debug!(table, rows, "Exported table");
        total_rows += rows;
    }

    let footer = format!(
        "/*!40014 SET FOREIGN_KEY_CHECKS=@OLD_FOREIGN_KEY_CHECKS */;\n\
         /*!40103 SET TIME_ZONE=@OLD_TIME_ZONE */;\n\
         \n\
         -- Dump completed on {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );
    out.write_all(footer.as_bytes()).await?;
    out.flush().await?;
    conn.close().await?;

    let outcome = ExportOutcome {
        tables: tables.len(),
        rows: total_rows,
        out_path: out_path.to_path_buf(),
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };
    info!(
        database = source_db,
        tables = outcome.tables,
        rows = outcome.rows,
        path = %out_path.display(),
        elapsed_seconds = format!("{:.2}", outcome.elapsed_seconds).as_str(),
        "Export finished"
    );
    Ok(outcome)
}

/// Write one table's structure and data sections; returns the row count.
async fn export_table(
    conn: &mut MySqlConnection,
    out: &mut BufWriter<File>,
    table: &str,
    chunk_rows: usize,
) -> Result<u64> {
    let quoted_table = quote_identifier(table);

    let create_row = sqlx::query(&format!("SHOW CREATE TABLE {}", quoted_table))
        .fetch_one(&mut *conn)
        .await?;
    let ddl: String = create_row.try_get(1)?;

    out.write_all(
        format!(
            "--\n-- Table structure for table {}\n--\n\n\
             DROP TABLE IF EXISTS {};\n\
             {};\n\n",
            quoted_table, quoted_table, ddl
        )
        .as_bytes(),
    )
    .await?;

    let rows = sqlx::query(&format!("SELECT * FROM {}", quoted_table))
        .fetch_all(&mut *conn)
        .await?;

    out.write_all(format!("--\n-- Data for table {}\n--\n\n", quoted_table).as_bytes())
        .await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let columns: Vec<String> = rows[0]
        .columns()
        .iter()
        .map(|c| quote_identifier(c.name()))
        .collect();
    let insert_head = format!("INSERT INTO {} ({}) VALUES\n", quoted_table, columns.join(", "));

    let mut written = 0u64;
    for chunk in rows.chunks(chunk_rows.max(1)) {
        let mut stmt = insert_head.clone();
        for (i, row) in chunk.iter().enumerate() {
            let mut values = Vec::with_capacity(row.len());
            for idx in 0..row.len() {
                values.push(sql_literal(row, idx)?);
            }
            if i > 0 {
                stmt.push_str(",\n");
            }
            stmt.push('(');
            stmt.push_str(&values.join(","));
            stmt.push(')');
        }
        stmt.push_str(";\n");
        out.write_all(stmt.as_bytes()).await?;
        written += chunk.len() as u64;
    }
    out.write_all(b"\n").await?;
    Ok(written)
}
