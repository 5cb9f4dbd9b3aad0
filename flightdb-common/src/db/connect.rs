//! Connection establishment with retry
//!
//! A freshly provisioned MariaDB container takes a few seconds after
//! `docker run` before it accepts connections, so connection establishment
//! retries transient failures with a fixed delay. Deterministic failures
//! (bad credentials, unknown database) fail immediately.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, Executor, MySqlConnection};
use tracing::{info, warn};

/// Connect with the configured retry policy.
///
/// Retryable failures are retried every `delay_ms` up to `attempts` total;
/// exhausting the attempts yields an error carrying the attempt count and
/// the last failure. `attempts` of zero is treated as one.
pub async fn connect_with_retry(
    options: &MySqlConnectOptions,
    retry: &RetryConfig,
) -> Result<MySqlConnection> {
    let attempts = retry.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match options.connect().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempt, "Connected after retry");
                }
                return Ok(conn);
            }
            Err(e) => {
                let err = Error::Database(e);
                if !err.is_retryable() {
                    return Err(err);
                }
                if attempt >= attempts {
                    return Err(Error::Internal(format!(
                        "Failed to connect after {} attempts: {}",
                        attempts, err
                    )));
                }
                warn!(
                    attempt,
                    attempts,
                    delay_ms = retry.delay_ms,
                    error = %err,
                    "Connection attempt failed, will retry after delay"
                );
                tokio::time::sleep(retry.delay()).await;
            }
        }
    }
}

/// Establish a small connection pool with the same retry policy.
///
/// Pool establishment validates one connection, so it fails the same way a
/// single connect does while the server is still starting.
pub async fn pool_with_retry(
    options: &MySqlConnectOptions,
    retry: &RetryConfig,
    max_connections: u32,
) -> Result<MySqlPool> {
    let attempts = retry.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                if attempt > 1 {
                    info!(attempt, "Connected after retry");
                }
                return Ok(pool);
            }
            Err(e) => {
                let err = Error::Database(e);
                if !err.is_retryable() {
                    return Err(err);
                }
                if attempt >= attempts {
                    return Err(Error::Internal(format!(
                        "Failed to connect after {} attempts: {}",
                        attempts, err
                    )));
                }
                warn!(
                    attempt,
                    attempts,
                    delay_ms = retry.delay_ms,
                    error = %err,
                    "Connection attempt failed, will retry after delay"
                );
                tokio::time::sleep(retry.delay()).await;
            }
        }
    }
}

/// Create the database if it does not exist yet
pub async fn ensure_database(conn: &mut MySqlConnection, name: &str) -> Result<()> {
    validate_identifier(name)?;
    conn.execute(format!("CREATE DATABASE IF NOT EXISTS `{}`", name).as_str())
        .await?;
    Ok(())
}

/// Drop the database if it exists
pub async fn drop_database(conn: &mut MySqlConnection, name: &str) -> Result<()> {
    validate_identifier(name)?;
    conn.execute(format!("DROP DATABASE IF EXISTS `{}`", name).as_str())
        .await?;
    Ok(())
}

/// Server version string as reported by `SELECT VERSION()`
pub async fn server_version(conn: &mut MySqlConnection) -> Result<String> {
    let row: (String,) = sqlx::query_as("SELECT VERSION()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.0)
}

/// Validate a database identifier before it is interpolated into SQL.
///
/// Database names the tool creates (import targets, bench and worker
/// databases) are restricted to `[A-Za-z0-9_]` and the 64-character server
/// limit. Anything else is rejected rather than escaped.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "Database name must not be empty".to_string(),
        ));
    }
    if name.len() > 64 {
        return Err(Error::InvalidInput(format!(
            "Database name too long ({} chars, max 64): {}",
            name.len(),
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::InvalidInput(format!(
            "Database name may only contain [A-Za-z0-9_]: {}",
            name
        )));
    }
    Ok(())
}
