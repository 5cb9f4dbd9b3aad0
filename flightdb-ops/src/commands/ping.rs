//! Connection smoke test
//!
//! Verifies the provisioned server accepts connections, retrying while a
//! freshly started container is still coming up.

use anyhow::Result;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::{connect_with_retry, server_version};
use sqlx::Connection;
use tracing::info;

pub async fn run(config: &OpsConfig) -> Result<()> {
    let connection = &config.connection;
    info!(
        host = connection.host.as_str(),
        port = connection.port,
        "Connecting to server"
    );
    let mut conn = connect_with_retry(&connection.server_options(), &config.retry).await?;
    let version = server_version(&mut conn).await?;
    conn.close().await?;

    println!(
        "Server at {}:{} accepts connections (version {})",
        connection.host, connection.port, version
    );
    Ok(())
}
