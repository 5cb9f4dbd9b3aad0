//! Export subcommand

use anyhow::Result;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::export_dump;
use std::path::Path;

pub async fn run(config: &OpsConfig, output: &Path) -> Result<()> {
    let database = config.connection.database.clone();
    let outcome = export_dump(config, output, &database).await?;

    println!(
        "Exported `{}` to {}: {} table(s), {} row(s), {:.2} s",
        database,
        outcome.out_path.display(),
        outcome.tables,
        outcome.rows,
        outcome.elapsed_seconds
    );
    Ok(())
}
