//! Import subcommand

use anyhow::Result;
use flightdb_common::config::OpsConfig;
use flightdb_common::db::import_dump;
use std::path::Path;

pub async fn run(config: &OpsConfig, dump: &Path) -> Result<()> {
    let database = config.connection.database.clone();
    let outcome = import_dump(config, dump, &database).await?;

    println!(
        "Imported {} into `{}`: {} of {} statements executed, {} warnings, {:.2} s",
        dump.display(),
        database,
        outcome.executed,
        outcome.statements_total,
        outcome.warnings,
        outcome.elapsed_seconds
    );
    Ok(())
}
