//! flightdb-ops - Main entry point
//!
//! Operations CLI for the flight reservation database: dump import/export,
//! archive handling, consistency checks and load testing against a
//! MariaDB/MySQL server.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flightdb_common::config::OpsConfig;
use flightdb_ops::cli::{Cli, Command};
use flightdb_ops::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        "flightdb-ops {} (build {} {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = match OpsConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    config.apply_overrides(cli.overrides());
    config.validate()?;

    match &cli.command {
        Command::Ping => commands::ping::run(&config).await,
        Command::Import { dump } => commands::import::run(&config, dump).await,
        Command::Export { output } => commands::export::run(&config, output).await,
        Command::Compress { input, output } => {
            commands::archive::compress(input, output.as_deref())
        }
        Command::Decompress { input, output_dir } => {
            commands::archive::decompress(input, output_dir)
        }
        Command::Check { limit, json } => {
            commands::check::run(&config, *limit, json.as_deref()).await
        }
        Command::Bench {
            dump,
            iterations,
            prefix,
            keep,
            json,
        } => commands::bench::run(&config, dump, *iterations, prefix, *keep, json.as_deref()).await,
        Command::ParallelImport {
            dump,
            prefix,
            workers,
            drop_after,
            json,
        } => {
            commands::parallel::run(&config, dump, prefix, *workers, *drop_after, json.as_deref())
                .await
        }
    }
}
