//! Command-line interface definitions
//!
//! Connection flags are global, apply to every subcommand, and fall back to
//! `FLIGHTDB_*` environment variables. They override the config file, which
//! overrides the built-in defaults.

use clap::{Parser, Subcommand};
use flightdb_common::config::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flightdb-ops")]
#[command(about = "Operations toolkit for the flight_reservation MariaDB database")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file (discovery is used when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database server host
    #[arg(long, global = true, env = "FLIGHTDB_HOST")]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, global = true, env = "FLIGHTDB_PORT")]
    pub port: Option<u16>,

    /// Login user
    #[arg(long, global = true, env = "FLIGHTDB_USER")]
    pub user: Option<String>,

    /// Login password (prefer FLIGHTDB_PASSWORD or the config file over the
    /// flag; flags show up in the process list)
    #[arg(long, global = true, env = "FLIGHTDB_PASSWORD")]
    pub password: Option<String>,

    /// Database to operate on
    #[arg(long, global = true, env = "FLIGHTDB_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify the server accepts connections and print its version
    Ping,

    /// Import a SQL dump file into the configured database
    Import {
        /// Dump file to import
        #[arg(default_value = "flight_database_dump.sql")]
        dump: PathBuf,
    },

    /// Export the configured database to a SQL dump file
    Export {
        /// Output dump file
        #[arg(default_value = "flight_database_dump.sql")]
        output: PathBuf,
    },

    /// Compress a dump file into a ZIP archive
    Compress {
        /// File to compress
        #[arg(default_value = "flight_database_dump.sql")]
        input: PathBuf,

        /// Output archive (defaults to the input path with a .zip extension)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract a ZIP archive
    Decompress {
        /// Archive to extract
        #[arg(default_value = "flight_database_dump.zip")]
        input: PathBuf,

        /// Directory to extract into
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Run data consistency checks against the configured database
    Check {
        /// Maximum violation rows kept per check in the report
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Write the report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Benchmark dump import/export round trips on scratch databases
    Bench {
        /// Dump file to benchmark with
        #[arg(default_value = "flight_database_dump.sql")]
        dump: PathBuf,

        /// Number of import/export rounds
        #[arg(long, default_value = "5")]
        iterations: u32,

        /// Scratch database name prefix
        #[arg(long, default_value = "benchmark_db")]
        prefix: String,

        /// Keep the scratch databases after the run
        #[arg(long)]
        keep: bool,

        /// Write the report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Import one dump into several databases concurrently
    ParallelImport {
        /// Dump file to import
        dump: PathBuf,

        /// Worker database name prefix
        #[arg(long)]
        prefix: String,

        /// Number of concurrent workers
        #[arg(long, default_value = "4")]
        workers: u32,

        /// Drop the worker databases after the run
        #[arg(long)]
        drop_after: bool,

        /// Write the report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

impl Cli {
    /// Connection overrides from the global flags
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_defaults() {
        let cli = Cli::try_parse_from(["flightdb-ops", "import"]).unwrap();
        match cli.command {
            Command::Import { dump } => {
                assert_eq!(dump, PathBuf::from("flight_database_dump.sql"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_takes_output_positional() {
        let cli = Cli::try_parse_from(["flightdb-ops", "export", "out.sql"]).unwrap();
        match cli.command {
            Command::Export { output } => assert_eq!(output, PathBuf::from("out.sql")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compress_defaults() {
        let cli = Cli::try_parse_from(["flightdb-ops", "compress"]).unwrap();
        match cli.command {
            Command::Compress { input, output } => {
                assert_eq!(input, PathBuf::from("flight_database_dump.sql"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_decompress_defaults() {
        let cli = Cli::try_parse_from(["flightdb-ops", "decompress"]).unwrap();
        match cli.command {
            Command::Decompress { input, output_dir } => {
                assert_eq!(input, PathBuf::from("flight_database_dump.zip"));
                assert_eq!(output_dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["flightdb-ops", "check"]).unwrap();
        match cli.command {
            Command::Check { limit, json } => {
                assert_eq!(limit, 20);
                assert!(json.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bench_defaults() {
        let cli = Cli::try_parse_from(["flightdb-ops", "bench"]).unwrap();
        match cli.command {
            Command::Bench {
                dump,
                iterations,
                prefix,
                keep,
                json,
            } => {
                assert_eq!(dump, PathBuf::from("flight_database_dump.sql"));
                assert_eq!(iterations, 5);
                assert_eq!(prefix, "benchmark_db");
                assert!(!keep);
                assert!(json.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parallel_import_requires_prefix() {
        let result = Cli::try_parse_from(["flightdb-ops", "parallel-import", "dump.sql"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parallel_import_defaults() {
        let cli = Cli::try_parse_from([
            "flightdb-ops",
            "parallel-import",
            "dump.sql",
            "--prefix",
            "load_test",
        ])
        .unwrap();
        match cli.command {
            Command::ParallelImport {
                dump,
                prefix,
                workers,
                drop_after,
                json,
            } => {
                assert_eq!(dump, PathBuf::from("dump.sql"));
                assert_eq!(prefix, "load_test");
                assert_eq!(workers, 4);
                assert!(!drop_after);
                assert!(json.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "flightdb-ops",
            "ping",
            "--host",
            "db.lab.test",
            "--port",
            "13306",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("db.lab.test"));
        assert_eq!(cli.port, Some(13306));
        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("db.lab.test"));
        assert_eq!(overrides.port, Some(13306));
    }

    #[test]
    fn test_json_flag() {
        let cli = Cli::try_parse_from(["flightdb-ops", "check", "--json", "report.json"]).unwrap();
        match cli.command {
            Command::Check { json, .. } => {
                assert_eq!(json, Some(PathBuf::from("report.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
