//! Configuration loading for the flightdb tools
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (--host, --port, --user, --password, --database)
//! 2. Environment variables (FLIGHTDB_HOST, FLIGHTDB_PORT, ...)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! The TOML file is located from, in order: an explicit `--config` path,
//! `$FLIGHTDB_CONFIG`, the platform config directory
//! (`flightdb/config.toml`), then `./flightdb.toml`. A missing file at a
//! discovered location falls through to the next candidate; a file that
//! exists but does not parse is an error.

use crate::error::{Error, Result};
use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OpsConfig {
    /// Database server connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Connection retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Dump export tuning
    #[serde(default)]
    pub export: ExportConfig,
}

/// MariaDB connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname
    #[serde(default = "default_host")]
    pub host: String,

    /// Server TCP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user
    #[serde(default = "default_user")]
    pub user: String,

    /// Login password (empty means no password is sent)
    #[serde(default)]
    pub password: String,

    /// Default database for commands that do not name one
    #[serde(default = "default_database")]
    pub database: String,
}

/// Connection retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total connect attempts before giving up
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// Dump export tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Maximum rows per generated INSERT statement
    #[serde(default = "default_insert_chunk_rows")]
    pub insert_chunk_rows: usize,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

fn default_database() -> String {
    "flight_reservation".to_string()
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_insert_chunk_rows() -> usize {
    1000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            insert_chunk_rows: default_insert_chunk_rows(),
        }
    }
}

impl ConnectionConfig {
    /// Connect options without a database selected (server-level work such
    /// as CREATE DATABASE)
    pub fn server_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        options
    }

    /// Connect options with the given database selected
    pub fn options_for(&self, database: &str) -> MySqlConnectOptions {
        self.server_options().database(database)
    }

    /// Connect options with the configured default database selected
    pub fn database_options(&self) -> MySqlConnectOptions {
        self.options_for(&self.database)
    }
}

impl RetryConfig {
    /// Delay between attempts as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl OpsConfig {
    /// Load configuration from TOML, falling back to built-in defaults when
    /// no file is found.
    ///
    /// An explicit path must be readable; every other candidate location is
    /// optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            let config = Self::load_file(path)?;
            info!("Loaded configuration from {:?}", path);
            return Ok(config);
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                let config = Self::load_file(&candidate)?;
                info!("Loaded configuration from {:?}", candidate);
                return Ok(config);
            }
            debug!("No configuration file at {:?}", candidate);
        }

        debug!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Candidate config file locations, highest priority first
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        match std::env::var("FLIGHTDB_CONFIG") {
            Ok(value) if !value.is_empty() => {
                let path = PathBuf::from(value);
                if !path.exists() {
                    warn!("FLIGHTDB_CONFIG points at {:?} which does not exist", path);
                }
                paths.push(path);
            }
            _ => {}
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("flightdb").join("config.toml"));
        }
        paths.push(PathBuf::from("flightdb.toml"));
        paths
    }

    fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.connection.host = host;
        }
        if let Some(port) = overrides.port {
            self.connection.port = port;
        }
        if let Some(user) = overrides.user {
            self.connection.user = user;
        }
        if let Some(password) = overrides.password {
            self.connection.password = password;
        }
        if let Some(database) = overrides.database {
            self.connection.database = database;
        }
    }

    /// Validate the merged configuration before any connection is made
    pub fn validate(&self) -> Result<()> {
        if self.connection.port == 0 {
            return Err(Error::Config("Connection port must be non-zero".to_string()));
        }
        if self.connection.host.is_empty() {
            return Err(Error::Config("Connection host must not be empty".to_string()));
        }
        if self.connection.user.is_empty() {
            return Err(Error::Config("Connection user must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_lab_setup() {
        let config = OpsConfig::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.connection.user, "root");
        assert_eq!(config.connection.password, "");
        assert_eq!(config.connection.database, "flight_reservation");
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.delay_ms, 2000);
        assert_eq!(config.export.insert_chunk_rows, 1000);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: OpsConfig = toml::from_str(
            r#"
            [connection]
            host = "db.example.test"
            password = "secret"

            [retry]
            attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.host, "db.example.test");
        assert_eq!(config.connection.password, "secret");
        // Untouched fields keep their defaults
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.connection.database, "flight_reservation");
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay_ms, 2000);
        assert_eq!(config.export.insert_chunk_rows, 1000);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: OpsConfig = toml::from_str("").unwrap();
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = OpsConfig::default();
        config.connection.host = "from-file".to_string();
        config.apply_overrides(ConfigOverrides {
            host: Some("from-cli".to_string()),
            port: Some(13306),
            user: None,
            password: Some("p".to_string()),
            database: Some("scratch".to_string()),
        });

        assert_eq!(config.connection.host, "from-cli");
        assert_eq!(config.connection.port, 13306);
        assert_eq!(config.connection.user, "root");
        assert_eq!(config.connection.password, "p");
        assert_eq!(config.connection.database, "scratch");
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = OpsConfig::default();
        config.connection.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_delay() {
        let retry = RetryConfig {
            attempts: 3,
            delay_ms: 2000,
        };
        assert_eq!(retry.delay(), Duration::from_millis(2000));
    }
}
