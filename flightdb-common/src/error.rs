//! Common error types for flightdb

use thiserror::Error;

/// Common result type for flightdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the flightdb tools
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (wraps zip::result::ZipError)
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a connection-phase failure is worth retrying.
    ///
    /// Network-level failures (socket I/O, TLS, pool timeouts, protocol
    /// breakdown during handshake) are transient while a container is still
    /// starting up. Authentication failures and SQL execution errors are
    /// deterministic and retrying them only delays the real diagnostic.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::Protocol(_)
            ),
            Error::Io(_) => true,
            _ => false,
        }
    }
}
