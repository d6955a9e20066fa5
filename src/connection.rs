//! Connection establishment for the per-schema pools.
//!
//! Wraps `may_postgres::connect` with connection-string validation so that a
//! misconfigured schema fails when it is registered, not on the first query.

use may_postgres::{Client, Error as PostgresError};
use std::fmt;

/// Connection error type
#[derive(Debug)]
pub enum ConnectionError {
    /// Invalid connection string format
    InvalidConnectionString(String),
    /// Network/authentication error from may_postgres
    PostgresError(PostgresError),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidConnectionString(s) => {
                write!(f, "Invalid connection string: {s}")
            }
            ConnectionError::PostgresError(e) => {
                write!(f, "PostgreSQL error: {e}")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

impl From<PostgresError> for ConnectionError {
    fn from(err: PostgresError) -> Self {
        ConnectionError::PostgresError(err)
    }
}

/// Open a single client for `connection_string`.
///
/// Blocking from the caller's point of view; inside a `may` coroutine only the
/// coroutine is parked while the handshake runs. Timing and spans belong to
/// the pool checkout that calls this.
pub fn connect(connection_string: &str) -> Result<Client, ConnectionError> {
    validate_connection_string(connection_string)?;
    let client = may_postgres::connect(connection_string)?;
    log::debug!("opened connection");
    Ok(client)
}

/// Check that a connection string is either a `postgres://` URI with
/// credentials or a `key=value` list.
pub fn validate_connection_string(connection_string: &str) -> Result<(), ConnectionError> {
    if connection_string.trim().is_empty() {
        return Err(ConnectionError::InvalidConnectionString(
            "connection string cannot be empty".to_string(),
        ));
    }

    let is_uri = connection_string.starts_with("postgresql://")
        || connection_string.starts_with("postgres://");
    let is_key_value = !is_uri && connection_string.contains('=');

    if !is_uri && !is_key_value {
        return Err(ConnectionError::InvalidConnectionString(format!(
            "expected postgres:// URI or key=value pairs, got `{connection_string}`"
        )));
    }

    if is_uri && !connection_string.contains('@') {
        return Err(ConnectionError::InvalidConnectionString(
            "URI must contain '@' between credentials and host".to_string(),
        ));
    }

    Ok(())
}
