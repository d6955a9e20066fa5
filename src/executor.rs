//! The execution seam and the crate error type.
//!
//! Everything above this module talks to the database through
//! [`SchemaExecutor`]: run a parameterized statement against a named schema
//! and get flat rows back, or list the columns of a table. [`DbPoolManager`]
//! is the PostgreSQL implementation; tests plug in a recording mock.
//!
//! [`DbPoolManager`]: crate::pool::DbPoolManager

use crate::connection::ConnectionError;
use crate::query::Dialect;
use crate::value::{Row, Value};
use may_postgres::Error as PostgresError;
use std::fmt;

/// Error type for every mapper operation
#[derive(Debug)]
pub enum OrmError {
    /// No pool is registered for the requested schema, or the configuration
    /// could not be loaded
    Configuration(String),
    /// A pooled connection could not be opened
    Connection(ConnectionError),
    /// Timed out waiting for a free pool slot
    Pool(String),
    /// Column introspection failed (unknown schema or table)
    Introspection {
        schema: String,
        table: String,
        reason: String,
    },
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// Query construction or execution error
    QueryError(String),
    /// Row decoding or typed extraction error
    ParseError(String),
    /// Relation names or aliases that would make reassembly ambiguous
    RelationConflict(String),
}

impl fmt::Display for OrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrmError::Configuration(s) => write!(f, "Configuration error: {s}"),
            OrmError::Connection(e) => write!(f, "Connection error: {e}"),
            OrmError::Pool(s) => write!(f, "Pool error: {s}"),
            OrmError::Introspection {
                schema,
                table,
                reason,
            } => write!(f, "Introspection error for {schema}.{table}: {reason}"),
            OrmError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            OrmError::QueryError(s) => write!(f, "Query error: {s}"),
            OrmError::ParseError(s) => write!(f, "Parse error: {s}"),
            OrmError::RelationConflict(s) => write!(f, "Relation conflict: {s}"),
        }
    }
}

impl std::error::Error for OrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrmError::Connection(e) => Some(e),
            OrmError::PostgresError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for OrmError {
    fn from(err: PostgresError) -> Self {
        OrmError::PostgresError(err)
    }
}

impl From<ConnectionError> for OrmError {
    fn from(err: ConnectionError) -> Self {
        OrmError::Connection(err)
    }
}

/// Executes statements against named schemas.
///
/// Implementations own connection handling: each call acquires what it needs
/// and releases it before returning, whether the call succeeded or not.
pub trait SchemaExecutor: Send + Sync {
    /// How statements for this executor are rendered.
    fn dialect(&self) -> Dialect {
        Dialect::Generic
    }

    /// Run a parameterized statement and return every row.
    ///
    /// `params` line up 1:1 with the placeholders in `sql`, left to right.
    ///
    /// # Errors
    ///
    /// [`OrmError::Configuration`] when `schema` is not registered; any
    /// database failure is returned unmodified.
    fn query_all(&self, schema: &str, sql: &str, params: &[Value]) -> Result<Vec<Row>, OrmError>;

    /// Column names of `schema.table` in database-defined order.
    ///
    /// # Errors
    ///
    /// [`OrmError::Introspection`] when the table or schema is unknown.
    fn column_names(&self, schema: &str, table: &str) -> Result<Vec<String>, OrmError>;
}

impl<T: SchemaExecutor + ?Sized> SchemaExecutor for std::sync::Arc<T> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query_all(&self, schema: &str, sql: &str, params: &[Value]) -> Result<Vec<Row>, OrmError> {
        (**self).query_all(schema, sql, params)
    }

    fn column_names(&self, schema: &str, table: &str) -> Result<Vec<String>, OrmError> {
        (**self).column_names(schema, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_category() {
        let err = OrmError::Configuration("No pool found for schema: missing".into());
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("missing"));

        let err = OrmError::Introspection {
            schema: "test_main".into(),
            table: "nope".into(),
            reason: "table not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Introspection error for test_main.nope: table not found"
        );
    }

    #[test]
    fn connection_errors_convert() {
        let err: OrmError = ConnectionError::InvalidConnectionString("empty".into()).into();
        assert!(matches!(err, OrmError::Connection(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn arc_forwards_dialect() {
        struct Pg;
        impl SchemaExecutor for Pg {
            fn dialect(&self) -> Dialect {
                Dialect::Postgres
            }
            fn query_all(&self, _: &str, _: &str, _: &[Value]) -> Result<Vec<Row>, OrmError> {
                Ok(vec![])
            }
            fn column_names(&self, _: &str, _: &str) -> Result<Vec<String>, OrmError> {
                Ok(vec![])
            }
        }

        let shared: std::sync::Arc<dyn SchemaExecutor> = std::sync::Arc::new(Pg);
        assert_eq!(shared.dialect(), Dialect::Postgres);
    }
}
