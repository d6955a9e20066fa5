//! Recording executor for unit tests.
//!
//! Public so that downstream crates can exercise their mappers without a
//! database.
//!
//! ```rust
//! use joinery::test_helpers::MockExecutor;
//! use joinery::{FindOptions, Orm, Row};
//! use std::sync::Arc;
//!
//! let db = Arc::new(
//!     MockExecutor::new()
//!         .with_table("test_main", "users", &["id", "name"])
//!         .with_rows(vec![Row::new().with("id", 1).with("name", "John Doe")]),
//! );
//! let orm = Orm::new(db.clone());
//! let users = orm.mapper::<joinery::Record>("test_main", "users");
//!
//! let found = users.find_all(&FindOptions::new()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(
//!     db.captured_sql(),
//!     [r#"SELECT "test_main"."users"."id" AS "id", "test_main"."users"."name" AS "name" FROM "test_main"."users""#]
//! );
//! ```

use crate::executor::{OrmError, SchemaExecutor};
use crate::query::Dialect;
use crate::value::{Row, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory [`SchemaExecutor`] that records every query it is given.
///
/// Queries return scripted result sets in FIFO order, or no rows once the
/// script is exhausted.
#[derive(Debug, Default, Clone)]
pub struct MockExecutor {
    dialect: Dialect,
    tables: Arc<Mutex<HashMap<(String, String), Vec<String>>>>,
    results: Arc<Mutex<VecDeque<Vec<Row>>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    captured_sql: Arc<Mutex<Vec<String>>>,
    captured_params: Arc<Mutex<Vec<Vec<Value>>>>,
    introspections: Arc<Mutex<HashMap<(String, String), usize>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the ordered columns of `schema.table`.
    pub fn with_table(self, schema: &str, table: &str, columns: &[&str]) -> Self {
        lock(&self.tables).insert(
            (schema.to_string(), table.to_string()),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Queue one result set.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.push_rows(rows);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn push_rows(&self, rows: Vec<Row>) {
        lock(&self.results).push_back(rows);
    }

    /// Make the next `query_all` fail with [`OrmError::QueryError`].
    pub fn fail_next_query(&self, message: &str) {
        lock(&self.failures).push_back(message.to_string());
    }

    pub fn captured_sql(&self) -> Vec<String> {
        lock(&self.captured_sql).clone()
    }

    pub fn captured_params(&self) -> Vec<Vec<Value>> {
        lock(&self.captured_params).clone()
    }

    pub fn introspection_count(&self, schema: &str, table: &str) -> usize {
        lock(&self.introspections)
            .get(&(schema.to_string(), table.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        lock(&self.captured_sql).clear();
        lock(&self.captured_params).clear();
    }
}

impl SchemaExecutor for MockExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query_all(&self, _schema: &str, sql: &str, params: &[Value]) -> Result<Vec<Row>, OrmError> {
        lock(&self.captured_sql).push(sql.to_string());
        lock(&self.captured_params).push(params.to_vec());

        if let Some(message) = lock(&self.failures).pop_front() {
            return Err(OrmError::QueryError(message));
        }
        Ok(lock(&self.results).pop_front().unwrap_or_default())
    }

    fn column_names(&self, schema: &str, table: &str) -> Result<Vec<String>, OrmError> {
        let key = (schema.to_string(), table.to_string());
        *lock(&self.introspections).entry(key.clone()).or_insert(0) += 1;

        lock(&self.tables)
            .get(&key)
            .cloned()
            .ok_or_else(|| OrmError::Introspection {
                schema: schema.to_string(),
                table: table.to_string(),
                reason: "no columns found".to_string(),
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
