//! Per-table column cache.
//!
//! The resolver is an explicit object shared by every mapper created from the
//! same [`Orm`](crate::Orm). Entries are filled lazily on first use and never
//! invalidated; the schema is assumed stable for the life of the resolver.
//! Two callers missing the same table at once may both introspect it; the
//! values are identical so whichever insert lands first wins.

use crate::executor::{OrmError, SchemaExecutor};
use crate::query::statement::{render_projections, Dialect, Projection, TableRef};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

#[derive(Debug, Default)]
pub struct ColumnResolver {
    cache: RwLock<HashMap<String, Arc<[String]>>>,
}

impl ColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered column names of `table`, introspected on first call.
    pub fn columns(
        &self,
        executor: &dyn SchemaExecutor,
        table: &TableRef,
    ) -> Result<Arc<[String]>, OrmError> {
        let key = table.key();
        if let Some(cached) = self.read_cache().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let schema = table.schema.as_deref().ok_or_else(|| {
            OrmError::QueryError(format!("cannot introspect unqualified table `{}`", table.table))
        })?;

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::introspect_span(&key).entered();

        let fetched: Arc<[String]> = executor.column_names(schema, &table.table)?.into();
        log::debug!("cached {} columns for {key}", fetched.len());

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key).or_insert(fetched)))
    }

    /// One aliased projection per column, in introspection order:
    /// `schema.table.col AS [prefix_]col`.
    pub fn aliased_columns(
        &self,
        executor: &dyn SchemaExecutor,
        table: &TableRef,
        prefix: Option<&str>,
    ) -> Result<Vec<Projection>, OrmError> {
        let columns = self.columns(executor, table)?;
        Ok(columns
            .iter()
            .map(|col| Projection::aliased(table.column(col.as_str()), alias_for(prefix, col)))
            .collect())
    }

    /// The comma-joined SQL fragment for [`ColumnResolver::aliased_columns`].
    pub fn aliased_columns_sql(
        &self,
        executor: &dyn SchemaExecutor,
        table: &TableRef,
        prefix: Option<&str>,
        dialect: Dialect,
    ) -> Result<String, OrmError> {
        let projections = self.aliased_columns(executor, table, prefix)?;
        Ok(render_projections(&projections, dialect))
    }

    /// Whether `table` has already been introspected.
    pub fn is_cached(&self, table: &TableRef) -> bool {
        self.read_cache().contains_key(&table.key())
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<[String]>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }
}

pub(crate) fn alias_for(prefix: Option<&str>, column: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}_{column}"),
        None => column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockExecutor;

    fn users() -> TableRef {
        TableRef::new("test_main", "users")
    }

    #[test]
    fn introspects_once_per_table() {
        let db = MockExecutor::new().with_table("test_main", "users", &["id", "name", "email"]);
        let resolver = ColumnResolver::new();

        let first = resolver.columns(&db, &users()).unwrap();
        let second = resolver.columns(&db, &users()).unwrap();

        assert_eq!(&*first, ["id", "name", "email"]);
        assert_eq!(first, second);
        assert_eq!(db.introspection_count("test_main", "users"), 1);
        assert!(resolver.is_cached(&users()));
    }

    #[test]
    fn aliased_fragment_keeps_introspection_order() {
        let db = MockExecutor::new().with_table("test_secondary", "posts", &["id", "title", "userId"]);
        let resolver = ColumnResolver::new();
        let posts = TableRef::new("test_secondary", "posts");

        let plain = resolver
            .aliased_columns_sql(&db, &posts, None, Dialect::Generic)
            .unwrap();
        assert_eq!(
            plain,
            r#""test_secondary"."posts"."id" AS "id", "test_secondary"."posts"."title" AS "title", "test_secondary"."posts"."userId" AS "userId""#
        );

        let prefixed = resolver
            .aliased_columns_sql(&db, &posts, Some("posts"), Dialect::Generic)
            .unwrap();
        assert_eq!(
            prefixed,
            r#""test_secondary"."posts"."id" AS "posts_id", "test_secondary"."posts"."title" AS "posts_title", "test_secondary"."posts"."userId" AS "posts_userId""#
        );
    }

    #[test]
    fn unknown_table_propagates_and_is_not_cached() {
        let db = MockExecutor::new();
        let resolver = ColumnResolver::new();
        let missing = TableRef::new("test_main", "ghosts");

        let err = resolver.columns(&db, &missing).unwrap_err();
        assert!(matches!(err, OrmError::Introspection { .. }));
        assert!(!resolver.is_cached(&missing));
    }

    #[test]
    fn concurrent_first_access_settles_on_one_value() {
        let db = Arc::new(MockExecutor::new().with_table("test_main", "users", &["id", "name"]));
        let resolver = Arc::new(ColumnResolver::new());

        std::thread::scope(|s| {
            for _ in 0..8 {
                let db = Arc::clone(&db);
                let resolver = Arc::clone(&resolver);
                s.spawn(move || {
                    let cols = resolver.columns(&*db, &users()).unwrap();
                    assert_eq!(&*cols, ["id", "name"]);
                });
            }
        });

        let calls = db.introspection_count("test_main", "users");
        assert!((1..=8).contains(&calls));
        assert_eq!(&*resolver.columns(&*db, &users()).unwrap(), ["id", "name"]);
        assert_eq!(db.introspection_count("test_main", "users"), calls);
    }
}
