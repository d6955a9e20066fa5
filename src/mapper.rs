//! The entity mapper facade.
//!
//! An [`Orm`] owns the executor and the column cache; each
//! [`EntityMapper`] binds one `schema.table` plus its named relations and
//! answers `find_all`, `find_by_id` and `find` with a single `SELECT` each.
//!
//! ```rust
//! use joinery::test_helpers::MockExecutor;
//! use joinery::{FindOptions, Orm, Record, Relation, Row, Value};
//! use std::sync::Arc;
//!
//! let db = Arc::new(
//!     MockExecutor::new()
//!         .with_table("test_main", "users", &["id", "name"])
//!         .with_table("test_secondary", "posts", &["id", "title", "userId"])
//!         .with_rows(vec![
//!             Row::new().with("id", 1).with("name", "John Doe")
//!                 .with("posts_id", 1).with("posts_title", "First Post").with("posts_userId", 1),
//!             Row::new().with("id", 2).with("name", "Jane Doe")
//!                 .with("posts_id", Value::Null).with("posts_title", Value::Null).with("posts_userId", Value::Null),
//!         ]),
//! );
//! let orm = Orm::new(db.clone());
//! let posts = orm.mapper::<Record>("test_secondary", "posts");
//! let mut users = orm.mapper::<Record>("test_main", "users");
//! users.add_relation("posts", Relation::one_to_many(posts.table().clone(), "userId"))?;
//!
//! let found = users.find_all(&FindOptions::new().with("posts"))?;
//! assert_eq!(found[0].related("posts").map(|p| p.len()), Some(1));
//! assert_eq!(found[1].related("posts").map(|p| p.len()), Some(0));
//! # Ok::<(), joinery::OrmError>(())
//! ```

use crate::executor::{OrmError, SchemaExecutor};
use crate::model::{FromRecord, Record};
use crate::query::{ColumnResolver, Criteria, FindOptions, SelectStatement, TableRef};
use crate::relation::join::{self, JoinPlan};
use crate::relation::reassemble::reassemble;
use crate::relation::{Relation, RelationMap};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Shared context for mappers: the executor and the column cache.
#[derive(Clone)]
pub struct Orm {
    executor: Arc<dyn SchemaExecutor>,
    resolver: Arc<ColumnResolver>,
}

impl Orm {
    pub fn new(executor: Arc<dyn SchemaExecutor>) -> Self {
        Self::with_resolver(executor, Arc::new(ColumnResolver::new()))
    }

    /// Use an existing column cache, e.g. one shared with another `Orm`.
    pub fn with_resolver(executor: Arc<dyn SchemaExecutor>, resolver: Arc<ColumnResolver>) -> Self {
        Self { executor, resolver }
    }

    /// A mapper for `schema.table` with no relations.
    pub fn mapper<E: FromRecord>(&self, schema: impl Into<String>, table: impl Into<String>) -> EntityMapper<E> {
        EntityMapper {
            table: TableRef::new(schema, table),
            executor: Arc::clone(&self.executor),
            resolver: Arc::clone(&self.resolver),
            relations: RelationMap::new(),
            _entity: PhantomData,
        }
    }

    pub fn resolver(&self) -> &Arc<ColumnResolver> {
        &self.resolver
    }

    pub fn executor(&self) -> &Arc<dyn SchemaExecutor> {
        &self.executor
    }
}

impl fmt::Debug for Orm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orm")
            .field("dialect", &self.executor.dialect())
            .finish_non_exhaustive()
    }
}

/// Reads entities of type `E` from one table.
pub struct EntityMapper<E = Record> {
    table: TableRef,
    executor: Arc<dyn SchemaExecutor>,
    resolver: Arc<ColumnResolver>,
    relations: RelationMap,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityMapper<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            executor: Arc::clone(&self.executor),
            resolver: Arc::clone(&self.resolver),
            relations: self.relations.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for EntityMapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMapper")
            .field("table", &self.table.key())
            .field("relations", &self.relations.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

impl<E: FromRecord> EntityMapper<E> {
    /// Register `relation` under `name`, replacing any relation of that name.
    ///
    /// # Errors
    ///
    /// [`OrmError::RelationConflict`] for names that are not identifiers or
    /// whose `name_` alias prefix overlaps another relation's. The mapper and
    /// its existing relations are left unchanged.
    pub fn add_relation(
        &mut self,
        name: impl Into<String>,
        relation: Relation,
    ) -> Result<&mut Self, OrmError> {
        self.relations.insert(name, relation)?;
        Ok(self)
    }

    /// The qualified table this mapper reads, usable as a relation target.
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn relations(&self) -> &RelationMap {
        &self.relations
    }

    /// Every row of the table, with the requested relations loaded.
    pub fn find_all(&self, options: &FindOptions) -> Result<Vec<E>, OrmError> {
        convert(self.find_all_records(options)?)
    }

    /// The entity whose `id` equals `id`, or `None`.
    pub fn find_by_id(&self, id: impl Into<Value>, options: &FindOptions) -> Result<Option<E>, OrmError> {
        let record = self.find_record_by_id(id, options)?;
        record.map(E::from_record).transpose()
    }

    /// Entities matching `criteria`, which must be scoped to this mapper's
    /// (unqualified) table name.
    pub fn find(&self, criteria: Criteria, options: &FindOptions) -> Result<Vec<E>, OrmError> {
        convert(self.find_records(criteria, options)?)
    }

    /// [`EntityMapper::find_all`] without the final conversion.
    pub fn find_all_records(&self, options: &FindOptions) -> Result<Vec<Record>, OrmError> {
        let executor = &*self.executor;
        let primary = self.resolver.columns(executor, &self.table)?;
        let plan = self.plan(options)?;
        plan.check_aliases(&primary)?;

        let mut stmt = SelectStatement::new(&self.table, self.executor.dialect());
        stmt.columns(&self.resolver.aliased_columns(executor, &self.table, None)?);
        plan.apply(&mut stmt);
        self.run(&stmt, &plan)
    }

    /// [`EntityMapper::find_by_id`] without the final conversion.
    pub fn find_record_by_id(&self, id: impl Into<Value>, options: &FindOptions) -> Result<Option<Record>, OrmError> {
        let mut criteria = Criteria::new(self.table.table.clone());
        criteria.where_column_eq(self.table.column("id"), id);

        Ok(self.find_records(criteria, options)?.into_iter().next())
    }

    /// [`EntityMapper::find`] without the final conversion.
    pub fn find_records(&self, criteria: Criteria, options: &FindOptions) -> Result<Vec<Record>, OrmError> {
        if criteria.table() != self.table.table {
            return Err(OrmError::QueryError(format!(
                "criteria for table `{}` used with mapper for {}",
                criteria.table(),
                self.table
            )));
        }

        let plan = self.plan(options)?;
        let mut stmt = SelectStatement::new(&self.table, self.executor.dialect());

        if !plan.is_empty() {
            let executor = &*self.executor;
            let primary = self.resolver.columns(executor, &self.table)?;
            plan.check_aliases(&primary)?;
            stmt.columns(&self.resolver.aliased_columns(executor, &self.table, None)?);
            plan.apply(&mut stmt);
        }
        stmt.filter(&criteria.into_filter());
        self.run(&stmt, &plan)
    }

    fn plan(&self, options: &FindOptions) -> Result<JoinPlan, OrmError> {
        if !options.has_relations() {
            return Ok(JoinPlan::default());
        }
        join::plan(&self.table, &self.relations, options, &self.resolver, &*self.executor)
    }

    fn run(&self, stmt: &SelectStatement, plan: &JoinPlan) -> Result<Vec<Record>, OrmError> {
        let schema = self.table.schema.as_deref().unwrap_or_default();
        let (sql, params) = stmt.build()?;
        log::debug!("{sql} ({} params)", params.len());

        let rows = self.executor.query_all(schema, &sql, &params)?;
        reassemble(rows, &plan.relations)
    }
}

fn convert<E: FromRecord>(records: Vec<Record>) -> Result<Vec<E>, OrmError> {
    records.into_iter().map(E::from_record).collect()
}
