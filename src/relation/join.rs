//! Join planning for eager loading.
//!
//! For every registered relation that the caller requested, in registration
//! order:
//!
//! - one-to-many / many-to-one:
//!   `LEFT JOIN related ON owner.<pk|id> = related.<foreign_key>`
//! - many-to-many:
//!   `LEFT JOIN owner_schema.join_table ON owner.<pk|id> = join_table.<join_foreign_key>`
//!   followed by `LEFT JOIN related ON join_table.<foreign_key> = related.id`
//!
//! plus every column of the related table aliased as `<relation>_<column>`.

use crate::executor::{OrmError, SchemaExecutor};
use crate::query::columns::alias_for;
use crate::query::statement::render_projections;
use crate::query::{ColumnResolver, Dialect, FindOptions, Join, Projection, SelectStatement, TableRef};
use crate::relation::{RelationMap, RelationType};
use std::collections::HashSet;

/// A relation as it appears in one planned statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRelation {
    pub name: String,
    pub rel_type: RelationType,
    /// `(alias, column)` for every selected column of the related table.
    pub columns: Vec<(String, String)>,
    pub(crate) projections: Vec<Projection>,
    pub(crate) joins: Vec<Join>,
}

/// Output of the planner; empty when no requested relation is registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinPlan {
    pub relations: Vec<PlannedRelation>,
}

impl JoinPlan {
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn joins(&self) -> impl Iterator<Item = &Join> {
        self.relations.iter().flat_map(|r| r.joins.iter())
    }

    pub fn projections(&self) -> impl Iterator<Item = &Projection> {
        self.relations.iter().flat_map(|r| r.projections.iter())
    }

    /// Rendered `LEFT JOIN ...` clauses, in plan order.
    pub fn clauses(&self, dialect: Dialect) -> Vec<String> {
        self.joins().map(|j| j.to_sql(dialect)).collect()
    }

    /// One comma-joined aliased column fragment per planned relation.
    pub fn fields(&self, dialect: Dialect) -> Vec<String> {
        self.relations
            .iter()
            .map(|r| render_projections(&r.projections, dialect))
            .collect()
    }

    /// Add every planned column and `LEFT JOIN` to `stmt`, in plan order.
    pub fn apply(&self, stmt: &mut SelectStatement) {
        stmt.columns(self.projections());
        for join in self.joins() {
            stmt.left_join(join);
        }
    }

    /// Check that no output column name is produced twice, counting the
    /// primary table's columns.
    ///
    /// # Errors
    ///
    /// [`OrmError::RelationConflict`] naming the first duplicated alias.
    pub fn check_aliases(&self, primary_columns: &[String]) -> Result<(), OrmError> {
        let mut seen: HashSet<&str> = primary_columns.iter().map(String::as_str).collect();
        for relation in &self.relations {
            for (alias, _) in &relation.columns {
                if !seen.insert(alias.as_str()) {
                    return Err(OrmError::RelationConflict(format!(
                        "column alias `{alias}` of relation `{}` collides with another selected column",
                        relation.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Plan the joins for the relations of `relations` that `options` requests.
///
/// # Errors
///
/// Introspection failures for a related table propagate. A table that would
/// appear twice in one statement (self-relations, two relations to the same
/// table) is rejected with [`OrmError::RelationConflict`], since the joins are
/// not table-aliased.
pub fn plan(
    owner: &TableRef,
    relations: &RelationMap,
    options: &FindOptions,
    resolver: &ColumnResolver,
    executor: &dyn SchemaExecutor,
) -> Result<JoinPlan, OrmError> {
    for name in options.requested().filter(|n| !relations.contains(n)) {
        log::debug!("ignoring unregistered relation `{name}` requested on {owner}");
    }

    let mut planned = Vec::new();
    let mut tables: HashSet<TableRef> = HashSet::from([owner.clone()]);
    let mut claim = |table: &TableRef, name: &str| {
        if tables.insert(table.clone()) {
            Ok(())
        } else {
            Err(OrmError::RelationConflict(format!(
                "relation `{name}` would join {table} a second time"
            )))
        }
    };

    for (name, relation) in relations.iter().filter(|(n, _)| options.includes(n)) {
        let related = relation.related();
        let owner_key = owner.column(relation.owner_key());

        let joins = match relation.rel_type() {
            RelationType::OneToMany | RelationType::ManyToOne => {
                claim(related, name)?;
                vec![Join::left(
                    related.clone(),
                    owner_key,
                    related.column(relation.foreign_key()),
                )]
            }
            RelationType::ManyToMany => {
                let (Some(join_table), Some(join_fk)) =
                    (relation.join_table(), relation.join_foreign_key())
                else {
                    return Err(OrmError::QueryError(format!(
                        "many-to-many relation `{name}` has no join table"
                    )));
                };
                let through = TableRef {
                    schema: owner.schema.clone(),
                    table: join_table.to_string(),
                };
                claim(&through, name)?;
                claim(related, name)?;
                vec![
                    Join::left(through.clone(), owner_key, through.column(join_fk)),
                    Join::left(
                        related.clone(),
                        through.column(relation.foreign_key()),
                        related.column("id"),
                    ),
                ]
            }
        };

        let projections = resolver.aliased_columns(executor, related, Some(name))?;
        let columns = resolver
            .columns(executor, related)?
            .iter()
            .map(|col| (alias_for(Some(name), col), col.clone()))
            .collect();

        planned.push(PlannedRelation {
            name: name.to_string(),
            rel_type: relation.rel_type(),
            columns,
            projections,
            joins,
        });
    }

    Ok(JoinPlan { relations: planned })
}
