//! `SELECT` statements built with `sea-query`.
//!
//! [`SelectStatement`] wraps a `sea_query::SelectStatement` over one primary
//! table. Projections, left joins and the criteria filter are added to the
//! wrapped statement as they are planned; the backend builder picked by the
//! [`Dialect`] renders the SQL text and collects the bound parameters in the
//! same pass, so the n-th placeholder always binds the n-th value.

use crate::executor::OrmError;
use crate::value::sea::from_sea_values;
use crate::value::Value;
use sea_query::{
    Asterisk, Condition, DynIden, Expr, ExprTrait, IntoColumnRef, PostgresQueryBuilder, Query,
    SchemaName, SqliteQueryBuilder, TableName, Values,
};
use std::fmt;

/// Which backend builder renders a statement.
///
/// Identifiers are double-quoted by both builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `?` placeholders.
    #[default]
    Generic,
    /// `$1`, `$2`, ... placeholders.
    Postgres,
}

impl Dialect {
    /// Marker for the one value of a trusted `column operator <marker>` term.
    /// `sea-query` substitutes it with the statement-wide placeholder.
    fn term_marker(self) -> &'static str {
        match self {
            Dialect::Generic => "?",
            // numbered markers index the term's own values
            Dialect::Postgres => "$1",
        }
    }

    fn build(self, query: &sea_query::SelectStatement) -> (String, Values) {
        match self {
            Dialect::Generic => query.build(SqliteQueryBuilder),
            Dialect::Postgres => query.build(PostgresQueryBuilder),
        }
    }
}

/// A table, optionally qualified by its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    pub fn unqualified(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    /// Column `column` of this table.
    pub fn column(&self, column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            table: self.clone(),
            column: column.into(),
        }
    }

    /// Cache key and log form: `schema.table`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub(crate) fn table_ref(&self) -> sea_query::TableRef {
        let table = DynIden::from(self.table.clone());
        let schema = self
            .schema
            .as_ref()
            .map(|schema| SchemaName::from(DynIden::from(schema.clone())));
        let name = TableName(schema, table);
        sea_query::TableRef::Table(name, None)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// A column qualified by its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: TableRef,
    pub column: String,
}

impl ColumnRef {
    pub(crate) fn column_ref(&self) -> sea_query::ColumnRef {
        let table = DynIden::from(self.table.table.clone());
        let column = DynIden::from(self.column.clone());
        match &self.table.schema {
            Some(schema) => (DynIden::from(schema.clone()), table, column).into_column_ref(),
            None => (table, column).into_column_ref(),
        }
    }

    pub(crate) fn expr(&self) -> Expr {
        Expr::col(self.column_ref())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// `schema.table.column AS alias`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub column: ColumnRef,
    pub alias: String,
}

impl Projection {
    pub fn aliased(column: ColumnRef, alias: impl Into<String>) -> Self {
        Self {
            column,
            alias: alias.into(),
        }
    }

    /// The column name this entry produces in the result set.
    pub fn output_name(&self) -> &str {
        &self.alias
    }
}

/// `LEFT JOIN table ON left = right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: TableRef,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

impl Join {
    pub fn left(table: TableRef, left: ColumnRef, right: ColumnRef) -> Self {
        Self { table, left, right }
    }

    fn on(&self) -> Expr {
        self.left.expr().equals(self.right.column_ref())
    }

    /// The `LEFT JOIN ... ON ...` clause alone.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut query = Query::select();
        query
            .column(Asterisk)
            .from(self.left.table.table_ref())
            .left_join(self.table.table_ref(), self.on());
        let (sql, _) = dialect.build(&query);
        match sql.find("LEFT JOIN") {
            Some(at) => sql[at..].to_string(),
            None => sql,
        }
    }
}

/// One predicate of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `column operator ?`. Column and operator are trusted text and are
    /// emitted verbatim; only the value is bound.
    Raw {
        column: String,
        operator: String,
        value: Value,
    },
    /// `schema.table.column = ?` with a quoted, qualified column.
    Equals { column: ColumnRef, value: Value },
}

impl Term {
    pub fn value(&self) -> &Value {
        match self {
            Term::Raw { value, .. } | Term::Equals { value, .. } => value,
        }
    }

    fn expr(&self, dialect: Dialect) -> Expr {
        match self {
            Term::Raw {
                column,
                operator,
                value,
            } => Expr::cust_with_values(
                format!("{column} {operator} {}", dialect.term_marker()),
                [sea_query::Value::from(value.clone())],
            ),
            Term::Equals { column, value } => {
                column.expr().eq(sea_query::Value::from(value.clone()))
            }
        }
    }
}

/// `WHERE <AND-group> [OR <OR-group>]`
///
/// The AND-group is one condition; when both groups are present it is a
/// single operand of the OR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub all: Vec<Term>,
    pub any: Vec<Term>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.all.iter().chain(&self.any).map(Term::value)
    }

    fn condition(&self, dialect: Dialect) -> Option<Condition> {
        let and_group = self
            .all
            .iter()
            .fold(Condition::all(), |cond, term| cond.add(term.expr(dialect)));
        let or_terms = self.any.iter().map(|term| term.expr(dialect));

        match (self.all.is_empty(), self.any.is_empty()) {
            (true, true) => None,
            (false, true) => Some(and_group),
            (true, false) => Some(or_terms.fold(Condition::any(), Condition::add)),
            (false, false) => Some(or_terms.fold(Condition::any().add(and_group), Condition::add)),
        }
    }
}

/// A `SELECT` over one primary table and any number of left joins.
///
/// Selects `*` until a column is added.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    query: sea_query::SelectStatement,
    dialect: Dialect,
    projected: bool,
}

impl SelectStatement {
    pub fn new(from: &TableRef, dialect: Dialect) -> Self {
        let mut query = Query::select();
        query.from(from.table_ref());
        Self {
            query,
            dialect,
            projected: false,
        }
    }

    pub fn column(&mut self, projection: &Projection) -> &mut Self {
        self.query
            .expr_as(projection.column.expr(), DynIden::from(projection.alias.clone()));
        self.projected = true;
        self
    }

    pub fn columns<'a>(
        &mut self,
        projections: impl IntoIterator<Item = &'a Projection>,
    ) -> &mut Self {
        for projection in projections {
            self.column(projection);
        }
        self
    }

    pub fn left_join(&mut self, join: &Join) -> &mut Self {
        self.query.left_join(join.table.table_ref(), join.on());
        self
    }

    pub fn filter(&mut self, filter: &Filter) -> &mut Self {
        if let Some(condition) = filter.condition(self.dialect) {
            self.query.cond_where(condition);
        }
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The SQL text alone.
    pub fn to_sql(&self) -> String {
        self.render().0
    }

    /// SQL text and the parameters for its placeholders.
    pub fn build(&self) -> Result<(String, Vec<Value>), OrmError> {
        let (sql, values) = self.render();
        Ok((sql, from_sea_values(values)?))
    }

    fn render(&self) -> (String, Values) {
        if self.projected {
            return self.dialect.build(&self.query);
        }
        let mut query = self.query.clone();
        query.column(Asterisk);
        self.dialect.build(&query)
    }
}

/// `schema.table.col AS alias, ...` as it appears in a select list.
pub fn render_projections(projections: &[Projection], dialect: Dialect) -> String {
    let mut query = Query::select();
    for projection in projections {
        query.expr_as(projection.column.expr(), DynIden::from(projection.alias.clone()));
    }
    let (sql, _) = dialect.build(&query);
    match sql.strip_prefix("SELECT ") {
        Some(list) => list.to_string(),
        None => sql,
    }
}
