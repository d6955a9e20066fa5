//! Predicate accumulation for `find`.
//!
//! ```rust
//! use joinery::{Criteria, Value};
//!
//! let mut criteria = Criteria::new("users");
//! criteria.where_("name", "=", "John Doe").or_where("email", "LIKE", "%@example.com");
//!
//! let sql = criteria.build();
//! assert!(sql.starts_with(r#"SELECT * FROM "users" WHERE "#));
//! assert!(sql.contains("name = ?"));
//! assert!(sql.contains(" OR email LIKE ?"));
//! assert_eq!(
//!     criteria.values(),
//!     vec![Value::from("John Doe"), Value::from("%@example.com")]
//! );
//! ```

use crate::query::statement::{ColumnRef, Dialect, Filter, SelectStatement, TableRef, Term};
use crate::value::Value;

/// AND/OR predicates scoped to one (unqualified) table.
///
/// Column and operator strings are not escaped: pass trusted identifiers
/// only. Values are always bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    table: String,
    filter: Filter,
}

impl Criteria {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Filter::default(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Add `column operator ?` to the AND-group.
    pub fn where_(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.filter.all.push(Term::Raw {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    /// Add `column operator ?` to the OR-group.
    pub fn or_where(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.filter.any.push(Term::Raw {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        });
        self
    }

    /// Add `column = ?` against a qualified column to the AND-group.
    pub(crate) fn where_column_eq(
        &mut self,
        column: ColumnRef,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.filter.all.push(Term::Equals {
            column,
            value: value.into(),
        });
        self
    }

    /// `SELECT * FROM <table> [WHERE ...]` with `?` placeholders.
    pub fn build(&self) -> String {
        let table = TableRef::unqualified(self.table.clone());
        let mut stmt = SelectStatement::new(&table, Dialect::Generic);
        stmt.filter(&self.filter);
        stmt.to_sql()
    }

    /// Parameters in placeholder order: the AND-group values followed by the
    /// OR-group values, each in call order.
    pub fn values(&self) -> Vec<Value> {
        self.filter.values().cloned().collect()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub(crate) fn into_filter(self) -> Filter {
        self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_clause(sql: &str) -> &str {
        sql.split_once(" WHERE ").map(|(_, w)| w).unwrap()
    }

    #[test]
    fn no_predicates_means_no_where() {
        assert_eq!(Criteria::new("users").build(), r#"SELECT * FROM "users""#);
        assert!(Criteria::new("users").values().is_empty());
    }

    #[test]
    fn and_only_never_contains_or() {
        let mut c = Criteria::new("users");
        c.where_("name", "=", "John Doe")
            .where_("id", ">", 0)
            .where_("email", "<>", "");

        let sql = c.build();
        assert!(sql.starts_with(r#"SELECT * FROM "users" WHERE "#));
        let clause = where_clause(&sql);
        assert_eq!(clause.matches(" AND ").count(), 2);
        assert!(!sql.contains(" OR "));
        assert!(clause.find("name = ?") < clause.find("id > ?"));
        assert!(clause.find("id > ?") < clause.find("email <> ?"));
        assert_eq!(c.values().len(), 3);
    }

    #[test]
    fn and_group_is_one_operand_of_the_or() {
        let mut c = Criteria::new("users");
        c.where_("a", "=", 1)
            .where_("b", "=", 2)
            .or_where("c", "=", 3)
            .or_where("d", "=", 4);

        let sql = c.build();
        let (and_group, or_group) = where_clause(&sql).split_once(" OR ").unwrap();
        assert!(and_group.contains("a = ? AND b = ?"), "{sql}");
        assert!(!and_group.contains(" OR "));
        assert!(or_group.contains("c = ?"));
        assert!(or_group.contains(" OR d = ?"));
        assert_eq!(
            c.values(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn or_only_has_no_leading_separator() {
        let mut c = Criteria::new("users");
        c.or_where("name", "=", "x").or_where("name", "=", "y");

        let sql = c.build();
        let clause = where_clause(&sql);
        assert!(!clause.trim_start_matches('(').starts_with("OR"));
        assert_eq!(clause.matches(" OR ").count(), 1);
        assert!(!clause.contains(" AND "));
    }

    #[test]
    fn values_follow_placeholder_order_when_calls_interleave() {
        let mut c = Criteria::new("users");
        c.or_where("c", "=", "or-first").where_("a", "=", "and-second");

        let sql = c.build();
        assert!(where_clause(&sql).find("a = ?") < where_clause(&sql).find("c = ?"));
        assert_eq!(
            c.values(),
            vec![Value::from("and-second"), Value::from("or-first")]
        );
    }

    #[test]
    fn values_match_the_parameters_of_the_built_statement() {
        let mut c = Criteria::new("users");
        c.or_where("c", "=", 3).where_("a", "=", 1).or_where("d", "=", 4);

        let mut stmt = SelectStatement::new(&TableRef::unqualified("users"), Dialect::Postgres);
        stmt.filter(c.filter());
        let (sql, params) = stmt.build().unwrap();

        assert_eq!(params, c.values());
        assert!(sql.contains("a = $1"), "{sql}");
        assert!(sql.contains("c = $2"), "{sql}");
        assert!(sql.contains("d = $3"), "{sql}");
    }

    #[test]
    fn values_are_not_coerced() {
        let mut c = Criteria::new("users");
        c.where_("id", "=", "1");
        assert_eq!(c.values(), vec![Value::String("1".into())]);
    }

    #[test]
    fn finding_by_name_builds_expected_text() {
        let mut c = Criteria::new("users");
        c.where_("name", "=", "John Doe");
        assert!(c.build().contains("name = ?"));
        assert_eq!(c.values(), vec![Value::from("John Doe")]);
    }
}
