//! Relation metadata.
//!
//! A [`Relation`] is a named, directed edge from the owning table (the one the
//! mapper is bound to) to a related table.
//!
//! ```rust
//! use joinery::{Relation, RelationType, TableRef};
//!
//! // users.id = posts.userId
//! let posts = Relation::one_to_many(TableRef::new("test_secondary", "posts"), "userId");
//!
//! // users.id = user_roles.user_id, user_roles.role_id = roles.id
//! let roles = Relation::many_to_many(
//!     TableRef::new("test_main", "roles"),
//!     "user_roles",
//!     "user_id",
//!     "role_id",
//! );
//!
//! assert_eq!(posts.rel_type(), RelationType::OneToMany);
//! assert_eq!(roles.join_table(), Some("user_roles"));
//! ```

use crate::query::TableRef;

/// Type of relationship between entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// One owner row, many related rows
    OneToMany,
    /// Many owner rows share one related row
    ManyToOne,
    /// Through a join table living in the owner's schema
    ManyToMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    rel_type: RelationType,
    related: TableRef,
    foreign_key: String,
    primary_key: Option<String>,
    join_table: Option<String>,
    join_foreign_key: Option<String>,
}

impl Relation {
    /// `owner.<primary key> = related.<foreign_key>`
    pub fn one_to_many(related: TableRef, foreign_key: impl Into<String>) -> Self {
        Self::direct(RelationType::OneToMany, related, foreign_key)
    }

    /// `owner.<primary key> = related.<foreign_key>`.
    ///
    /// For a classic belongs-to (the owner holds the reference) point the
    /// primary key at the owner's referencing column and the foreign key at
    /// the related `id`: `Relation::many_to_one(users, "id").primary_key("userId")`.
    pub fn many_to_one(related: TableRef, foreign_key: impl Into<String>) -> Self {
        Self::direct(RelationType::ManyToOne, related, foreign_key)
    }

    /// `owner.<primary key> = join_table.<join_foreign_key>` then
    /// `join_table.<foreign_key> = related.id`.
    pub fn many_to_many(
        related: TableRef,
        join_table: impl Into<String>,
        join_foreign_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            rel_type: RelationType::ManyToMany,
            related,
            foreign_key: foreign_key.into(),
            primary_key: None,
            join_table: Some(join_table.into()),
            join_foreign_key: Some(join_foreign_key.into()),
        }
    }

    fn direct(rel_type: RelationType, related: TableRef, foreign_key: impl Into<String>) -> Self {
        Self {
            rel_type,
            related,
            foreign_key: foreign_key.into(),
            primary_key: None,
            join_table: None,
            join_foreign_key: None,
        }
    }

    /// Override the owner-side column (defaults to `id`).
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn rel_type(&self) -> RelationType {
        self.rel_type
    }

    pub fn related(&self) -> &TableRef {
        &self.related
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    /// Owner-side join column.
    pub fn owner_key(&self) -> &str {
        self.primary_key.as_deref().unwrap_or("id")
    }

    pub fn join_table(&self) -> Option<&str> {
        self.join_table.as_deref()
    }

    pub fn join_foreign_key(&self) -> Option<&str> {
        self.join_foreign_key.as_deref()
    }

    pub fn is_many_to_many(&self) -> bool {
        self.rel_type == RelationType::ManyToMany
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_defaults_to_id() {
        let rel = Relation::one_to_many(TableRef::new("s", "posts"), "userId");
        assert_eq!(rel.owner_key(), "id");
        assert_eq!(rel.primary_key("uuid").owner_key(), "uuid");
    }

    #[test]
    fn direct_relations_have_no_join_table() {
        let rel = Relation::many_to_one(TableRef::new("s", "users"), "id").primary_key("userId");
        assert_eq!(rel.rel_type(), RelationType::ManyToOne);
        assert!(rel.join_table().is_none());
        assert!(rel.join_foreign_key().is_none());
        assert!(!rel.is_many_to_many());
    }
}
