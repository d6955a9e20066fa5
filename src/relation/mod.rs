//! Relations, join planning and reassembly of joined rows.
//!
//! A mapper keeps its relations in a [`RelationMap`]. For a find with
//! [`FindOptions`](crate::FindOptions) the [`join`] planner turns the
//! requested subset into `LEFT JOIN`s plus `<relation>_<column>` aliased
//! projections, and [`reassemble`] folds the flat joined rows back into one
//! [`Record`](crate::Record) per primary `id`.

pub mod def;
pub mod join;
pub mod reassemble;

pub use def::{Relation, RelationType};
pub use join::{JoinPlan, PlannedRelation};

use crate::executor::OrmError;
use once_cell::sync::Lazy;
use regex::Regex;

static RELATION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("relation name pattern is valid")
});

/// Named relations in registration order.
#[derive(Debug, Clone, Default)]
pub struct RelationMap {
    entries: Vec<(String, Relation)>,
}

impl RelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `relation` under `name`, replacing (in place) any relation
    /// already registered under that name.
    ///
    /// # Errors
    ///
    /// [`OrmError::RelationConflict`] if `name` is not a plain identifier or
    /// if `name_` and another relation's prefix overlap (`post` / `post_tags`),
    /// which would make their aliased columns indistinguishable.
    pub fn insert(&mut self, name: impl Into<String>, relation: Relation) -> Result<(), OrmError> {
        let name = name.into();
        if !RELATION_NAME.is_match(&name) {
            return Err(OrmError::RelationConflict(format!(
                "relation name `{name}` must start with a letter and contain only letters, digits and '_'"
            )));
        }

        let prefix = format!("{name}_");
        for (existing, _) in self.entries.iter().filter(|(n, _)| *n != name) {
            let other = format!("{existing}_");
            if prefix.starts_with(&other) || other.starts_with(&prefix) {
                return Err(OrmError::RelationConflict(format!(
                    "relation `{name}` overlaps the alias prefix of relation `{existing}`"
                )));
            }
        }

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = relation,
            None => self.entries.push((name, relation)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, relation)| relation)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
