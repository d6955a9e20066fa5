//! Which relations a find operation should eagerly load.

use std::collections::HashMap;

/// `FindOptions::new().with("posts")` loads the `posts` relation in the same
/// query. An empty set means no joins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    with: HashMap<String, bool>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include relation `name`.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.with.insert(name.into(), true);
        self
    }

    /// Build from a `name -> include` map; `false` entries are ignored.
    pub fn from_map(with: HashMap<String, bool>) -> Self {
        Self { with }
    }

    pub fn includes(&self, name: &str) -> bool {
        self.with.get(name).copied().unwrap_or(false)
    }

    /// Whether any relation is requested at all.
    pub fn has_relations(&self) -> bool {
        self.with.values().any(|include| *include)
    }

    /// Requested names, in no particular order.
    pub fn requested(&self) -> impl Iterator<Item = &str> {
        self.with
            .iter()
            .filter(|(_, include)| **include)
            .map(|(name, _)| name.as_str())
    }
}
