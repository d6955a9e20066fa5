//! Flat result rows keyed by column alias.

use crate::value::Value;

/// One row of a (possibly joined) result set.
///
/// Keeps the column order the database returned; aliases are expected to be
/// unique, which the join planner guarantees for statements it builds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Append a cell. A later cell with the same alias shadows nothing; lookups
    /// return the first match.
    pub fn push(&mut self, alias: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((alias.into(), value.into()));
    }

    /// Builder form of [`Row::push`], handy for scripted rows in tests.
    pub fn with(mut self, alias: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(alias, value);
        self
    }

    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_alias_preserves_order() {
        let row = Row::new()
            .with("id", 1)
            .with("name", "John Doe")
            .with("posts_id", Value::Null);

        assert_eq!(row.get("name"), Some(&Value::String("John Doe".into())));
        assert_eq!(row.get("posts_id"), Some(&Value::Null));
        assert!(row.get("email").is_none());
        let order: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(order, ["id", "name", "posts_id"]);
    }
}
