//! Reassembled entities.
//!
//! A [`Record`] is the untyped result of one primary row group: the primary
//! table's fields plus one `Vec<Record>` per eagerly loaded relation. Typed
//! entities are extracted from records field by field through [`FromRecord`].
//!
//! ```rust
//! use joinery::{FromRecord, OrmError, Record};
//!
//! struct Post {
//!     id: i64,
//!     title: String,
//! }
//!
//! struct User {
//!     id: i64,
//!     name: String,
//!     posts: Option<Vec<Post>>,
//! }
//!
//! impl FromRecord for Post {
//!     fn from_record(record: Record) -> Result<Self, OrmError> {
//!         Ok(Post { id: record.get("id")?, title: record.get("title")? })
//!     }
//! }
//!
//! impl FromRecord for User {
//!     fn from_record(mut record: Record) -> Result<Self, OrmError> {
//!         Ok(User {
//!             id: record.get("id")?,
//!             name: record.get("name")?,
//!             posts: record.take_related("posts")?,
//!         })
//!     }
//! }
//! ```

use crate::executor::OrmError;
use crate::value::{Value, ValueType};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Conversion from a reassembled [`Record`] into a caller-declared type.
pub trait FromRecord: Sized {
    fn from_record(record: Record) -> Result<Self, OrmError>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Result<Self, OrmError> {
        Ok(record)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
    relations: Vec<(String, Vec<Record>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and by callers assembling expected values.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing an existing field of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Typed field access.
    ///
    /// # Errors
    ///
    /// [`OrmError::ParseError`] if the field is missing or does not convert.
    pub fn get<T: ValueType>(&self, name: &str) -> Result<T, OrmError> {
        let value = self
            .value(name)
            .ok_or_else(|| OrmError::ParseError(format!("missing field `{name}`")))?;
        let kind = value.kind();
        T::from_value(value.clone()).ok_or_else(|| {
            OrmError::ParseError(format!(
                "field `{name}` ({kind}) does not convert to {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// The primary identity, if the record has an `id` field.
    pub fn id(&self) -> Option<&Value> {
        self.value("id")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Related records loaded under `name`, or `None` if that relation was
    /// not requested.
    pub fn related(&self, name: &str) -> Option<&[Record]> {
        self.relations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(|(n, _)| n.as_str())
    }

    /// Remove and convert the related records loaded under `name`.
    ///
    /// Returns `Ok(None)` when the relation was not requested.
    pub fn take_related<T: FromRecord>(&mut self, name: &str) -> Result<Option<Vec<T>>, OrmError> {
        let Some(pos) = self.relations.iter().position(|(n, _)| n == name) else {
            return Ok(None);
        };
        let (_, records) = self.relations.remove(pos);
        records
            .into_iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Attach an empty array for `name` if none exists yet.
    pub(crate) fn init_relation(&mut self, name: &str) {
        if self.related(name).is_none() {
            self.relations.push((name.to_string(), Vec::new()));
        }
    }

    pub(crate) fn related_mut(&mut self, name: &str) -> Option<&mut Vec<Record>> {
        self.relations
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records)
    }

    /// Builder form attaching a full related array.
    pub fn with_related(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        let name = name.into();
        self.init_relation(&name);
        if let Some(slot) = self.related_mut(&name) {
            *slot = records;
        }
        self
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

/// Serializes as one flat map: fields first, then one array per relation.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.relations.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        for (name, records) in &self.relations {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}
