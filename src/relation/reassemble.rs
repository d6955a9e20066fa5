//! Folding flat joined rows back into nested records.
//!
//! Rows are grouped by the primary `id` in first-seen order. Every row of a
//! group contributes at most one related record per planned relation, read
//! from exactly the aliases the planner selected for it. Many-to-many arrays
//! are de-duplicated by the related `id` once all rows are folded, as is every
//! array when several relations were joined at once.

use crate::executor::OrmError;
use crate::model::Record;
use crate::relation::{PlannedRelation, RelationType};
use crate::value::{Row, Value};
use std::collections::{HashMap, HashSet};

/// Hashable form of an identity value.
///
/// Floats are keyed by their bit pattern, so `0.0` and `-0.0` are distinct
/// identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum IdentityKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
    Bytes(Vec<u8>),
}

impl From<&Value> for IdentityKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => IdentityKey::Null,
            Value::Bool(b) => IdentityKey::Bool(*b),
            Value::Int(i) => IdentityKey::Int(*i),
            Value::Float(f) => IdentityKey::Float(f.to_bits()),
            Value::String(s) => IdentityKey::String(s.clone()),
            Value::Bytes(b) => IdentityKey::Bytes(b.clone()),
        }
    }
}

/// Reassemble `rows` into one [`Record`] per distinct primary `id`.
///
/// Columns that belong to no planned relation become the primary record's
/// fields. Each planned relation gets an array on every record, empty when
/// the LEFT JOIN matched nothing.
///
/// # Errors
///
/// [`OrmError::ParseError`] if a row has no `id` column.
pub fn reassemble(rows: Vec<Row>, relations: &[PlannedRelation]) -> Result<Vec<Record>, OrmError> {
    let related_aliases: HashSet<&str> = relations
        .iter()
        .flat_map(|r| r.columns.iter().map(|(alias, _)| alias.as_str()))
        .collect();

    let mut records: Vec<Record> = Vec::new();
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for row in &rows {
        let id = row
            .get("id")
            .ok_or_else(|| OrmError::ParseError("result row has no `id` column".to_string()))?;

        let pos = *index.entry(IdentityKey::from(id)).or_insert_with(|| {
            records.push(primary_record(row, &related_aliases, relations));
            records.len() - 1
        });

        for relation in relations {
            if let Some(related) = extract(row, relation) {
                if let Some(slot) = records[pos].related_mut(&relation.name) {
                    slot.push(related);
                }
            }
        }
    }

    // Sibling joins multiply each other's rows, so with more than one planned
    // relation every array is de-duplicated, not just many-to-many ones.
    let fanned_out = relations.len() > 1;
    for relation in relations
        .iter()
        .filter(|r| fanned_out || r.rel_type == RelationType::ManyToMany)
    {
        for record in &mut records {
            if let Some(slot) = record.related_mut(&relation.name) {
                dedup_by_id(slot);
            }
        }
    }

    log::debug!("reassembled {} rows into {} records", rows.len(), records.len());
    Ok(records)
}

fn primary_record(row: &Row, related_aliases: &HashSet<&str>, relations: &[PlannedRelation]) -> Record {
    let mut record = Record::new();
    for (alias, value) in row.iter().filter(|(alias, _)| !related_aliases.contains(alias)) {
        record.set(alias, value.clone());
    }
    for relation in relations {
        record.init_relation(&relation.name);
    }
    record
}

/// The related record carried by `row`, or `None` when all of its columns
/// are null (no match on the LEFT JOIN).
fn extract(row: &Row, relation: &PlannedRelation) -> Option<Record> {
    let mut record = Record::new();
    let mut present = false;
    for (alias, column) in &relation.columns {
        if let Some(value) = row.get(alias) {
            present |= !value.is_null();
            record.set(column.as_str(), value.clone());
        }
    }
    present.then_some(record)
}

/// Keep the first record for each related `id`; records without an `id`
/// are kept as they are.
fn dedup_by_id(records: &mut Vec<Record>) {
    let mut seen = HashSet::new();
    records.retain(|r| match r.id() {
        Some(id) => seen.insert(IdentityKey::from(id)),
        None => true,
    });
}
