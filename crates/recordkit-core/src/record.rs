//! Hydrated records.
//!
//! A [`Record`] is the column -> value view of one entity instance: a base
//! row, optionally merged with its translation row for the active language,
//! plus any eagerly loaded relations.

use crate::row::Row;
use crate::value::Value;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A merged, loosely-typed record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
    relations: BTreeMap<String, Vec<Record>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a record from a result row.
    ///
    /// Columns are applied in result order, so when a join yields the same
    /// name twice the later column wins. Selecting `translation.*` before
    /// `primary.*` therefore keeps the primary `id`.
    pub fn from_row(row: &Row) -> Self {
        let mut record = Self::new();
        for (name, value) in row.iter() {
            record.attributes.insert(name.to_string(), value.clone());
        }
        record
    }

    /// Build a record from (column, value) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            attributes: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            relations: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.attributes.contains_key(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.attributes.remove(column)
    }

    /// The record's `id` as an integer, if present.
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the attributes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.attributes.retain(|k, v| keep(k, v));
    }

    /// Overlay `other` onto this record; `other` wins on key collision.
    ///
    /// Keys listed in `preserve` are never overwritten.
    pub fn merge_over(&mut self, other: &Record, preserve: &[&str]) {
        for (name, value) in &other.attributes {
            if preserve.contains(&name.as_str()) && self.attributes.contains_key(name) {
                continue;
            }
            self.attributes.insert(name.clone(), value.clone());
        }
    }

    /// Attach eagerly loaded related records under `name`.
    pub fn set_relation(&mut self, name: impl Into<String>, records: Vec<Record>) {
        self.relations.insert(name.into(), records);
    }

    pub fn relation(&self, name: &str) -> Option<&[Record]> {
        self.relations.get(name).map(Vec::as_slice)
    }

    /// Render as a JSON object; relations appear as arrays under their name.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.attributes {
            map.insert(name.clone(), value.to_json());
        }
        for (name, records) in &self.relations {
            map.insert(
                name.clone(),
                serde_json::Value::Array(records.iter().map(Record::to_json).collect()),
            );
        }
        serde_json::Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
