//! Loosely-typed upstream records.
//!
//! A [`Record`] wraps one JSON object exactly as received. Field lookup goes through
//! [`Record::resolve`] and the typed accessors built on top of it, so callers never
//! branch on raw JSON shapes.

use crate::coerce;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One JSON object returned by an upstream data source.
///
/// Key order is the order in which the upstream serialised the object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Convert a JSON value into a record, if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Coerce an upstream response body into a sequence of records.
    ///
    /// Anything other than an array yields an empty sequence; non-object elements are dropped.
    pub fn collect(value: Value) -> Vec<Self> {
        match value {
            Value::Array(items) => {
                let total = items.len();
                let records: Vec<Self> = items.into_iter().filter_map(Self::from_value).collect();
                if records.len() != total {
                    debug!(
                        dropped = total - records.len(),
                        "Dropped non-object elements from record array"
                    );
                }
                records
            }
            _ => Vec::new(),
        }
    }

    /// Field names in natural enumeration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of `key` if present and not null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Value of the first candidate key that is present and not null.
    ///
    /// Candidates are an ordered alias list, eg/ `["volume", "volumeUSD", "totalVolume"]`.
    pub fn resolve(&self, candidates: &[&str]) -> Option<&Value> {
        candidates.iter().find_map(|key| self.get(key))
    }

    /// Resolve then coerce as a non-negative magnitude.
    pub fn magnitude(&self, candidates: &[&str]) -> Option<f64> {
        self.resolve(candidates).and_then(coerce::magnitude)
    }

    /// Resolve then coerce as a signed quantity.
    pub fn signed(&self, candidates: &[&str]) -> Option<f64> {
        self.resolve(candidates).and_then(coerce::signed)
    }

    /// Resolve a string field. Non-string values are absent.
    pub fn text(&self, candidates: &[&str]) -> Option<&str> {
        self.resolve(candidates).and_then(Value::as_str)
    }

    /// Resolve a boolean field. Non-boolean values are absent.
    pub fn flag(&self, candidates: &[&str]) -> Option<bool> {
        self.resolve(candidates).and_then(Value::as_bool)
    }
}

/// Build a record from a `json!` object literal. Test helper.
#[cfg(test)]
pub(crate) fn record(value: Value) -> Record {
    Record::from_value(value).unwrap_or_default()
}
