//! Display column inference.
//!
//! Upstream objects are wide and variably shaped, so the column set is derived from one
//! representative record per load: known-important keys first, then whatever else the
//! record carries, capped to a fixed width.

use crate::record::Record;
use itertools::Itertools;

/// Semantic role of a column, derived from its name when a cell is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Monetary magnitude (volume, liquidity, notional)
    Currency,
    /// Point in time (endDate, timestamp, createdAt)
    Date,
    /// Everything else, rendered as text
    Opaque,
}

impl ColumnRole {
    /// Classify a column by name pattern.
    pub fn of(key: &str) -> Self {
        let lower = key.to_lowercase();
        if lower.contains("volume") || lower.contains("liquidity") {
            ColumnRole::Currency
        } else if lower.contains("date") || lower.contains("timestamp") {
            ColumnRole::Date
        } else {
            ColumnRole::Opaque
        }
    }
}

/// Infer the ordered display columns for a dataset from its first record.
///
/// Output is the priority keys present in `sample` (priority order), followed by the
/// remaining sample keys (enumeration order), truncated to `max_columns`.
pub fn infer_columns(sample: Option<&Record>, priority_keys: &[&str], max_columns: usize) -> Vec<String> {
    let Some(sample) = sample else {
        return Vec::new();
    };

    let prioritised = priority_keys
        .iter()
        .filter(|key| sample.contains_key(key))
        .map(|key| key.to_string());

    let remaining = sample
        .keys()
        .filter(|key| !priority_keys.contains(key))
        .map(str::to_string);

    prioritised.chain(remaining).unique().take(max_columns).collect()
}
