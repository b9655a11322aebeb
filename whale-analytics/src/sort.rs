//! Stable, user-driven record ordering.
//!
//! Ordering rules for the active column:
//! - missing or null values always rank after present values, in either direction
//! - two numeric values (native or numeric strings) compare numerically
//! - two non-numeric values compare as case-folded text, ties broken by raw text
//! - a numeric value ranks before a non-numeric one
//! - the present-value comparison is reversed for [`SortDirection::Descending`]
//!
//! The sort is stable, so records with equal keys keep their arrival order.
//!
//! A number against text is not compared as text: mixing the two would not be a total
//! order, which `sort_by` requires. Text comparison is case-folding rather than
//! locale-aware collation, and its raw-text tiebreak puts "Apple" before "apple", the
//! reverse of ICU collation.

use crate::{coerce, record::Record};
use derive_more::Display;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
pub enum SortDirection {
    #[display("asc")]
    Ascending,
    #[default]
    #[display("desc")]
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and direction for one dataset view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Arrival order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Select `column`: flips the direction if it is already active, otherwise makes it
    /// active in descending order.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flip();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Descending;
        }
    }

    /// Drop the active column if no record carries it any more.
    ///
    /// Returns `true` if the state was reset.
    pub fn retain_if_present(&mut self, records: &[Record]) -> bool {
        let Some(column) = self.column.as_deref() else {
            return false;
        };

        if records.is_empty() || records.iter().any(|record| record.contains_key(column)) {
            return false;
        }

        self.column = None;
        self.direction = SortDirection::default();
        true
    }

    /// Produce the rendered order of `records` under this state.
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        match self.column.as_deref() {
            Some(column) => sort_records(records, column, self.direction),
            None => records.to_vec(),
        }
    }
}

/// Return a freshly ordered copy of `records` sorted by `column`.
///
/// The input slice is not modified.
pub fn sort_records(records: &[Record], column: &str, direction: SortDirection) -> Vec<Record> {
    let mut keyed: Vec<(Option<SortKey>, &Record)> = records
        .iter()
        .map(|record| (record.get(column).map(SortKey::from), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref(), direction));

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text { folded: String, raw: String },
}

impl From<&Value> for SortKey {
    fn from(value: &Value) -> Self {
        if let Some(num) = coerce::number(value) {
            return SortKey::Number(num);
        }

        let raw = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        SortKey::Text {
            folded: raw.to_lowercase(),
            raw,
        }
    }
}

fn compare(a: Option<&SortKey>, b: Option<&SortKey>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_present(a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_present(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortKey::Number(_), SortKey::Text { .. }) => Ordering::Less,
        (SortKey::Text { .. }, SortKey::Number(_)) => Ordering::Greater,
        (
            SortKey::Text {
                folded: a_folded,
                raw: a_raw,
            },
            SortKey::Text {
                folded: b_folded,
                raw: b_raw,
            },
        ) => a_folded.cmp(b_folded).then_with(|| a_raw.cmp(b_raw)),
    }
}
