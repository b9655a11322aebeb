/// Aggregation utilities for upstream record arrays
///
/// Every value is read through the resolver/coercion wall, so partially malformed
/// records reduce the measurable count instead of poisoning the result.
use crate::{record::Record, types::Side};
use serde::Serialize;

/// Summary metrics over one value field of a record array
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// Number of records, regardless of whether they carried a usable value
    pub count: usize,
    /// Number of records whose value coerced to a positive magnitude
    pub valid_count: usize,
    /// Sum of valid values
    pub total: f64,
    /// Largest valid value
    pub max: f64,
    /// `total / valid_count`, or 0 when nothing was measurable
    pub average: f64,
}

/// Summarise `records` over the first present field in `value_fields`.
///
/// Values are coerced as magnitudes; zero, negative, non-numeric and oversized values do
/// not contribute to `total`, `max` or `average`.
pub fn summarize(records: &[Record], value_fields: &[&str]) -> AggregateSummary {
    let mut total = 0.0;
    let mut max = 0.0_f64;
    let mut valid_count = 0;

    for value in records
        .iter()
        .filter_map(|record| record.magnitude(value_fields))
        .filter(|value| *value > 0.0)
    {
        total += value;
        max = max.max(value);
        valid_count += 1;
    }

    let total = finite_or_zero(total);
    let max = finite_or_zero(max);
    let average = if valid_count > 0 {
        finite_or_zero(total / valid_count as f64)
    } else {
        0.0
    };

    AggregateSummary {
        count: records.len(),
        valid_count,
        total,
        max,
        average,
    }
}

/// Trade flow statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub count: usize,
    /// Σ size × price
    pub notional: f64,
    pub buys: usize,
    pub sells: usize,
}

/// Compute trade flow statistics.
///
/// A missing or invalid size or price contributes 0 notional. Sides other than
/// buy/sell (any case) are counted in neither bucket.
pub fn trade_stats(records: &[Record]) -> TradeStats {
    let mut stats = TradeStats {
        count: records.len(),
        ..Default::default()
    };

    for record in records {
        let size = record.magnitude(&["size"]).unwrap_or(0.0);
        let price = record.magnitude(&["price"]).unwrap_or(0.0);
        stats.notional += size * price;

        match record.text(&["side"]).and_then(Side::classify) {
            Some(Side::Buy) => stats.buys += 1,
            Some(Side::Sell) => stats.sells += 1,
            None => {}
        }
    }

    stats.notional = finite_or_zero(stats.notional);
    stats
}

/// Realised and unrealised profit / loss totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PnlSummary {
    pub realized: f64,
    pub unrealized: f64,
}

impl PnlSummary {
    pub fn net(&self) -> f64 {
        self.realized + self.unrealized
    }
}

/// Sum signed PnL fields. Non-numeric values contribute nothing.
pub fn pnl_summary(records: &[Record], realized_fields: &[&str], unrealized_fields: &[&str]) -> PnlSummary {
    let (realized, unrealized) = records.iter().fold((0.0, 0.0), |(realized, unrealized), record| {
        (
            realized + record.signed(realized_fields).unwrap_or(0.0),
            unrealized + record.signed(unrealized_fields).unwrap_or(0.0),
        )
    });

    PnlSummary {
        realized: finite_or_zero(realized),
        unrealized: finite_or_zero(unrealized),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
