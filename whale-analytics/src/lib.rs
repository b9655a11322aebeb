/// Whale Watch Analytics - Tabular Analytics Engine
///
/// This library turns loosely-typed upstream records into presentable view state:
/// - record: insertion-ordered JSON objects behind a typed accessor wall
/// - coerce: lenient JSON to number conversion
/// - columns: bounded column inference from a sample record
/// - aggregation: summary, trade and PnL statistics
/// - sort: stable, numeric-first record ordering
/// - cursor: forward-only pagination bookkeeping
///
/// Nothing in this crate is fallible. Malformed input degrades to empty or zeroed output.
pub mod aggregation;
pub mod coerce;
pub mod columns;
pub mod cursor;
pub mod dataset;
pub mod format;
pub mod record;
pub mod sort;
pub mod types;

// Re-export commonly used types for convenience
pub use aggregation::{AggregateSummary, PnlSummary, TradeStats, pnl_summary, summarize, trade_stats};
pub use columns::{ColumnRole, infer_columns};
pub use cursor::{AdvanceMode, PageCursor, PageRequest, Paginated};
pub use dataset::Dataset;
pub use record::Record;
pub use sort::{SortDirection, SortState, sort_records};
pub use types::{Side, StatusResponse, Trade, Whale};
