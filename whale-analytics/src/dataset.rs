use crate::sort::{SortDirection, SortState};
use derive_more::Display;
use serde::Serialize;
use std::time::Duration;

/// Number of trades requested per page.
pub const TRADES_PAGE_SIZE: usize = 50;

/// Realised and unrealised PnL alias lists.
pub type PnlFields = (&'static [&'static str], &'static [&'static str]);

const WHALE_PNL_FIELDS: PnlFields = (&["total_r_pnl"], &["total_u_pnl"]);
const TRADE_PNL_FIELDS: PnlFields = (&["realized_pnl"], &["unrealized_pnl"]);

/// The three upstream record streams and their presentation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    #[display("markets")]
    Markets,
    #[display("whales")]
    Whales,
    #[display("trades")]
    Trades,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Markets, Dataset::Whales, Dataset::Trades];

    /// Key under which loaded records are cached.
    pub fn cache_key(&self) -> &'static str {
        match self {
            Dataset::Markets => "markets",
            Dataset::Whales => "whales",
            Dataset::Trades => "trades-infinite",
        }
    }

    /// How long a cached load is served before refetching.
    pub fn stale_after(&self) -> Duration {
        match self {
            Dataset::Markets | Dataset::Whales => Duration::from_secs(60),
            Dataset::Trades => Duration::from_secs(15),
        }
    }

    /// Columns shown first, when present in the sample record.
    pub fn priority_columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Markets => &["question", "title", "name", "volume", "liquidity", "endDate"],
            Dataset::Whales => &[
                "username",
                "address",
                "total_volume",
                "total_r_pnl",
                "total_u_pnl",
                "trade_count",
                "is_tracked",
            ],
            Dataset::Trades => &[
                "timestamp",
                "wallet_address",
                "asset",
                "side",
                "size",
                "price",
                "status",
            ],
        }
    }

    pub fn max_columns(&self) -> usize {
        match self {
            Dataset::Markets => 5,
            Dataset::Whales => 6,
            Dataset::Trades => 7,
        }
    }

    /// Alias list for the field summarised by [`summarize`](crate::aggregation::summarize).
    pub fn value_fields(&self) -> &'static [&'static str] {
        match self {
            Dataset::Markets => &["volume", "volumeUSD", "totalVolume"],
            Dataset::Whales => &["total_volume"],
            Dataset::Trades => &["size"],
        }
    }

    /// Realised / unrealised PnL fields, for datasets that carry them.
    pub fn pnl_fields(&self) -> Option<PnlFields> {
        match self {
            Dataset::Markets => None,
            Dataset::Whales => Some(WHALE_PNL_FIELDS),
            Dataset::Trades => Some(TRADE_PNL_FIELDS),
        }
    }

    pub fn default_sort(&self) -> SortState {
        match self {
            Dataset::Markets => SortState::new("volume", SortDirection::Descending),
            Dataset::Whales => SortState::new("total_volume", SortDirection::Descending),
            Dataset::Trades => SortState::unsorted(),
        }
    }

    /// Page size for datasets fetched incrementally.
    pub fn page_size(&self) -> Option<usize> {
        match self {
            Dataset::Trades => Some(TRADES_PAGE_SIZE),
            Dataset::Markets | Dataset::Whales => None,
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.page_size().is_some()
    }
}
