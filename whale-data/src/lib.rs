//! # Whale-Data
//! Polling data layer for the whale tracker API. Fetches the markets, whales and trades
//! record streams over HTTP and turns them into view state with `whale-analytics`.
//!
//! **It is:**
//! * **Lenient**: malformed responses degrade to empty record sequences, never errors.
//! * **Cached**: a shared [`QueryCache`](cache::QueryCache) serves fresh loads and
//!   reloads stale ones according to each dataset's staleness policy.
//! * **Race-free**: [`DatasetSession`](session::DatasetSession) only applies the result of
//!   the most recently initiated fetch.
//!
//! ## Examples
//! ```rust,no_run
//! use whale_analytics::Dataset;
//! use whale_data::{
//!     cache::RecordCache,
//!     client::{ApiClient, ApiConfig},
//!     session::DatasetSession,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ApiClient::new(ApiConfig::from_env()).unwrap();
//!     let cache = RecordCache::new();
//!
//!     let mut trades = DatasetSession::new(Dataset::Trades);
//!     trades.load(&client, &cache).await.unwrap();
//!
//!     while trades.has_more() {
//!         trades.fetch_next_page(&client).await.unwrap();
//!     }
//!
//!     println!("{:?}", trades.view().trade_stats);
//! }
//! ```

/// Keyed [`QueryCache`](cache::QueryCache) with per-key staleness.
pub mod cache;

/// HTTP [`ApiClient`](client::ApiClient) and its [`ApiConfig`](client::ApiConfig).
pub mod client;

/// All [`Error`](std::error::Error)s generated in Whale-Data.
pub mod error;

/// Per-dataset view state with stale-response suppression.
pub mod session;

/// [`DataSource`](source::DataSource) trait implemented by upstream providers.
pub mod source;

pub use cache::RecordCache;
pub use client::{ApiClient, ApiConfig};
pub use error::DataError;
pub use session::{DatasetSession, DatasetView, LoadStatus};
pub use source::DataSource;
