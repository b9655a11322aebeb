use crate::error::DataError;
use async_trait::async_trait;
use whale_analytics::{Dataset, PageRequest, Record, StatusResponse};

/// Upstream provider of record arrays.
///
/// Implemented over HTTP by [`ApiClient`](crate::client::ApiClient). Implementations
/// return already shape-coerced records: a malformed body is an empty `Vec`, not an error.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Liveness check.
    async fn status(&self) -> Result<StatusResponse, DataError>;

    /// Fetch one load of `dataset`. `page` is only meaningful for paginated datasets.
    async fn fetch_records(
        &self,
        dataset: Dataset,
        page: Option<PageRequest>,
    ) -> Result<Vec<Record>, DataError>;
}
