//! Dataset sessions.
//!
//! A [`DatasetSession`] owns the visible state of one dataset view: the loaded records,
//! inferred columns, summary statistics, sort state and, for trades, the page cursor.
//!
//! Every fetch is started with a generation-stamped ticket. Only a result carrying the
//! most recent ticket is applied; anything older was superseded and is dropped.

use crate::{cache::RecordCache, error::DataError, source::DataSource};
use serde::Serialize;
use tracing::{debug, info, warn};
use whale_analytics::{
    AggregateSummary, Dataset, PageCursor, PageRequest, Paginated, PnlSummary, Record, SortState,
    TradeStats, infer_columns, pnl_summary, summarize, trade_stats,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Handle for one initiated fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Handle for one initiated next-page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
enum Store {
    Full(Vec<Record>),
    Paged(Paginated),
}

impl Store {
    fn for_dataset(dataset: Dataset) -> Self {
        match dataset.page_size() {
            Some(page_size) => Store::Paged(Paginated::new(PageCursor::new(page_size))),
            None => Store::Full(Vec::new()),
        }
    }

    fn records(&self) -> &[Record] {
        match self {
            Store::Full(records) => records,
            Store::Paged(pages) => pages.records(),
        }
    }
}

/// Derived view state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetView {
    pub dataset: Dataset,
    pub status: LoadStatus,
    pub columns: Vec<String>,
    pub summary: AggregateSummary,
    pub sort: SortState,
    /// Records in rendered order
    pub rows: Vec<Record>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_stats: Option<TradeStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<PnlSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSession {
    dataset: Dataset,
    generation: u64,
    status: LoadStatus,
    store: Store,
    columns: Vec<String>,
    summary: AggregateSummary,
    sort: SortState,
    last_error: Option<DataError>,
}

impl DatasetSession {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            generation: 0,
            status: LoadStatus::Idle,
            store: Store::for_dataset(dataset),
            columns: Vec::new(),
            summary: AggregateSummary::default(),
            sort: dataset.default_sort(),
            last_error: None,
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn summary(&self) -> AggregateSummary {
        self.summary
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn last_error(&self) -> Option<&DataError> {
        self.last_error.as_ref()
    }

    /// `true` while [`Self::fetch_next_page`] would issue a request. Always `false` for
    /// unpaginated datasets.
    pub fn has_more(&self) -> bool {
        match &self.store {
            Store::Paged(pages) => self.can_page() && pages.has_more(),
            Store::Full(_) => false,
        }
    }

    /// Pages extend the visible records: after a successful load, or after a failed reload
    /// that left the previous records on screen.
    fn can_page(&self) -> bool {
        match self.status {
            LoadStatus::Ready => true,
            LoadStatus::Failed => !self.store.records().is_empty(),
            LoadStatus::Idle | LoadStatus::Loading => false,
        }
    }

    /// Start a (re)load, superseding any fetch still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Request for the first page of a paginated dataset.
    pub fn first_page(&self) -> Option<PageRequest> {
        self.dataset.page_size().map(|limit| PageRequest { skip: 0, limit })
    }

    /// Apply the result of the load started with `ticket`.
    ///
    /// Returns `false` (and changes nothing) if the ticket was superseded. A failed load
    /// keeps the previously visible records.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<Record>, DataError>) -> bool {
        if ticket.generation != self.generation {
            debug!(dataset = %self.dataset, "Discarding superseded load response");
            return false;
        }

        match result {
            Ok(records) => {
                match &mut self.store {
                    Store::Full(current) => *current = records,
                    Store::Paged(pages) => {
                        pages.reset();
                        pages.push_page(records);
                    }
                }

                self.columns = infer_columns(
                    self.store.records().first(),
                    self.dataset.priority_columns(),
                    self.dataset.max_columns(),
                );
                if self.sort.retain_if_present(self.store.records()) {
                    debug!(dataset = %self.dataset, "Sort column no longer present, sort reset");
                }
                self.refresh_summary();
                self.status = LoadStatus::Ready;
                self.last_error = None;

                info!(
                    dataset = %self.dataset,
                    records = self.store.records().len(),
                    columns = self.columns.len(),
                    "Dataset loaded"
                );
            }
            Err(error) => {
                warn!(dataset = %self.dataset, %error, "Dataset load failed");
                self.status = LoadStatus::Failed;
                self.last_error = Some(error);
            }
        }

        true
    }

    /// Start a next-page fetch, or `None` if the dataset is unpaginated, has nothing
    /// visible to extend, or is exhausted. Supersedes any fetch still in flight.
    pub fn begin_next_page(&mut self) -> Option<PageTicket> {
        if !self.can_page() {
            return None;
        }

        let request = match &self.store {
            Store::Paged(pages) => pages.next_request()?,
            Store::Full(_) => return None,
        };

        self.generation += 1;
        Some(PageTicket {
            generation: self.generation,
            request,
        })
    }

    /// Append the page fetched with `ticket`.
    ///
    /// Returns `false` (and changes nothing) if the ticket was superseded. A failed fetch
    /// leaves the cursor where it was so the page can be requested again.
    pub fn apply_page(&mut self, ticket: PageTicket, result: Result<Vec<Record>, DataError>) -> bool {
        if ticket.generation != self.generation {
            debug!(dataset = %self.dataset, skip = ticket.request.skip, "Discarding superseded page response");
            return false;
        }

        let Store::Paged(pages) = &mut self.store else {
            return false;
        };

        match result {
            Ok(page) => {
                let returned = page.len();
                pages.push_page(page);
                self.refresh_summary();
                // A failed reload stays reported until a load succeeds
                if self.status == LoadStatus::Ready {
                    self.last_error = None;
                }

                debug!(
                    dataset = %self.dataset,
                    skip = ticket.request.skip,
                    returned,
                    has_more = self.has_more(),
                    "Page appended"
                );
            }
            Err(error) => {
                warn!(dataset = %self.dataset, %error, "Page fetch failed");
                self.last_error = Some(error);
            }
        }

        true
    }

    /// Load the dataset through `cache`, fetching from `source` if the cached copy is stale.
    pub async fn load<S>(&mut self, source: &S, cache: &RecordCache) -> Result<(), DataError>
    where
        S: DataSource + ?Sized,
    {
        let ticket = self.begin_load();
        let dataset = self.dataset;
        let page = self.first_page();

        let result = cache
            .get_or_fetch(
                dataset.cache_key(),
                || source.fetch_records(dataset, page),
                dataset.stale_after(),
            )
            .await
            .map(|records| records.as_ref().clone());

        let outcome = result.as_ref().map(|_| ()).map_err(DataError::clone);
        self.apply_load(ticket, result);
        outcome
    }

    /// Invalidate the cached copy and load again from `source`.
    pub async fn refresh<S>(&mut self, source: &S, cache: &RecordCache) -> Result<(), DataError>
    where
        S: DataSource + ?Sized,
    {
        cache.invalidate(self.dataset.cache_key());
        self.load(source, cache).await
    }

    /// Fetch and append the next page. Returns the number of records received, 0 if
    /// there was nothing to fetch.
    pub async fn fetch_next_page<S>(&mut self, source: &S) -> Result<usize, DataError>
    where
        S: DataSource + ?Sized,
    {
        let Some(ticket) = self.begin_next_page() else {
            return Ok(0);
        };

        let result = source.fetch_records(self.dataset, Some(ticket.request)).await;
        let outcome = result.as_ref().map(Vec::len).map_err(DataError::clone);
        self.apply_page(ticket, result);
        outcome
    }

    /// Select a sort column; see [`SortState::toggle`].
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
    }

    pub fn view(&self) -> DatasetView {
        let records = self.store.records();

        DatasetView {
            dataset: self.dataset,
            status: self.status,
            columns: self.columns.clone(),
            summary: self.summary,
            sort: self.sort.clone(),
            rows: self.sort.apply(records),
            has_more: self.has_more(),
            trade_stats: (self.dataset == Dataset::Trades).then(|| trade_stats(records)),
            pnl: self
                .dataset
                .pnl_fields()
                .map(|(realized, unrealized)| pnl_summary(records, realized, unrealized)),
            error: self.last_error.as_ref().map(DataError::to_string),
        }
    }

    fn refresh_summary(&mut self) {
        self.summary = summarize(self.store.records(), self.dataset.value_fields());
    }
}
