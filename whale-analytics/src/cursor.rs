//! Forward-only pagination over an offset/limit record stream.
//!
//! [`PageCursor`] only does bookkeeping; the network call is made by whoever owns the
//! cursor, using the [`PageRequest`] it hands out.

use crate::record::Record;
use serde::Serialize;
use tracing::debug;

/// Offset / limit pair for the next page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

/// How the offset moves after a page arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Advance by the number of records actually returned.
    #[default]
    ReturnedCount,
    /// Advance by the requested page size, whatever came back.
    PageSize,
}

/// Offset and exhaustion state of a paginated stream.
///
/// `Active` while `exhausted == false`; `Exhausted` is terminal and is entered the first
/// time a page comes back shorter than `page_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    offset: usize,
    page_size: usize,
    exhausted: bool,
    #[serde(skip)]
    mode: AdvanceMode,
}

impl PageCursor {
    /// A `page_size` of 0 is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self::with_mode(page_size, AdvanceMode::default())
    }

    pub fn with_mode(page_size: usize, mode: AdvanceMode) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            exhausted: false,
            mode,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Request for the next page, or `None` once exhausted.
    pub fn next_request(&self) -> Option<PageRequest> {
        self.has_more().then_some(PageRequest {
            skip: self.offset,
            limit: self.page_size,
        })
    }

    /// Record the arrival of a page of `returned` records.
    ///
    /// Has no effect once exhausted.
    pub fn advance(&mut self, returned: usize) {
        if self.exhausted {
            return;
        }

        self.offset += match self.mode {
            AdvanceMode::ReturnedCount => returned,
            AdvanceMode::PageSize => self.page_size,
        };

        if returned < self.page_size {
            debug!(offset = self.offset, returned, "Page stream exhausted");
            self.exhausted = true;
        }
    }
}

/// Append-only concatenation of fetched pages plus the cursor governing them.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    cursor: PageCursor,
    records: Vec<Record>,
}

impl Paginated {
    pub fn new(cursor: PageCursor) -> Self {
        Self {
            cursor,
            records: Vec::new(),
        }
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.cursor.next_request()
    }

    /// Append a fetched page in arrival order and advance the cursor.
    ///
    /// Pages arriving after exhaustion are ignored.
    pub fn push_page(&mut self, page: Vec<Record>) {
        if self.cursor.is_exhausted() {
            return;
        }

        self.cursor.advance(page.len());
        self.records.extend(page);
    }

    /// Forget all pages and start again from offset 0.
    pub fn reset(&mut self) {
        self.cursor = PageCursor::with_mode(self.cursor.page_size, self.cursor.mode);
        self.records.clear();
    }
}
