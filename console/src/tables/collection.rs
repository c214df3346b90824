//! A paged collection of rows backed by a remote listing endpoint.
//!
//! The collection owns the loaded page, the pagination metadata the backend
//! reported, and the current sort selection. Fetching is pluggable so the
//! same pagination and sorting behavior serves every table.

use async_trait::async_trait;

use crate::api::common::{PageRequest, Paginated, PaginationMeta};
use crate::errors::ServiceResult;
use crate::tables::sort::{SortState, SortSource, sort_rows};

/// Fetches one page of rows from the backend.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, page: PageRequest) -> ServiceResult<Paginated<T>>;
}

/// One table's worth of remote data: the loaded page plus the controls
/// around it.
pub struct RemoteCollection<T, F> {
    fetcher: F,
    page: u32,
    page_size: u32,
    sort: Option<SortState>,
    rows: Vec<T>,
    meta: Option<PaginationMeta>,
}

impl<T, F> RemoteCollection<T, F>
where
    T: SortSource,
    F: PageFetcher<T>,
{
    pub fn new(fetcher: F, page_size: u32) -> Self {
        RemoteCollection {
            fetcher,
            page: 1,
            page_size,
            sort: None,
            rows: Vec::new(),
            meta: None,
        }
    }

    /// Starts the collection sorted on a column instead of in backend order.
    pub fn with_initial_sort(mut self, column: &str) -> Self {
        self.sort = Some(SortState::new(column));
        self
    }

    /// Loads the current page from the backend and re-applies the sort.
    /// On failure the previously loaded rows stay untouched.
    pub async fn refresh(&mut self) -> ServiceResult<()> {
        let request = PageRequest::new(self.page, self.page_size);
        let page = self.fetcher.fetch_page(request).await?;
        self.rows = page.data;
        self.meta = Some(page.meta);
        self.apply_sort();
        Ok(())
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        self.meta.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Whether a next page exists according to the last response.
    pub fn has_next_page(&self) -> bool {
        self.meta.map(|m| m.has_next_page).unwrap_or(false)
    }

    /// Whether a previous page exists according to the last response.
    pub fn has_previous_page(&self) -> bool {
        self.meta.map(|m| m.has_previous_page).unwrap_or(false)
    }

    /// Moves forward one page if the metadata says there is one. Answers
    /// whether a move happened.
    pub async fn next_page(&mut self) -> ServiceResult<bool> {
        if !self.has_next_page() {
            return Ok(false);
        }
        self.goto_page(self.page + 1).await?;
        Ok(true)
    }

    /// Moves back one page if the metadata says there is one. Answers
    /// whether a move happened.
    pub async fn previous_page(&mut self) -> ServiceResult<bool> {
        if !self.has_previous_page() {
            return Ok(false);
        }
        self.goto_page(self.page - 1).await?;
        Ok(true)
    }

    async fn goto_page(&mut self, page: u32) -> ServiceResult<()> {
        let previous = self.page;
        self.page = page;
        if let Err(e) = self.refresh().await {
            // Failed moves keep the page pointer on the data still shown.
            self.page = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Header click: cycles the direction on the current column or selects
    /// a new one ascending, then re-sorts the loaded page.
    pub fn sort_by(&mut self, column: &str) {
        match &mut self.sort {
            Some(sort) => sort.click(column),
            None => self.sort = Some(SortState::new(column)),
        }
        self.apply_sort();
    }

    /// Edits loaded rows in place once a mutation has round-tripped through
    /// the backend.
    pub fn patch_rows(
        &mut self,
        mut matches: impl FnMut(&T) -> bool,
        mut patch: impl FnMut(&mut T),
    ) {
        for row in self.rows.iter_mut().filter(|row| matches(row)) {
            patch(row);
        }
        self.apply_sort();
    }

    /// The caption window, as "first to last of total". Empty data reads
    /// as zero to zero.
    pub fn display_range(&self) -> (u64, u64) {
        self.meta.map(|m| m.display_range()).unwrap_or((0, 0))
    }

    fn apply_sort(&mut self) {
        if let Some(sort) = &self.sort {
            sort_rows(&mut self.rows, sort);
        }
    }
}
