//! Drives a paginated listing from the combined region + search filter.
//!
//! [`FilterController`] owns the [`FilterState`] and the pagination cursor.
//! Any filter change resets to page 1. A failed fetch keeps the previously
//! displayed page and logs a warning; the user retries by repeating the
//! action. Search applies on explicit submit, there is no debounce.

use mallmap_api::{DirectoryError, Paginated, StoreListQuery};
use mallmap_core::filter::FilterState;
use mallmap_core::regions::Selection;

pub struct FilterController<T> {
    filter: FilterState,
    page: u64,
    limit: u64,
    items: Vec<T>,
    total: u64,
}

impl<T> FilterController<T> {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        FilterController {
            filter: FilterState::default(),
            page: 1,
            limit,
            items: Vec::new(),
            total: 0,
        }
    }

    /// Merges a cascade selection into the filter and rewinds to page 1.
    pub fn apply_region(&mut self, selection: &Selection) {
        self.filter = std::mem::take(&mut self.filter).with_region(selection);
        self.page = 1;
    }

    /// Replaces the search text and rewinds to page 1.
    pub fn apply_search(&mut self, search: impl Into<String>) {
        self.filter = std::mem::take(&mut self.filter).with_search(search);
        self.page = 1;
    }

    /// Clears every filter field and rewinds to page 1.
    pub fn reset(&mut self) {
        self.filter = FilterState::default();
        self.page = 1;
    }

    /// Moves to another page without touching the filter. Pages are 1-based.
    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// The query for the current filter and page.
    #[must_use]
    pub fn query(&self) -> StoreListQuery {
        StoreListQuery {
            page: self.page,
            limit: self.limit,
            filter: self.filter.clone(),
        }
    }

    /// Absorbs a fetch outcome. On success the held page is replaced; on
    /// failure the previous page stays displayed and a warning is logged.
    /// Returns whether the page was replaced.
    pub fn absorb(&mut self, result: Result<Paginated<T>, DirectoryError>) -> bool {
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total = page.pagination.total;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "listing fetch failed, keeping previous page");
                false
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}
