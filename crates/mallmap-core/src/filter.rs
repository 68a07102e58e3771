//! Combined region + free-text filtering for directory listings.
//!
//! [`FilterState`] merges the cascade selection with a search string. It is
//! an immutable value: every update returns a new state, which keeps the
//! filter testable without any UI plumbing. The client-side variant
//! ([`filter_items`]) is used for listings the backend cannot filter
//! server-side; region fields match by exact id equality, the search string
//! by case-insensitive substring over the record's text fields.

use serde::Serialize;

use crate::regions::Selection;

/// The combined filter applied to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
    pub search: String,
}

impl FilterState {
    /// Merges a cascade selection into the filter, keeping the search text.
    #[must_use]
    pub fn with_region(self, selection: &Selection) -> Self {
        FilterState {
            province_id: selection.province_id.clone(),
            city_id: selection.city_id.clone(),
            district_id: selection.district_id.clone(),
            search: self.search,
        }
    }

    /// Replaces the search text, keeping the region fields.
    #[must_use]
    pub fn with_search(self, search: impl Into<String>) -> Self {
        FilterState {
            search: search.into(),
            ..self
        }
    }

    /// `true` when no field would constrain a listing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.province_id.is_none()
            && self.city_id.is_none()
            && self.district_id.is_none()
            && self.search.is_empty()
    }

    /// Whether a record passes every defined filter field.
    #[must_use]
    pub fn matches<T: FilterTarget>(&self, record: &T) -> bool {
        if let Some(province_id) = self.province_id.as_deref() {
            if record.province_id() != Some(province_id) {
                return false;
            }
        }
        if let Some(city_id) = self.city_id.as_deref() {
            if record.city_id() != Some(city_id) {
                return false;
            }
        }
        if let Some(district_id) = self.district_id.as_deref() {
            if record.district_id() != Some(district_id) {
                return false;
            }
        }
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            return record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }
}

/// A listing record the client-side filter can be applied to.
pub trait FilterTarget {
    fn province_id(&self) -> Option<&str>;
    fn city_id(&self) -> Option<&str>;
    fn district_id(&self) -> Option<&str>;
    /// Text fields probed by the free-text search; a record matches when any
    /// of them contains the search string.
    fn search_fields(&self) -> Vec<&str>;
}

/// Returns the records passing `filter`, preserving input order.
#[must_use]
pub fn filter_items<'a, T: FilterTarget>(items: &'a [T], filter: &FilterState) -> Vec<&'a T> {
    items.iter().filter(|record| filter.matches(*record)).collect()
}
