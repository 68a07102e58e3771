//! The tri-level region cascade: province → city → district.
//!
//! [`RegionCascade`] keeps three dependent option lists and the current
//! [`Selection`] consistent. Changing a level clears every level below it and
//! issues a [`RegionFetch`] ticket for the next level's options. Tickets
//! carry the epoch of the selection that issued them: a ticket resolving
//! after the selection has moved on is discarded, so the displayed options
//! always reflect the most recently selected parent, even when an earlier,
//! slower fetch completes last.
//!
//! Fetch failures are non-fatal: the affected option list is emptied, a
//! warning is logged, and the selection itself is untouched.

use mallmap_api::{DirectoryClient, DirectoryError};
use mallmap_core::regions::{Region, Selection};

/// Source of region option lists for the cascade.
///
/// Implemented by [`DirectoryClient`] for production and by in-memory fakes
/// in tests.
#[allow(async_fn_in_trait)]
pub trait RegionSource {
    async fn provinces(&self) -> Result<Vec<Region>, DirectoryError>;
    async fn cities(&self, province_id: &str) -> Result<Vec<Region>, DirectoryError>;
    async fn districts(&self, city_id: &str) -> Result<Vec<Region>, DirectoryError>;
}

impl RegionSource for DirectoryClient {
    async fn provinces(&self) -> Result<Vec<Region>, DirectoryError> {
        self.list_provinces().await
    }

    async fn cities(&self, province_id: &str) -> Result<Vec<Region>, DirectoryError> {
        self.list_cities(province_id).await
    }

    async fn districts(&self, city_id: &str) -> Result<Vec<Region>, DirectoryError> {
        self.list_districts(city_id).await
    }
}

/// The cascade level a fetch ticket loads options for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    City,
    District,
}

/// A pending child-options fetch, tagged with the epoch of the selection
/// change that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFetch {
    level: Level,
    parent_id: String,
    epoch: u64,
}

/// Three dependent selectors backed by a [`RegionSource`].
pub struct RegionCascade<'a, S> {
    source: &'a S,
    selection: Selection,
    provinces: Vec<Region>,
    cities: Vec<Region>,
    districts: Vec<Region>,
    province_loading: bool,
    city_loading: bool,
    district_loading: bool,
    city_epoch: u64,
    district_epoch: u64,
}

impl<'a, S: RegionSource> RegionCascade<'a, S> {
    pub fn new(source: &'a S) -> Self {
        RegionCascade {
            source,
            selection: Selection::default(),
            provinces: Vec::new(),
            cities: Vec::new(),
            districts: Vec::new(),
            province_loading: false,
            city_loading: false,
            district_loading: false,
            city_epoch: 0,
            district_epoch: 0,
        }
    }

    /// Loads the province options. On failure the list is left empty and a
    /// warning is logged; the cascade stays usable.
    pub async fn load_provinces(&mut self) {
        self.province_loading = true;
        match self.source.provinces().await {
            Ok(provinces) => self.provinces = provinces,
            Err(err) => {
                tracing::warn!(error = %err, "province fetch failed, leaving options empty");
                self.provinces.clear();
            }
        }
        self.province_loading = false;
    }

    /// Selects (or clears) the province. City and district selections and
    /// option lists are cleared unconditionally; when a province is set, a
    /// ticket for its city options is returned.
    pub fn set_province(&mut self, id: Option<String>) -> Option<RegionFetch> {
        self.selection = self.selection.clone().with_province(id.clone());
        self.cities.clear();
        self.districts.clear();
        self.city_epoch += 1;
        self.district_epoch += 1;
        self.district_loading = false;

        match id {
            Some(parent_id) => {
                self.city_loading = true;
                Some(RegionFetch {
                    level: Level::City,
                    parent_id,
                    epoch: self.city_epoch,
                })
            }
            None => {
                self.city_loading = false;
                None
            }
        }
    }

    /// Selects (or clears) the city, clearing the district level; when a
    /// city is set, a ticket for its district options is returned.
    pub fn set_city(&mut self, id: Option<String>) -> Option<RegionFetch> {
        self.selection = self.selection.clone().with_city(id.clone());
        self.districts.clear();
        self.district_epoch += 1;

        match id {
            Some(parent_id) => {
                self.district_loading = true;
                Some(RegionFetch {
                    level: Level::District,
                    parent_id,
                    epoch: self.district_epoch,
                })
            }
            None => {
                self.district_loading = false;
                None
            }
        }
    }

    /// Selects (or clears) the district. Leaf level, no cascading effect.
    pub fn set_district(&mut self, id: Option<String>) {
        self.selection = self.selection.clone().with_district(id);
    }

    /// Runs a pending fetch against the source and applies its result.
    pub async fn resolve(&mut self, fetch: RegionFetch) {
        let result = match fetch.level {
            Level::City => self.source.cities(&fetch.parent_id).await,
            Level::District => self.source.districts(&fetch.parent_id).await,
        };
        self.apply(fetch, result);
    }

    /// Applies a fetch result if the ticket's epoch is still current, else
    /// discards it silently. Split from [`RegionCascade::resolve`] so tests
    /// can replay out-of-order completions.
    pub fn apply(&mut self, fetch: RegionFetch, result: Result<Vec<Region>, DirectoryError>) {
        let current = match fetch.level {
            Level::City => self.city_epoch,
            Level::District => self.district_epoch,
        };
        if fetch.epoch != current {
            tracing::debug!(
                level = ?fetch.level,
                parent_id = %fetch.parent_id,
                "discarding stale region fetch"
            );
            return;
        }

        let options = match result {
            Ok(options) => options,
            Err(err) => {
                tracing::warn!(
                    level = ?fetch.level,
                    parent_id = %fetch.parent_id,
                    error = %err,
                    "region fetch failed, leaving options empty"
                );
                Vec::new()
            }
        };

        match fetch.level {
            Level::City => {
                self.cities = options;
                self.city_loading = false;
            }
            Level::District => {
                self.districts = options;
                self.district_loading = false;
            }
        }
    }

    /// The full current selection, emitted on every change.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn provinces(&self) -> &[Region] {
        &self.provinces
    }

    #[must_use]
    pub fn cities(&self) -> &[Region] {
        &self.cities
    }

    #[must_use]
    pub fn districts(&self) -> &[Region] {
        &self.districts
    }

    /// Enablement follows "is the parent set", not "does the parent have
    /// children": a province with zero cities still yields an enabled,
    /// empty city selector.
    #[must_use]
    pub fn city_enabled(&self) -> bool {
        self.selection.province_id.is_some()
    }

    #[must_use]
    pub fn district_enabled(&self) -> bool {
        self.selection.city_id.is_some()
    }

    #[must_use]
    pub fn province_loading(&self) -> bool {
        self.province_loading
    }

    #[must_use]
    pub fn city_loading(&self) -> bool {
        self.city_loading
    }

    #[must_use]
    pub fn district_loading(&self) -> bool {
        self.district_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory region hierarchy:
    /// p1 → [c1, c2], p2 → [c3], p3 → [] (no cities);
    /// c1 → [d1, d2], c2 → [], c3 → [d3].
    struct FakeSource {
        fail: bool,
    }

    fn region(id: &str, name: &str) -> Region {
        Region {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    impl RegionSource for FakeSource {
        async fn provinces(&self) -> Result<Vec<Region>, DirectoryError> {
            if self.fail {
                return Err(DirectoryError::Api("backend down".to_owned()));
            }
            Ok(vec![
                region("p1", "Province 1"),
                region("p2", "Province 2"),
                region("p3", "Province 3"),
            ])
        }

        async fn cities(&self, province_id: &str) -> Result<Vec<Region>, DirectoryError> {
            if self.fail {
                return Err(DirectoryError::Api("backend down".to_owned()));
            }
            Ok(match province_id {
                "p1" => vec![region("c1", "City 1"), region("c2", "City 2")],
                "p2" => vec![region("c3", "City 3")],
                _ => vec![],
            })
        }

        async fn districts(&self, city_id: &str) -> Result<Vec<Region>, DirectoryError> {
            if self.fail {
                return Err(DirectoryError::Api("backend down".to_owned()));
            }
            Ok(match city_id {
                "c1" => vec![region("d1", "District 1"), region("d2", "District 2")],
                "c3" => vec![region("d3", "District 3")],
                _ => vec![],
            })
        }
    }

    async fn cascade_with_province<'a>(
        source: &'a FakeSource,
        province: &str,
    ) -> RegionCascade<'a, FakeSource> {
        let mut cascade = RegionCascade::new(source);
        cascade.load_provinces().await;
        let fetch = cascade.set_province(Some(province.to_string()));
        cascade.resolve(fetch.expect("province set issues a city fetch")).await;
        cascade
    }

    #[tokio::test]
    async fn selecting_city_loads_exactly_its_districts() {
        let source = FakeSource { fail: false };
        let mut cascade = cascade_with_province(&source, "p1").await;

        let fetch = cascade.set_city(Some("c1".to_string()));
        cascade.resolve(fetch.unwrap()).await;

        let ids: Vec<&str> = cascade.districts().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"], "only c1's districts, in input order");
    }

    #[tokio::test]
    async fn changing_province_clears_lower_selection_and_options() {
        let source = FakeSource { fail: false };
        let mut cascade = cascade_with_province(&source, "p1").await;
        let fetch = cascade.set_city(Some("c1".to_string()));
        cascade.resolve(fetch.unwrap()).await;
        cascade.set_district(Some("d2".to_string()));

        let fetch = cascade.set_province(Some("p2".to_string()));

        assert_eq!(cascade.selection().province_id.as_deref(), Some("p2"));
        assert_eq!(cascade.selection().city_id, None);
        assert_eq!(cascade.selection().district_id, None);
        assert!(cascade.cities().is_empty(), "cleared before the fetch lands");
        assert!(cascade.districts().is_empty());

        cascade.resolve(fetch.unwrap()).await;
        let ids: Vec<&str> = cascade.cities().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3"]);
    }

    #[tokio::test]
    async fn clearing_province_clears_everything_without_fetching() {
        let source = FakeSource { fail: false };
        let mut cascade = cascade_with_province(&source, "p1").await;

        let fetch = cascade.set_province(None);
        assert!(fetch.is_none(), "no fetch when the province is cleared");
        assert!(cascade.selection().is_empty());
        assert!(cascade.cities().is_empty());
        assert!(!cascade.city_loading());
    }

    #[tokio::test]
    async fn province_with_zero_cities_stays_enabled() {
        let source = FakeSource { fail: false };
        let cascade = cascade_with_province(&source, "p3").await;

        assert!(cascade.cities().is_empty());
        assert!(cascade.city_enabled(), "enablement follows parent-set, not child count");
        assert!(!cascade.district_enabled());
    }

    #[tokio::test]
    async fn stale_city_fetch_is_discarded() {
        let source = FakeSource { fail: false };
        let mut cascade = RegionCascade::new(&source);
        cascade.load_provinces().await;

        let old = cascade.set_province(Some("p1".to_string())).unwrap();
        let new = cascade.set_province(Some("p2".to_string())).unwrap();

        // The newer selection's fetch completes first; the older one
        // resolves afterwards and must not clobber the list.
        cascade.resolve(new).await;
        cascade.resolve(old).await;

        let ids: Vec<&str> = cascade.cities().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3"], "p2's cities survive the stale p1 result");
    }

    #[tokio::test]
    async fn stale_result_does_not_clear_loading_flag() {
        let source = FakeSource { fail: false };
        let mut cascade = RegionCascade::new(&source);

        let old = cascade.set_province(Some("p1".to_string())).unwrap();
        let _new = cascade.set_province(Some("p2".to_string())).unwrap();

        cascade.apply(old, Ok(vec![region("c1", "City 1")]));
        assert!(cascade.city_loading(), "still waiting on the current fetch");
        assert!(cascade.cities().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_empties_options_but_keeps_selection() {
        let source = FakeSource { fail: false };
        let mut cascade = RegionCascade::new(&source);

        let fetch = cascade.set_province(Some("p1".to_string())).unwrap();
        cascade.apply(fetch, Err(DirectoryError::Api("backend down".to_owned())));

        assert_eq!(cascade.selection().province_id.as_deref(), Some("p1"));
        assert!(cascade.cities().is_empty());
        assert!(!cascade.city_loading());
        assert!(cascade.city_enabled(), "user can retry by re-selecting");
    }

    #[tokio::test]
    async fn province_load_failure_is_non_fatal() {
        let source = FakeSource { fail: true };
        let mut cascade = RegionCascade::new(&source);
        cascade.load_provinces().await;

        assert!(cascade.provinces().is_empty());
        assert!(!cascade.province_loading());
    }

    #[tokio::test]
    async fn district_is_leaf_level() {
        let source = FakeSource { fail: false };
        let mut cascade = cascade_with_province(&source, "p1").await;
        let fetch = cascade.set_city(Some("c1".to_string()));
        cascade.resolve(fetch.unwrap()).await;

        cascade.set_district(Some("d1".to_string()));
        assert_eq!(cascade.selection().district_id.as_deref(), Some("d1"));
        let ids: Vec<&str> = cascade.districts().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"], "options untouched by a leaf selection");
    }
}
