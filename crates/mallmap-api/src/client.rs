//! HTTP client for the mall/brand directory REST backend.
//!
//! Wraps `reqwest` with bearer-token auth, envelope checking, and typed
//! deserialization. Region endpoints, the brand-distribution tree, and the
//! paginated brand-store listing all go through the same request path, which
//! retries transient failures with exponential back-off.

use std::time::Duration;

use mallmap_core::app_config::AppConfig;
use mallmap_core::filter::FilterState;
use mallmap_core::regions::Region;
use mallmap_core::tree::TreeProvince;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::DirectoryError;
use crate::retry::retry_with_backoff;
use crate::types::{
    ApiEnvelope, BrandStore, CitiesData, DistrictsData, Paginated, ProvincesData, TreeData,
};

/// Query for the `/map/tree` brand-distribution endpoint.
#[derive(Debug, Clone, Default)]
pub struct TreeQuery {
    /// How many levels of the hierarchy the backend should expand.
    pub level: u8,
    pub brand_id: Option<String>,
    pub province_id: Option<String>,
}

/// Query for the paginated brand-store listing.
#[derive(Debug, Clone)]
pub struct StoreListQuery {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    pub filter: FilterState,
}

/// Client for the directory REST backend.
///
/// Manages the HTTP client, optional bearer token, and base URL. Use
/// [`DirectoryClient::from_config`] for production or
/// [`DirectoryClient::new`] to point at a mock server in tests.
pub struct DirectoryClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DirectoryClient {
    /// Creates a client with no retries; see [`DirectoryClient::with_retries`].
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DirectoryError::Api`] if `base_url` is
    /// not a valid URL.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("mallmap/0.1 (directory-console)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends endpoint paths instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| DirectoryError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.map(str::to_owned),
            max_retries: 0,
            backoff_base_ms: 1_000,
        })
    }

    /// Creates a client from the application configuration, retries included.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, DirectoryError> {
        Ok(Self::new(
            &config.api_base_url,
            config.api_token.as_deref(),
            config.request_timeout_secs,
        )?
        .with_retries(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches all provinces.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Api`] if the backend reports a failure envelope.
    /// - [`DirectoryError::Http`] on network failure or non-2xx HTTP status.
    /// - [`DirectoryError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn list_provinces(&self) -> Result<Vec<Region>, DirectoryError> {
        let url = self.build_url("map/provinces", &[])?;
        let data: ProvincesData = self.fetch(url, "listProvinces".to_owned()).await?;
        Ok(data.provinces)
    }

    /// Fetches the cities of one province.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryClient::list_provinces`].
    pub async fn list_cities(&self, province_id: &str) -> Result<Vec<Region>, DirectoryError> {
        let url = self.build_url("map/cities", &[("provinceId", province_id.to_owned())])?;
        let data: CitiesData = self
            .fetch(url, format!("listCities(provinceId={province_id})"))
            .await?;
        Ok(data.cities)
    }

    /// Fetches the districts of one city.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryClient::list_provinces`].
    pub async fn list_districts(&self, city_id: &str) -> Result<Vec<Region>, DirectoryError> {
        let url = self.build_url("map/districts", &[("cityId", city_id.to_owned())])?;
        let data: DistrictsData = self
            .fetch(url, format!("listDistricts(cityId={city_id})"))
            .await?;
        Ok(data.districts)
    }

    /// Fetches the nested brand-distribution payload from `/map/tree`.
    ///
    /// The `tree=1` flag is part of the backend's wire contract and always
    /// sent.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryClient::list_provinces`].
    pub async fn brand_tree(&self, query: &TreeQuery) -> Result<Vec<TreeProvince>, DirectoryError> {
        let mut params = vec![
            ("tree", "1".to_owned()),
            ("level", query.level.to_string()),
        ];
        if let Some(brand_id) = &query.brand_id {
            params.push(("brandId", brand_id.clone()));
        }
        if let Some(province_id) = &query.province_id {
            params.push(("provinceId", province_id.clone()));
        }

        let url = self.build_url("map/tree", &params)?;
        let data: TreeData = self
            .fetch(url, format!("brandTree(level={})", query.level))
            .await?;
        Ok(data.provinces)
    }

    /// Fetches one page of brand stores matching the filter.
    ///
    /// Undefined filter fields and an empty search string are omitted from
    /// the query entirely, matching the backend's expectations.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`DirectoryClient::list_provinces`].
    pub async fn list_brand_stores(
        &self,
        query: &StoreListQuery,
    ) -> Result<Paginated<BrandStore>, DirectoryError> {
        let url = self.build_url("admin/brand-stores", &store_query_params(query))?;
        self.fetch(url, format!("listBrandStores(page={})", query.page))
            .await
    }

    /// Builds the full request URL with percent-encoded query parameters.
    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, DirectoryError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| DirectoryError::Api(format!("invalid request path '{path}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Requests `url` (with retries), checks the envelope, and deserializes
    /// the `data` payload.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        context: String,
    ) -> Result<T, DirectoryError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(url.clone())
        })
        .await?;
        Self::check_api_error(&body)?;

        let envelope: ApiEnvelope<T> =
            serde_json::from_value(body).map_err(|e| DirectoryError::Deserialize {
                context,
                source: e,
            })?;
        Ok(envelope.data)
    }

    /// Sends a GET request with the bearer token when configured, asserts a
    /// 2xx HTTP status, and parses the body as JSON.
    async fn request_json(&self, url: Url) -> Result<serde_json::Value, DirectoryError> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DirectoryError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Surfaces a `"success": false` envelope as [`DirectoryError::Api`].
    fn check_api_error(body: &serde_json::Value) -> Result<(), DirectoryError> {
        if body.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            let msg = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(DirectoryError::Api(msg));
        }
        Ok(())
    }
}

/// Query parameters for the brand-store listing, skipping unset filters.
fn store_query_params(query: &StoreListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
    ];
    if let Some(province_id) = &query.filter.province_id {
        params.push(("provinceId", province_id.clone()));
    }
    if let Some(city_id) = &query.filter.city_id {
        params.push(("cityId", city_id.clone()));
    }
    if let Some(district_id) = &query.filter.district_id {
        params.push(("districtId", district_id.clone()));
    }
    if !query.filter.search.is_empty() {
        params.push(("search", query.filter.search.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> DirectoryClient {
        DirectoryClient::new(base_url, None, 30).expect("client construction should not fail")
    }

    #[test]
    fn build_url_joins_path_and_query() {
        let client = test_client("http://localhost:5000/api");
        let url = client
            .build_url("map/cities", &[("provinceId", "p1".to_owned())])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/map/cities?provinceId=p1");
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("http://localhost:5000/api/");
        let url = client.build_url("map/provinces", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/map/provinces");
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("http://localhost:5000/api");
        let url = client
            .build_url("admin/brand-stores", &[("search", "mall & café".to_owned())])
            .unwrap();
        assert!(
            url.as_str().contains("mall+%26+caf") || url.as_str().contains("mall%20%26%20caf"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn store_query_omits_unset_filter_fields() {
        let query = StoreListQuery {
            page: 1,
            limit: 10,
            filter: FilterState::default(),
        };
        let params = store_query_params(&query);
        assert_eq!(
            params,
            vec![("page", "1".to_owned()), ("limit", "10".to_owned())]
        );
    }

    #[test]
    fn store_query_includes_region_and_search() {
        let query = StoreListQuery {
            page: 2,
            limit: 20,
            filter: FilterState {
                province_id: Some("p1".to_owned()),
                city_id: Some("c1".to_owned()),
                district_id: None,
                search: "harbour".to_owned(),
            },
        };
        let keys: Vec<&str> = store_query_params(&query).iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["page", "limit", "provinceId", "cityId", "search"]);
    }
}
