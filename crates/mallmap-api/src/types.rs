//! Directory API response types.
//!
//! All types model the JSON structures returned by the directory REST
//! backend. Records carry Mongo-style `_id` identifiers; the envelope wraps
//! every response body as `{ "success": true, "data": { ... } }` with an
//! optional `message` on failure.

use mallmap_core::filter::FilterTarget;
use mallmap_core::regions::Region;
use mallmap_core::tree::TreeProvince;
use serde::Deserialize;

/// Top-level envelope for all directory API responses.
///
/// `success` is `true` on success; on failure the backend sets it to `false`
/// and explains itself in `message`. The payload sits under `data`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Payload of `GET /map/provinces`.
#[derive(Debug, Deserialize)]
pub struct ProvincesData {
    pub provinces: Vec<Region>,
}

/// Payload of `GET /map/cities?provinceId=X`.
#[derive(Debug, Deserialize)]
pub struct CitiesData {
    pub cities: Vec<Region>,
}

/// Payload of `GET /map/districts?cityId=X`.
#[derive(Debug, Deserialize)]
pub struct DistrictsData {
    pub districts: Vec<Region>,
}

/// Payload of `GET /map/tree`.
#[derive(Debug, Deserialize)]
pub struct TreeData {
    #[serde(default)]
    pub provinces: Vec<TreeProvince>,
}

/// A page of records plus its pagination envelope.
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

/// Pagination metadata returned alongside every list page.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageInfo {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// A brand-store record from `GET /admin/brand-stores`.
///
/// `district` is optional: some malls attach directly to a city.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandStore {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub store_address: Option<String>,
    pub mall: Region,
    pub brand: Region,
    pub province: Region,
    pub city: Region,
    #[serde(default)]
    pub district: Option<Region>,
}

impl FilterTarget for BrandStore {
    fn province_id(&self) -> Option<&str> {
        Some(&self.province.id)
    }

    fn city_id(&self) -> Option<&str> {
        Some(&self.city.id)
    }

    fn district_id(&self) -> Option<&str> {
        self.district.as_ref().map(|d| d.id.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.mall.name.as_str()];
        if let Some(name) = self.store_name.as_deref() {
            fields.push(name);
        }
        if let Some(address) = self.store_address.as_deref() {
            fields.push(address);
        }
        fields
    }
}
