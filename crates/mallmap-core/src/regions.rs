//! Geographic region values and the tri-level cascade selection.
//!
//! A [`Selection`] is the single source of truth for what the cascade has
//! chosen. All updates are pure: each `with_*` method consumes the old value
//! and returns a new one, clearing every level below the changed one so the
//! hierarchy invariant can never be violated by a partial update.

use serde::{Deserialize, Serialize};

/// A province, city, or district in the geographic hierarchy.
///
/// The backend uses Mongo-style `_id` identifiers on the wire; the serde
/// rename keeps this type wire-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// The cascade's selected province, city, and district.
///
/// Invariants: `city_id` is only meaningful under the current `province_id`
/// and `district_id` only under the current `city_id`. Changing a higher
/// level clears every lower level in the same update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub district_id: Option<String>,
}

impl Selection {
    /// Selects (or clears) the province, dropping any city and district.
    #[must_use]
    pub fn with_province(self, id: Option<String>) -> Self {
        Selection {
            province_id: id,
            city_id: None,
            district_id: None,
        }
    }

    /// Selects (or clears) the city, dropping any district.
    #[must_use]
    pub fn with_city(self, id: Option<String>) -> Self {
        Selection {
            city_id: id,
            district_id: None,
            ..self
        }
    }

    /// Selects (or clears) the district. Leaf level, no cascading effect.
    #[must_use]
    pub fn with_district(self, id: Option<String>) -> Self {
        Selection {
            district_id: id,
            ..self
        }
    }

    /// `true` when no level is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.province_id.is_none() && self.city_id.is_none() && self.district_id.is_none()
    }
}
