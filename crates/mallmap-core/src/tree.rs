//! Brand-distribution tree building.
//!
//! The backend's `/map/tree` endpoint returns a nested payload: provinces
//! containing cities, cities containing districts (each with malls) and/or
//! malls attached directly to the city, and malls containing brands.
//! [`build_tree`] folds that payload into display nodes. It is a pure,
//! synchronous transform: output order is input order at every level, nodes
//! with no children are emitted rather than pruned, and calling it twice on
//! the same payload yields structurally identical output.

use std::fmt;

use serde::Deserialize;

/// Title rendered for a city's district-less mall grouping.
pub const NO_DISTRICT_TITLE: &str = "（无区县）";

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// A province entry in the `/map/tree` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeProvince {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cities: Vec<TreeCity>,
}

/// A city entry. `districts` and `malls` may both be present: malls with no
/// district are attached directly to the city.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeCity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub districts: Vec<TreeDistrict>,
    #[serde(default)]
    pub malls: Vec<TreeMall>,
}

/// A district entry. The backend emits a grouping record with no `_id` and
/// no `name` for malls it could not attribute to a district.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeDistrict {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub malls: Vec<TreeMall>,
}

/// A mall entry carrying the brands present in it.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeMall {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brands: Vec<TreeBrand>,
}

/// A brand leaf under a mall.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeBrand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Display tree
// ---------------------------------------------------------------------------

/// Key of a display-tree node.
///
/// Synthetic keys are separate variants rather than concatenated strings, so
/// a real district id that happens to equal `"{cityId}-nodistrict"` can never
/// collide with the grouping node for that city. The same brand may appear
/// under several malls; [`NodeKey::MallBrand`] keeps those leaves distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// A province, city, or district with its real id.
    Region(String),
    /// A mall with its real id.
    Mall(String),
    /// Synthetic grouping for a city's malls that have no district.
    NoDistrict { city_id: String },
    /// A brand leaf scoped to the mall it appears under.
    MallBrand { mall_id: String, brand_id: String },
}

impl fmt::Display for NodeKey {
    /// Renders the legacy string forms used by the original console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Region(id) | NodeKey::Mall(id) => write!(f, "{id}"),
            NodeKey::NoDistrict { city_id } => write!(f, "{city_id}-nodistrict"),
            NodeKey::MallBrand { mall_id, brand_id } => write!(f, "{mall_id}-{brand_id}"),
        }
    }
}

/// A node of the brand-distribution display tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub title: String,
    pub children: Vec<TreeNode>,
}

/// Builds the display tree from a `/map/tree` payload.
///
/// Under each city, district groupings come first (in payload order), then
/// malls attached directly to the city. Empty nodes are kept so the tree
/// mirrors the full payload shape.
#[must_use]
pub fn build_tree(provinces: &[TreeProvince]) -> Vec<TreeNode> {
    provinces
        .iter()
        .map(|province| TreeNode {
            key: NodeKey::Region(province.id.clone()),
            title: province.name.clone(),
            children: province.cities.iter().map(city_node).collect(),
        })
        .collect()
}

fn city_node(city: &TreeCity) -> TreeNode {
    let mut children: Vec<TreeNode> = city
        .districts
        .iter()
        .map(|district| district_node(&city.id, district))
        .collect();
    children.extend(city.malls.iter().map(mall_node));

    TreeNode {
        key: NodeKey::Region(city.id.clone()),
        title: city.name.clone(),
        children,
    }
}

fn district_node(city_id: &str, district: &TreeDistrict) -> TreeNode {
    let key = match &district.id {
        Some(id) => NodeKey::Region(id.clone()),
        None => NodeKey::NoDistrict {
            city_id: city_id.to_owned(),
        },
    };
    let title = district
        .name
        .clone()
        .unwrap_or_else(|| NO_DISTRICT_TITLE.to_string());

    TreeNode {
        key,
        title,
        children: district.malls.iter().map(mall_node).collect(),
    }
}

fn mall_node(mall: &TreeMall) -> TreeNode {
    TreeNode {
        key: NodeKey::Mall(mall.id.clone()),
        title: mall.name.clone(),
        children: mall
            .brands
            .iter()
            .map(|brand| TreeNode {
                key: NodeKey::MallBrand {
                    mall_id: mall.id.clone(),
                    brand_id: brand.id.clone(),
                },
                title: brand.name.clone(),
                children: Vec::new(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(id: &str, name: &str) -> TreeBrand {
        TreeBrand {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn mall(id: &str, name: &str, brands: Vec<TreeBrand>) -> TreeMall {
        TreeMall {
            id: id.to_string(),
            name: name.to_string(),
            brands,
        }
    }

    /// One province "A" with city "B": district "C" holding mall "M" with
    /// brand "X", plus mall "M2" attached directly to the city, no brands.
    fn sample_payload() -> Vec<TreeProvince> {
        vec![TreeProvince {
            id: "A".to_string(),
            name: "Province A".to_string(),
            cities: vec![TreeCity {
                id: "B".to_string(),
                name: "City B".to_string(),
                districts: vec![TreeDistrict {
                    id: Some("C".to_string()),
                    name: Some("District C".to_string()),
                    malls: vec![mall("M", "Mall M", vec![brand("X", "Brand X")])],
                }],
                malls: vec![mall("M2", "Mall M2", vec![])],
            }],
        }]
    }

    #[test]
    fn builds_expected_structure_in_order() {
        let tree = build_tree(&sample_payload());

        assert_eq!(tree.len(), 1);
        let province = &tree[0];
        assert_eq!(province.key, NodeKey::Region("A".to_string()));
        assert_eq!(province.title, "Province A");

        let city = &province.children[0];
        assert_eq!(city.key, NodeKey::Region("B".to_string()));
        assert_eq!(city.children.len(), 2, "district group then direct mall");

        let district = &city.children[0];
        assert_eq!(district.key, NodeKey::Region("C".to_string()));
        let mall_m = &district.children[0];
        assert_eq!(mall_m.key, NodeKey::Mall("M".to_string()));
        assert_eq!(
            mall_m.children,
            vec![TreeNode {
                key: NodeKey::MallBrand {
                    mall_id: "M".to_string(),
                    brand_id: "X".to_string(),
                },
                title: "Brand X".to_string(),
                children: vec![],
            }]
        );

        let mall_m2 = &city.children[1];
        assert_eq!(mall_m2.key, NodeKey::Mall("M2".to_string()));
        assert!(mall_m2.children.is_empty(), "empty mall is kept, not pruned");
    }

    #[test]
    fn is_idempotent() {
        let payload = sample_payload();
        assert_eq!(build_tree(&payload), build_tree(&payload));
    }

    #[test]
    fn district_without_id_gets_synthetic_key_and_placeholder_title() {
        let payload = vec![TreeProvince {
            id: "p".to_string(),
            name: "P".to_string(),
            cities: vec![TreeCity {
                id: "c".to_string(),
                name: "C".to_string(),
                districts: vec![TreeDistrict {
                    id: None,
                    name: None,
                    malls: vec![mall("m", "M", vec![])],
                }],
                malls: vec![],
            }],
        }];

        let tree = build_tree(&payload);
        let group = &tree[0].children[0].children[0];
        assert_eq!(
            group.key,
            NodeKey::NoDistrict {
                city_id: "c".to_string()
            }
        );
        assert_eq!(group.title, NO_DISTRICT_TITLE);
        assert_eq!(group.key.to_string(), "c-nodistrict");
    }

    #[test]
    fn synthetic_key_never_collides_with_adversarial_real_id() {
        // A real district whose id literally equals the legacy synthetic
        // string for city "c", next to an actual district-less grouping.
        let payload = vec![TreeProvince {
            id: "p".to_string(),
            name: "P".to_string(),
            cities: vec![TreeCity {
                id: "c".to_string(),
                name: "C".to_string(),
                districts: vec![
                    TreeDistrict {
                        id: Some("c-nodistrict".to_string()),
                        name: Some("Oddly Named".to_string()),
                        malls: vec![],
                    },
                    TreeDistrict {
                        id: None,
                        name: None,
                        malls: vec![],
                    },
                ],
                malls: vec![],
            }],
        }];

        let tree = build_tree(&payload);
        let city = &tree[0].children[0];
        let real = &city.children[0].key;
        let synthetic = &city.children[1].key;

        assert_eq!(real.to_string(), synthetic.to_string(), "legacy strings collide");
        assert_ne!(real, synthetic, "keys stay structurally distinct");
    }

    #[test]
    fn same_brand_under_two_malls_gets_distinct_keys() {
        let payload = vec![TreeProvince {
            id: "p".to_string(),
            name: "P".to_string(),
            cities: vec![TreeCity {
                id: "c".to_string(),
                name: "C".to_string(),
                districts: vec![],
                malls: vec![
                    mall("m1", "Mall 1", vec![brand("b", "Shared Brand")]),
                    mall("m2", "Mall 2", vec![brand("b", "Shared Brand")]),
                ],
            }],
        }];

        let tree = build_tree(&payload);
        let city = &tree[0].children[0];
        assert_ne!(city.children[0].children[0].key, city.children[1].children[0].key);
        assert_eq!(city.children[0].children[0].key.to_string(), "m1-b");
        assert_eq!(city.children[1].children[0].key.to_string(), "m2-b");
    }

    #[test]
    fn deserializes_tree_payload_with_missing_levels() {
        let json = serde_json::json!([{
            "_id": "p1",
            "name": "Province",
            "cities": [{
                "_id": "c1",
                "name": "City",
                "districts": [{ "malls": [{ "_id": "m1", "name": "Mall" }] }]
            }]
        }]);

        let payload: Vec<TreeProvince> =
            serde_json::from_value(json).expect("payload with absent fields");
        let tree = build_tree(&payload);
        let group = &tree[0].children[0].children[0];
        assert_eq!(group.title, NO_DISTRICT_TITLE);
        assert_eq!(group.children[0].key, NodeKey::Mall("m1".to_string()));
        assert!(group.children[0].children.is_empty());
    }
}
