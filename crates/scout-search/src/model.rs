//! Wire types exchanged with the search endpoint.

use serde::{Deserialize, Serialize};

use crate::filter::PriceRange;

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Whether the item carries `tag` (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Count of items for one facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub name: String,
    pub count: u64,
}

/// Aggregations returned alongside search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    #[serde(default)]
    pub categories: Vec<FacetCount>,
    #[serde(default)]
    pub tags: Vec<FacetCount>,
    #[serde(default)]
    pub price_range: PriceRange,
}

impl Default for Facets {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            tags: Vec::new(),
            price_range: PriceRange::DEFAULT,
        }
    }
}

impl Facets {
    /// Category names, in facet order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Tag names containing `needle` (case-insensitive). An empty needle
    /// matches everything.
    pub fn filter_tags(&self, needle: &str) -> Vec<&str> {
        let needle = needle.to_lowercase();
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// The outcome of one completed search request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub facets: Facets,
}

impl ResultSet {
    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Body returned by the endpoint when called with only `query`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}
