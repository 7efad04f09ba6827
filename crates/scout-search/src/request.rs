//! Search endpoint request construction.

use serde::Serialize;

use crate::filter::{FilterState, PriceRange, SortBy};
use crate::route::{Location, Route};

/// Parameters of one search endpoint call.
///
/// Every field is optional on the wire; absent fields are never sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    /// Deduplicated, in first-seen order.
    pub tags: Vec<String>,
    pub sort_by: Option<SortBy>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub featured: bool,
}

impl SearchRequest {
    /// Unfiltered catalog snapshot.
    pub fn catalog() -> Self {
        Self::default()
    }

    /// Build the request for the current page.
    ///
    /// On the search page the URL query wins: when `q` is present only the
    /// URL tags are sent, otherwise URL tags are merged with the local tag
    /// selection. A legacy tag route sends just its tag. Price ends are sent
    /// only when they narrow `bounds`.
    pub fn build(location: &Location, filters: &FilterState, bounds: PriceRange) -> Self {
        let mut request = Self::default();

        match location.route() {
            Route::Search => {
                let url_query = location.url_query();
                request.query = url_query.map(str::to_string);
                request.extend_tags(location.url_tags());
                if url_query.is_none() {
                    request.extend_tags(filters.tags.iter().cloned());
                }
            }
            Route::LegacyTag(tag) => request.extend_tags([tag]),
            Route::Home => {}
        }

        if !filters.category.is_empty() {
            request.category = Some(filters.category.clone());
        }
        if filters.sort_by != SortBy::Relevance {
            request.sort_by = Some(filters.sort_by);
        }
        if filters.price_range.narrows_min(bounds) {
            request.min_price = Some(filters.price_range.min);
        }
        if filters.price_range.narrows_max(bounds) {
            request.max_price = Some(filters.price_range.max);
        }
        request.featured = filters.featured;
        request
    }

    fn extend_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        for tag in tags {
            if !tag.is_empty() && !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Whether either price end is sent.
    pub fn carries_price(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Query pairs in wire order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query".to_string(), query.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags".to_string(), self.tags.join(",")));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.as_str().to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice".to_string(), max.to_string()));
        }
        if self.featured {
            pairs.push(("featured".to_string(), "true".to_string()));
        }
        pairs
    }
}
