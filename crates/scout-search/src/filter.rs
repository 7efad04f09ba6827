//! Filter state types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort options for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Endpoint-defined relevance (the default; never sent on the wire).
    #[default]
    Relevance,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by highest rated.
    Rating,
    /// Sort by newest first.
    Newest,
}

impl SortBy {
    /// All options, in menu order.
    pub const ALL: [SortBy; 5] = [
        SortBy::Relevance,
        SortBy::PriceAsc,
        SortBy::PriceDesc,
        SortBy::Rating,
        SortBy::Newest,
    ];

    /// Wire value for the `sortBy` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::PriceAsc => "price-asc",
            SortBy::PriceDesc => "price-desc",
            SortBy::Rating => "rating",
            SortBy::Newest => "newest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortBy::Relevance => "Relevance",
            SortBy::PriceAsc => "Price: Low to High",
            SortBy::PriceDesc => "Price: High to Low",
            SortBy::Rating => "Highest Rated",
            SortBy::Newest => "Newest First",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSort(pub String);

impl FromStr for SortBy {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| UnknownSort(s.to_string()))
    }
}

/// An inclusive price interval. `min <= max` always holds.
///
/// Deserialization goes through [`PriceRange::new`], so inverted ends from
/// the wire are reordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPriceRange")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Deserialize)]
struct RawPriceRange {
    min: f64,
    max: f64,
}

impl From<RawPriceRange> for PriceRange {
    fn from(raw: RawPriceRange) -> Self {
        PriceRange::new(raw.min, raw.max)
    }
}

impl PriceRange {
    /// Bounds assumed before any facet data is known.
    pub const DEFAULT: PriceRange = PriceRange {
        min: 50.0,
        max: 500.0,
    };

    /// Create a range, swapping the ends if given out of order.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Both ends finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Clamp both ends into `bounds`. Invalid bounds leave the range as is.
    pub fn clamp_to(&self, bounds: PriceRange) -> Self {
        if !bounds.is_valid() {
            return *self;
        }
        let clamp = |v: f64| v.max(bounds.min).min(bounds.max);
        Self::new(clamp(self.min), clamp(self.max))
    }

    /// Whether the lower end was raised above `bounds.min`.
    pub fn narrows_min(&self, bounds: PriceRange) -> bool {
        self.min > bounds.min
    }

    /// Whether the upper end was lowered below `bounds.max`.
    pub fn narrows_max(&self, bounds: PriceRange) -> bool {
        self.max < bounds.max
    }

    /// Whether either end narrows `bounds`.
    pub fn is_narrowed(&self, bounds: PriceRange) -> bool {
        self.narrows_min(bounds) || self.narrows_max(bounds)
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The active search refinement.
///
/// `query` and `tags` mirror the URL; the remaining fields are local to the
/// session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub query: String,
    /// Empty means any category.
    pub category: String,
    /// Distinct tags in selection order.
    pub tags: Vec<String>,
    pub sort_by: SortBy,
    pub price_range: PriceRange,
    pub featured: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_bounds(PriceRange::DEFAULT)
    }
}

impl FilterState {
    /// Default state with the price range spanning `bounds`.
    pub fn with_bounds(bounds: PriceRange) -> Self {
        Self {
            query: String::new(),
            category: String::new(),
            tags: Vec::new(),
            sort_by: SortBy::Relevance,
            price_range: bounds,
            featured: false,
        }
    }

    /// Select `category`, or clear it when it is already selected.
    pub fn toggle_category(&mut self, category: &str) {
        if self.category == category {
            self.category.clear();
        } else {
            self.category = category.to_string();
        }
    }

    /// Add `tag`, or remove it when already present.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Replace the tag set, dropping blanks and duplicates.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !tag.is_empty() && !self.has_tag(&tag) {
                self.tags.push(tag);
            }
        }
    }
}

/// A detached copy of the filters edited in the mobile filter sheet.
///
/// Nothing reaches the live session until the draft is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDraft {
    state: FilterState,
}

impl FilterDraft {
    /// Open a draft seeded from the live filters.
    pub fn open(from: &FilterState) -> Self {
        Self {
            state: from.clone(),
        }
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.state.toggle_category(category);
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.state.toggle_tag(tag);
    }

    pub fn set_sort(&mut self, sort_by: SortBy) {
        self.state.sort_by = sort_by;
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        self.state.price_range = range;
    }

    pub fn set_featured(&mut self, featured: bool) {
        self.state.featured = featured;
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Consume the draft, yielding the filters to apply.
    pub fn into_state(self) -> FilterState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_wire_roundtrip() {
        for opt in SortBy::ALL {
            assert_eq!(opt.as_str().parse::<SortBy>().unwrap(), opt);
        }
        assert!("cheapest".parse::<SortBy>().is_err());
        assert_eq!(
            serde_json::to_string(&SortBy::PriceDesc).unwrap(),
            r#""price-desc""#
        );
    }

    #[test]
    fn test_price_range_orders_ends() {
        let range = PriceRange::new(300.0, 20.0);
        assert_eq!(range.min, 20.0);
        assert_eq!(range.max, 300.0);
    }

    #[test]
    fn test_price_range_clamp() {
        let bounds = PriceRange::new(20.0, 300.0);
        let clamped = PriceRange::new(10.0, 450.0).clamp_to(bounds);
        assert_eq!(clamped, bounds);

        let clamped = PriceRange::new(400.0, 450.0).clamp_to(bounds);
        assert_eq!(clamped, PriceRange::new(300.0, 300.0));
    }

    #[test]
    fn test_price_range_deserialize_orders_ends() {
        let range: PriceRange = serde_json::from_str(r#"{"min": 300, "max": 20}"#).unwrap();
        assert_eq!(range, PriceRange::new(20.0, 300.0));
        assert!(range.is_valid());
    }

    #[test]
    fn test_clamp_to_invalid_bounds_keeps_range() {
        let range = PriceRange::new(100.0, 200.0);
        let inverted = PriceRange { min: 300.0, max: 20.0 };
        let nan = PriceRange { min: f64::NAN, max: 300.0 };
        assert!(!inverted.is_valid());
        assert!(!nan.is_valid());
        assert_eq!(range.clamp_to(inverted), range);
        assert_eq!(range.clamp_to(nan), range);
    }

    #[test]
    fn test_price_range_narrowing() {
        let bounds = PriceRange::new(20.0, 300.0);
        assert!(!bounds.is_narrowed(bounds));
        assert!(PriceRange::new(25.0, 300.0).narrows_min(bounds));
        assert!(!PriceRange::new(25.0, 300.0).narrows_max(bounds));
        assert!(PriceRange::new(20.0, 299.0).is_narrowed(bounds));
    }

    #[test]
    fn test_toggle_category() {
        let mut filters = FilterState::default();
        filters.toggle_category("Audio");
        assert_eq!(filters.category, "Audio");
        filters.toggle_category("Office");
        assert_eq!(filters.category, "Office");
        filters.toggle_category("Office");
        assert!(filters.category.is_empty());
    }

    #[test]
    fn test_toggle_tag_keeps_selection_order() {
        let mut filters = FilterState::default();
        filters.toggle_tag("gaming");
        filters.toggle_tag("rgb");
        filters.toggle_tag("wireless");
        filters.toggle_tag("rgb");
        assert_eq!(filters.tags, vec!["gaming", "wireless"]);
    }

    #[test]
    fn test_set_tags_dedups() {
        let mut filters = FilterState::default();
        filters.set_tags(["a", "", "b", "a"]);
        assert_eq!(filters.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_draft_is_detached() {
        let live = FilterState::default();
        let mut draft = FilterDraft::open(&live);
        draft.toggle_tag("gaming");
        draft.set_featured(true);

        assert!(live.tags.is_empty());
        let applied = draft.into_state();
        assert_eq!(applied.tags, vec!["gaming"]);
        assert!(applied.featured);
    }
}
