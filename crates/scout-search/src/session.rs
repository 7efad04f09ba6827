//! Filter state bound to the current page location.

use crate::filter::{FilterState, PriceRange, SortBy};
use crate::request::SearchRequest;
use crate::route::{Location, Route};

/// What the caller must do with the URL after clearing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearAction {
    /// Nothing to clear; leave the URL alone.
    NoOp,
    /// Replace the URL with the bare search page without navigating.
    StripParams,
    /// Navigate to the bare search page.
    NavigateToSearch,
}

/// Filter state for one search page session.
///
/// `query` and `tags` are re-derived from the location on every URL change;
/// the other filter fields are only ever changed through the mutators.
#[derive(Debug, Clone)]
pub struct FilterSession {
    filters: FilterState,
    location: Location,
    bounds: PriceRange,
}

impl FilterSession {
    /// Create a session at `location`, with `default_bounds` assumed until
    /// facets arrive.
    pub fn new(location: Location, default_bounds: PriceRange) -> Self {
        let mut session = Self {
            filters: FilterState::with_bounds(default_bounds),
            location: Location::default(),
            bounds: default_bounds,
        };
        session.sync_from_location(location);
        session
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Price bounds from the last known facets.
    pub fn bounds(&self) -> PriceRange {
        self.bounds
    }

    /// Re-derive the URL-owned fields from `location`.
    ///
    /// A search page without any parameter resets every filter. Returns
    /// whether the filters changed.
    pub fn sync_from_location(&mut self, location: Location) -> bool {
        let before = self.filters.clone();
        match location.route() {
            Route::Search if !location.has_params() => {
                self.filters = FilterState::with_bounds(self.bounds);
            }
            Route::Search => {
                self.filters.query = location.url_query().unwrap_or_default().to_string();
                self.filters.set_tags(location.url_tags());
            }
            Route::LegacyTag(tag) => {
                self.filters.query.clear();
                self.filters.set_tags([tag]);
            }
            Route::Home => {}
        }
        self.location = location;
        self.filters != before
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.filters.toggle_category(category);
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.filters.toggle_tag(tag);
    }

    pub fn set_sort(&mut self, sort_by: SortBy) {
        self.filters.sort_by = sort_by;
    }

    /// Set the price range, clamped into the current bounds.
    pub fn set_price_range(&mut self, range: PriceRange) {
        self.filters.price_range = range.clamp_to(self.bounds);
    }

    pub fn set_featured(&mut self, featured: bool) {
        self.filters.featured = featured;
    }

    /// Replace the filters wholesale (an applied mobile draft).
    pub fn apply(&mut self, mut filters: FilterState) {
        filters.price_range = filters.price_range.clamp_to(self.bounds);
        let tags = std::mem::take(&mut filters.tags);
        filters.set_tags(tags);
        self.filters = filters;
    }

    /// Adopt price bounds reported by facets.
    ///
    /// An un-narrowed range follows the new bounds; a narrowed one is
    /// clamped into them.
    pub fn apply_facet_bounds(&mut self, bounds: PriceRange) {
        if !bounds.is_valid() {
            tracing::warn!(min = bounds.min, max = bounds.max, "ignoring invalid facet price bounds");
            return;
        }
        if bounds == self.bounds {
            return;
        }
        if self.filters.price_range.is_narrowed(self.bounds) {
            self.filters.price_range = self.filters.price_range.clamp_to(bounds);
        } else {
            self.filters.price_range = bounds;
        }
        tracing::debug!(min = bounds.min, max = bounds.max, "adopted facet price bounds");
        self.bounds = bounds;
    }

    /// Whether anything narrows the results.
    ///
    /// Sort order is a display preference and does not count.
    pub fn has_active_filters(&self) -> bool {
        let f = &self.filters;
        !f.query.is_empty()
            || !f.category.is_empty()
            || !f.tags.is_empty()
            || f.featured
            || f.price_range.is_narrowed(self.bounds)
            || self.location.carries_filters()
            || matches!(self.location.route(), Route::LegacyTag(_))
    }

    /// Reset the filters and report the URL change the caller should make.
    pub fn clear_filters(&mut self) -> ClearAction {
        if !self.has_active_filters() {
            let clean = self.location.route().is_search() && !self.location.has_params();
            return if clean {
                ClearAction::NoOp
            } else {
                ClearAction::NavigateToSearch
            };
        }

        self.filters = FilterState::with_bounds(self.bounds);
        if self.location.route().is_search() {
            ClearAction::StripParams
        } else {
            ClearAction::NavigateToSearch
        }
    }

    pub fn build_request(&self) -> SearchRequest {
        SearchRequest::build(&self.location, &self.filters, self.bounds)
    }
}
