//! Search core for the Scout storefront.
//!
//! Holds the state that sits under the search page and the search bar:
//! - `FilterSession` - filter state synchronized with the page URL
//! - `SearchOrchestrator` - debounced, cancellable searches feeding a
//!   `SearchSnapshot`
//! - `RecentSearches` - bounded recent-search history in local storage
//! - `SuggestionFetcher` / `SearchBar` - best-effort autosuggest
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scout_data::FetchClient;
//! use scout_search::prelude::*;
//!
//! let client = FetchClient::new()?.with_base_url("https://shop.example.com");
//! let api = Arc::new(HttpSearchApi::new(client, "/api/search"));
//! let navigator = Navigator::at("/search?q=mouse");
//!
//! let search = SearchOrchestrator::new(api, navigator.clone()).spawn();
//! search.toggle_tag("wireless")?;
//! let snapshot = search.settled(1).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod recent;
pub mod request;
pub mod route;
pub mod search_bar;
pub mod session;
pub mod suggest;

#[cfg(test)]
mod testing;

pub use api::{HttpSearchApi, SearchApi};
pub use config::SearchConfig;
pub use error::{ErrorKind, SearchError, SearchFailure};
pub use filter::{FilterDraft, FilterState, PriceRange, SortBy};
pub use lifecycle::{RequestToken, SearchLifecycle, SearchPhase, TriggerKind};
pub use model::{FacetCount, Facets, Item, ResultSet, SuggestionResponse};
pub use orchestrator::{SearchCommand, SearchHandle, SearchOrchestrator, SearchSnapshot, SearchView};
pub use recent::{RecentSearchEntry, RecentSearches, MAX_RECENT_SEARCHES, RECENT_SEARCHES_KEY};
pub use request::SearchRequest;
pub use route::{Location, Navigator, Route, RouteEvent, UrlChange};
pub use search_bar::{SearchBar, SuggestionState, TagRouting};
pub use session::{ClearAction, FilterSession};
pub use suggest::{SuggestionFetcher, SuggestionOutcome};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        FilterState, HttpSearchApi, Location, Navigator, PriceRange, RecentSearches, ResultSet,
        SearchApi, SearchBar, SearchConfig, SearchError, SearchHandle, SearchOrchestrator,
        SearchSnapshot, SortBy, SuggestionFetcher,
    };
}
