//! Search core configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::filter::PriceRange;

/// Tunables for the search core.
///
/// All durations are stored in milliseconds so the struct reads naturally
/// from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path of the search endpoint, relative to the API base URL.
    pub endpoint: String,
    /// Quiet period before a text query / initial load is searched.
    pub search_debounce_ms: u64,
    /// Quiet period before a filter refinement is searched.
    pub filter_debounce_ms: u64,
    /// Quiet period before a price slider movement is committed.
    pub slider_debounce_ms: u64,
    /// Quiet period before suggestions are fetched while typing.
    pub suggest_debounce_ms: u64,
    /// Delay between fresh results and clearing the filtering flag.
    pub settle_ms: u64,
    /// Maximum number of recent searches kept.
    pub recent_capacity: usize,
    /// Storage key of the recent-search blob.
    pub recent_key: String,
    /// Price bounds assumed until the endpoint reports facets.
    pub default_price_range: PriceRange,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/search".to_string(),
            search_debounce_ms: 300,
            filter_debounce_ms: 150,
            slider_debounce_ms: 300,
            suggest_debounce_ms: 300,
            settle_ms: 50,
            recent_capacity: crate::recent::MAX_RECENT_SEARCHES,
            recent_key: crate::recent::RECENT_SEARCHES_KEY.to_string(),
            default_price_range: PriceRange::DEFAULT,
        }
    }
}

impl SearchConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    pub fn slider_debounce(&self) -> Duration {
        Duration::from_millis(self.slider_debounce_ms)
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.filter_debounce(), Duration::from_millis(150));
        assert_eq!(config.recent_capacity, 10);
        assert_eq!(config.recent_key, "recentSearches");
        assert_eq!(config.default_price_range, PriceRange::new(50.0, 500.0));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"filter_debounce_ms": 80}"#).unwrap();
        assert_eq!(config.filter_debounce_ms, 80);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.endpoint, "/api/search");
    }
}
