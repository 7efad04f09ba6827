//! Best-effort suggestion lookups.

use std::sync::Arc;

use crate::api::SearchApi;
use crate::error::{ErrorKind, SearchError};
use crate::model::Item;

/// Notice shown when suggestions cannot be fetched for connectivity reasons.
pub const OFFLINE_NOTICE: &str = "Unable to fetch suggestions. Please check your connection.";

/// Notice shown for other suggestion failures.
pub const FAILED_NOTICE: &str = "Unable to fetch suggestions.";

/// Suggestions for one partial query.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct SuggestionOutcome {
    pub suggestions: Vec<String>,
    /// Item records returned alongside the suggestions.
    pub items: Vec<Item>,
    /// Transient, non-blocking notice when the lookup failed.
    pub notice: Option<String>,
}

impl SuggestionOutcome {
    fn failed(error: &SearchError) -> Self {
        let notice = match error.kind() {
            ErrorKind::Network => OFFLINE_NOTICE,
            _ => FAILED_NOTICE,
        };
        Self {
            notice: Some(notice.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Fetches suggestions and the catalog seed; never fails.
#[derive(Clone)]
pub struct SuggestionFetcher {
    api: Arc<dyn SearchApi>,
}

impl SuggestionFetcher {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        Self { api }
    }

    /// Look up suggestions for `partial`.
    ///
    /// A blank query yields an empty outcome without a network call.
    pub async fn fetch(&self, partial: &str) -> SuggestionOutcome {
        if partial.trim().is_empty() {
            return SuggestionOutcome::default();
        }
        match self.api.suggest(partial).await {
            Ok(body) => SuggestionOutcome {
                suggestions: body.suggestions,
                items: body.items,
                notice: None,
            },
            Err(e) => {
                tracing::warn!(query = partial, error = %e, "failed to fetch suggestions");
                SuggestionOutcome::failed(&e)
            }
        }
    }

    /// Items of the unfiltered catalog, used to resolve suggestion tags.
    ///
    /// Failures are logged and yield no items.
    pub async fn catalog_items(&self) -> Vec<Item> {
        match self.api.catalog().await {
            Ok(results) => results.items,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch catalog snapshot");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for SuggestionFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SuggestionResponse;
    use crate::testing::{item, FakeApi};

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_skips_network() {
        let api = FakeApi::new();
        let fetcher = SuggestionFetcher::new(api.clone());

        assert!(fetcher.fetch("   ").await.is_empty());
        assert!(api.suggests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_returns_suggestions_and_items() {
        let api = FakeApi::new();
        api.push_suggest(
            5,
            Ok(SuggestionResponse {
                suggestions: vec!["wireless mouse".into(), "wireless".into()],
                items: vec![item("1", "Wireless Mouse", &["wireless"])],
            }),
        );
        let outcome = SuggestionFetcher::new(api.clone()).fetch("wire").await;

        assert_eq!(outcome.suggestions, vec!["wireless mouse", "wireless"]);
        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.notice.is_none());
        assert_eq!(api.suggests(), vec!["wire"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_swallowed_with_notice() {
        let api = FakeApi::new();
        api.push_suggest(5, Err(SearchError::Network("refused".into())));
        api.push_suggest(5, Err(SearchError::Generic("HTTP error! status: 400".into())));
        let fetcher = SuggestionFetcher::new(api);

        let outcome = fetcher.fetch("mou").await;
        assert!(outcome.is_empty());
        assert_eq!(outcome.notice.as_deref(), Some(OFFLINE_NOTICE));

        let outcome = fetcher.fetch("mou").await;
        assert_eq!(outcome.notice.as_deref(), Some(FAILED_NOTICE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_items() {
        let api = FakeApi::new();
        api.push_search(
            5,
            Ok(crate::testing::results_with_bounds(&["Desk"], crate::filter::PriceRange::DEFAULT)),
        );
        let items = SuggestionFetcher::new(api.clone()).catalog_items().await;
        assert_eq!(items[0].title, "Desk");
        assert_eq!(api.searches(), vec![Vec::<(String, String)>::new()]);
    }
}
