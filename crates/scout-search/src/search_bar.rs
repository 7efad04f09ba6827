//! Search bar session: typed term, debounced suggestions, committing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::Item;
use crate::recent::{RecentSearchEntry, RecentSearches};
use crate::route::{Location, Navigator};
use crate::suggest::SuggestionFetcher;

/// Where a tag search from the bar lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagRouting {
    /// `/<tag>` (desktop bar).
    #[default]
    LegacyPath,
    /// `/search?tags=<tag>` (mobile modal).
    QueryParam,
}

/// Suggestion dropdown state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestionState {
    /// Term the suggestions belong to.
    pub term: String,
    pub loading: bool,
    pub suggestions: Vec<String>,
    pub items: Vec<Item>,
    pub notice: Option<String>,
    /// Bumped on every keystroke; responses for older generations are
    /// dropped.
    pub generation: u64,
}

impl SuggestionState {
    pub fn is_open(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// One search bar instance.
pub struct SearchBar {
    fetcher: SuggestionFetcher,
    recent: RecentSearches,
    navigator: Navigator,
    debounce: Duration,
    tag_routing: TagRouting,
    term: String,
    catalog: Vec<Item>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SuggestionState>>,
    pending: Option<JoinHandle<()>>,
}

impl SearchBar {
    pub fn new(fetcher: SuggestionFetcher, recent: RecentSearches, navigator: Navigator) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            fetcher,
            recent,
            navigator,
            debounce: Duration::from_millis(300),
            tag_routing: TagRouting::default(),
            term: String::new(),
            catalog: Vec::new(),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            pending: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_tag_routing(mut self, routing: TagRouting) -> Self {
        self.tag_routing = routing;
        self
    }

    /// Load the catalog snapshot used to recognise tag suggestions.
    pub async fn seed_catalog(&mut self) {
        self.catalog = self.fetcher.catalog_items().await;
        tracing::debug!(items = self.catalog.len(), "seeded search bar catalog");
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn recent(&self) -> &[RecentSearchEntry] {
        self.recent.entries()
    }

    pub fn suggestions(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    /// Update the typed term and schedule a suggestion lookup.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn type_text(&mut self, text: &str) {
        self.term = text.to_string();
        let generation = self.bump();

        if text.trim().is_empty() {
            self.state.send_replace(SuggestionState {
                term: self.term.clone(),
                generation,
                ..SuggestionState::default()
            });
            return;
        }

        self.state.send_modify(|s| {
            s.term = text.to_string();
            s.loading = true;
            s.generation = generation;
        });

        let fetcher = self.fetcher.clone();
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let debounce = self.debounce;
        let term = self.term.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let outcome = fetcher.fetch(&term).await;
            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!(term = %term, "dropping stale suggestions");
                return;
            }
            state.send_replace(SuggestionState {
                term,
                loading: false,
                suggestions: outcome.suggestions,
                items: outcome.items,
                notice: outcome.notice,
                generation,
            });
        }));
    }

    /// Whether `suggestion` names a tag of a known item.
    pub fn is_tag(&self, suggestion: &str) -> bool {
        let state = self.state.borrow();
        self.catalog
            .iter()
            .chain(state.items.iter())
            .any(|item| item.has_tag(suggestion))
    }

    /// Search for the typed term.
    pub fn submit(&mut self) {
        let term = self.term.clone();
        self.search(&term, None);
    }

    /// Pick a suggestion: tags become tag searches, anything else a text
    /// search.
    pub fn select_suggestion(&mut self, suggestion: &str) {
        if self.is_tag(suggestion) {
            self.search_tag(suggestion);
        } else {
            self.search(suggestion, None);
        }
    }

    pub fn search_tag(&mut self, tag: &str) {
        self.search("", Some(tag));
    }

    /// Re-run a recent search.
    pub fn select_recent(&mut self, entry: &RecentSearchEntry) {
        let entry = entry.clone();
        self.search(&entry.query, entry.tag.as_deref());
    }

    /// Commit a search: record it, close the dropdown and navigate.
    pub fn search(&mut self, query: &str, tag: Option<&str>) {
        self.term = query.to_string();
        self.close();

        if let Err(e) = self.recent.record(query, tag) {
            tracing::warn!(error = %e, "failed to save recent search");
        }

        let tag = tag.filter(|t| !t.is_empty());
        let location = match (tag, query.trim()) {
            (Some(tag), _) => match self.tag_routing {
                TagRouting::LegacyPath => Location::legacy_tag(tag),
                TagRouting::QueryParam => Location::tag_search(tag),
            },
            (None, "") => match self.tag_routing {
                TagRouting::LegacyPath => Location::default(),
                TagRouting::QueryParam => Location::search(),
            },
            (None, query) => Location::text_search(query),
        };
        self.navigator.push(location);
    }

    /// Empty the input without navigating. Known items are kept.
    pub fn clear_input(&mut self) {
        self.term.clear();
        let generation = self.bump();
        self.state.send_modify(|s| {
            s.term.clear();
            s.loading = false;
            s.suggestions.clear();
            s.notice = None;
            s.generation = generation;
        });
    }

    pub fn clear_recent(&mut self) -> Result<(), crate::error::SearchError> {
        self.recent.clear()
    }

    fn close(&mut self) {
        let generation = self.bump();
        self.state.send_modify(|s| {
            s.loading = false;
            s.suggestions.clear();
            s.notice = None;
            s.generation = generation;
        });
    }

    fn bump(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Drop for SearchBar {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl std::fmt::Debug for SearchBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBar")
            .field("term", &self.term)
            .field("tag_routing", &self.tag_routing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::model::SuggestionResponse;
    use crate::suggest::OFFLINE_NOTICE;
    use crate::testing::{item, FakeApi};
    use scout_cache::{Cache, MemoryStore};

    fn bar(api: &Arc<FakeApi>, href: &str) -> (SearchBar, Navigator) {
        let navigator = Navigator::at(href);
        let recent = RecentSearches::load(Cache::new(Arc::new(MemoryStore::new())));
        let bar = SearchBar::new(SuggestionFetcher::new(api.clone()), recent, navigator.clone());
        (bar, navigator)
    }

    fn response(suggestions: &[&str], items: Vec<Item>) -> SuggestionResponse {
        SuggestionResponse {
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            items,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_is_debounced() {
        let api = FakeApi::new();
        let (mut bar, _nav) = bar(&api, "/");
        let mut rx = bar.subscribe();

        bar.type_text("m");
        bar.type_text("mo");
        bar.type_text("mou");
        assert!(bar.suggestions().loading);

        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert_eq!(api.suggests(), vec!["mou"]);
        assert_eq!(state.term, "mou");
        assert_eq!(state.suggestions, vec!["mou pro"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_suggestions_dropped() {
        let api = FakeApi::new();
        api.push_suggest(500, Ok(response(&["slow"], Vec::new())));
        api.push_suggest(10, Ok(response(&["fast"], Vec::new())));
        let (mut bar, _nav) = bar(&api, "/");

        bar.type_text("de");
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(api.suggests(), vec!["de"]);

        bar.type_text("desk");
        tokio::time::sleep(Duration::from_secs(2)).await;

        let state = bar.suggestions();
        assert_eq!(state.suggestions, vec!["fast"]);
        assert_eq!(state.term, "desk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_term_clears_without_network() {
        let api = FakeApi::new();
        let (mut bar, _nav) = bar(&api, "/");

        bar.type_text("   ");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(api.suggests().is_empty());
        assert!(!bar.suggestions().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_notice() {
        let api = FakeApi::new();
        api.push_suggest(5, Err(SearchError::Network("offline".into())));
        let (mut bar, _nav) = bar(&api, "/");
        let mut rx = bar.subscribe();

        bar.type_text("chair");
        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert!(state.suggestions.is_empty());
        assert_eq!(state.notice.as_deref(), Some(OFFLINE_NOTICE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_records_and_navigates() {
        let api = FakeApi::new();
        let (mut bar, nav) = bar(&api, "/");

        bar.type_text("  wireless mouse ");
        bar.submit();

        assert_eq!(nav.current().to_string(), "/search?q=wireless+mouse");
        assert_eq!(bar.recent()[0].query, "wireless mouse");
        assert!(!bar.suggestions().loading);

        // The pending lookup was cancelled by the commit.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(api.suggests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tag_suggestion_routes_to_tag() {
        let api = FakeApi::new();
        api.push_suggest(
            5,
            Ok(response(
                &["Gaming", "gaming mouse"],
                vec![item("1", "Gaming Mouse", &["gaming"])],
            )),
        );
        let (mut bar, nav) = bar(&api, "/");
        let mut rx = bar.subscribe();

        bar.type_text("gam");
        rx.wait_for(|s| !s.loading).await.unwrap();

        assert!(bar.is_tag("Gaming"));
        assert!(!bar.is_tag("gaming mouse"));
        bar.select_suggestion("Gaming");
        assert_eq!(nav.current().to_string(), "/Gaming");
        assert_eq!(bar.recent()[0].tag.as_deref(), Some("Gaming"));
        assert!(bar.recent()[0].query.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_tag_routing() {
        let api = FakeApi::new();
        let (bar, nav) = bar(&api, "/");
        let mut bar = bar.with_tag_routing(TagRouting::QueryParam);

        bar.search_tag("office");
        assert_eq!(nav.current().to_string(), "/search?tags=office");

        bar.search("", None);
        assert_eq!(nav.current(), Location::search());
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_seed_recognises_tags() {
        let api = FakeApi::new();
        api.push_search(
            5,
            Ok(crate::model::ResultSet {
                items: vec![item("1", "Desk Lamp", &["lighting"])],
                total: 1,
                ..Default::default()
            }),
        );
        let (mut bar, _nav) = bar(&api, "/");
        bar.seed_catalog().await;
        assert!(bar.is_tag("Lighting"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_recent_and_clear_input() {
        let api = FakeApi::new();
        let (mut bar, nav) = bar(&api, "/");
        bar.search("desk", None);
        bar.search("chair", None);

        let desk = bar.recent()[1].clone();
        bar.select_recent(&desk);
        assert_eq!(nav.current().to_string(), "/search?q=desk");
        assert_eq!(bar.recent()[0].query, "desk");
        assert_eq!(bar.recent().len(), 2);

        bar.clear_input();
        assert!(bar.term().is_empty());
        assert_eq!(nav.current().to_string(), "/search?q=desk");

        bar.clear_recent().unwrap();
        assert!(bar.recent().is_empty());
    }
}
