//! Route state: the page location and an observable navigation history.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use url::form_urlencoded;

/// Path of the search page.
pub const SEARCH_PATH: &str = "/search";

/// URL parameter carrying the free-text query.
pub const QUERY_PARAM: &str = "q";

/// URL parameter carrying the comma-separated tag filter.
pub const TAGS_PARAM: &str = "tags";

/// A page location: path plus decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    params: Vec<(String, String)>,
}

impl Location {
    /// A location with no parameters.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            path,
            params: Vec::new(),
        }
    }

    /// Parse an href such as `/search?q=mouse&tags=a,b`. Any fragment is
    /// dropped.
    pub fn parse(href: &str) -> Self {
        let href = href.split('#').next().unwrap_or_default();
        let (path, query) = match href.split_once('?') {
            Some((path, query)) => (path, query),
            None => (href, ""),
        };
        let mut location = Self::new(if path.is_empty() { "/" } else { path });
        location.params = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        location
    }

    /// The clean search page.
    pub fn search() -> Self {
        Self::new(SEARCH_PATH)
    }

    /// The search page for a free-text query.
    pub fn text_search(query: &str) -> Self {
        Self::search().with_param(QUERY_PARAM, query.trim())
    }

    /// The search page filtered to one tag.
    pub fn tag_search(tag: &str) -> Self {
        Self::search().with_param(TAGS_PARAM, tag)
    }

    /// The legacy path route for one tag, e.g. `/gaming`.
    pub fn legacy_tag(tag: &str) -> Self {
        Self::new(format!("/{}", urlencoding::encode(tag)))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of `key`, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, replacing any existing values.
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// Drop every query parameter.
    pub fn without_params(mut self) -> Self {
        self.params.clear();
        self
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn route(&self) -> Route {
        Route::from_path(&self.path)
    }

    /// The non-empty `q` parameter.
    pub fn url_query(&self) -> Option<&str> {
        self.param(QUERY_PARAM).filter(|q| !q.is_empty())
    }

    /// Entries of the `tags` parameter, trimmed, blanks dropped.
    pub fn url_tags(&self) -> Vec<String> {
        self.param(TAGS_PARAM).map(split_tags).unwrap_or_default()
    }

    /// Whether the URL carries a non-empty `q` or `tags`.
    pub fn carries_filters(&self) -> bool {
        self.url_query().is_some() || self.param(TAGS_PARAM).is_some_and(|t| !t.is_empty())
    }
}

/// Split a comma-separated tag list.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.has_params() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// The page a location resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Home,
    /// `/search`
    Search,
    /// Any other path, read as a single tag filter.
    LegacyTag(String),
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Route::Home;
        }
        if path.trim_end_matches('/') == SEARCH_PATH {
            return Route::Search;
        }
        let tag = urlencoding::decode(trimmed)
            .map(|t| t.into_owned())
            .unwrap_or_else(|_| trimmed.to_string());
        Route::LegacyTag(tag)
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Route::Search)
    }

    /// The implicit tag of a legacy route.
    pub fn legacy_tag(&self) -> Option<&str> {
        match self {
            Route::LegacyTag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// How the current location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlChange {
    /// Initial location.
    Initial,
    /// A full navigation.
    Navigated,
    /// URL mutated without navigating (the "URL changed" notification).
    SamePage,
    /// History traversal (back/forward).
    PopState,
}

/// The latest location, published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEvent {
    pub location: Location,
    pub change: UrlChange,
    /// Bumped on every change.
    pub seq: u64,
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    index: usize,
    seq: u64,
}

#[derive(Debug)]
struct NavigatorInner {
    history: Mutex<History>,
    events: watch::Sender<RouteEvent>,
}

/// Explicit route state shared between navigation chrome and the search
/// core.
///
/// Cloning is cheap; clones share the same history.
#[derive(Debug, Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl Navigator {
    /// Start at `initial`.
    pub fn new(initial: Location) -> Self {
        let event = RouteEvent {
            location: initial.clone(),
            change: UrlChange::Initial,
            seq: 0,
        };
        let (events, _) = watch::channel(event);
        Self {
            inner: Arc::new(NavigatorInner {
                history: Mutex::new(History {
                    entries: vec![initial],
                    index: 0,
                    seq: 0,
                }),
                events,
            }),
        }
    }

    /// Convenience for `Navigator::new(Location::parse(href))`.
    pub fn at(href: &str) -> Self {
        Self::new(Location::parse(href))
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current location.
    pub fn current(&self) -> Location {
        let history = self.history();
        history.entries[history.index].clone()
    }

    /// Number of changes so far.
    pub fn seq(&self) -> u64 {
        self.history().seq
    }

    /// Watch location changes.
    pub fn subscribe(&self) -> watch::Receiver<RouteEvent> {
        self.inner.events.subscribe()
    }

    /// Navigate to `location`.
    pub fn push(&self, location: Location) {
        self.push_entry(location, UrlChange::Navigated);
    }

    /// Mutate the URL without a navigation, notifying subscribers.
    pub fn push_same_page(&self, location: Location) {
        self.push_entry(location, UrlChange::SamePage);
    }

    fn push_entry(&self, location: Location, change: UrlChange) {
        let mut history = self.history();
        let keep = history.index + 1;
        history.entries.truncate(keep);
        history.entries.push(location.clone());
        history.index = keep;
        history.seq += 1;
        tracing::debug!(location = %location, ?change, "route changed");
        self.publish(&history, location, change);
    }

    /// Go back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Go forward one entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    fn traverse(&self, delta: isize) -> bool {
        let mut history = self.history();
        let Some(target) = history.index.checked_add_signed(delta) else {
            return false;
        };
        if target >= history.entries.len() {
            return false;
        }
        history.index = target;
        history.seq += 1;
        let location = history.entries[target].clone();
        tracing::debug!(location = %location, "history traversal");
        self.publish(&history, location, UrlChange::PopState);
        true
    }

    fn publish(&self, history: &History, location: Location, change: UrlChange) {
        self.inner.events.send_replace(RouteEvent {
            location,
            change,
            seq: history.seq,
        });
    }

    /// Tag shortcut from the navigation chrome: same-page `tags=` update
    /// when already on the search page, a navigation otherwise.
    pub fn search_by_tag(&self, tag: &str) {
        let current = self.current();
        if current.route().is_search() {
            self.push_same_page(current.with_param(TAGS_PARAM, tag));
        } else {
            self.push(Location::tag_search(tag));
        }
    }

    /// "All products": a clean search page.
    pub fn all_products(&self) {
        if self.current().route().is_search() {
            self.push_same_page(Location::search());
        } else {
            self.push(Location::search());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let location = Location::parse("/search?q=wireless+mouse&tags=a%2Cb#top");
        assert_eq!(location.path(), "/search");
        assert_eq!(location.url_query(), Some("wireless mouse"));
        assert_eq!(location.url_tags(), vec!["a", "b"]);
        assert_eq!(location.to_string(), "/search?q=wireless+mouse&tags=a%2Cb");
    }

    #[test]
    fn test_tags_are_trimmed() {
        let location = Location::parse("/search?tags=%20gaming%20,,rgb");
        assert_eq!(location.url_tags(), vec!["gaming", "rgb"]);
    }

    #[test]
    fn test_routes() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
        assert_eq!(Route::from_path("/search"), Route::Search);
        assert_eq!(Route::from_path("/search/"), Route::Search);
        assert_eq!(Route::from_path("/gaming"), Route::LegacyTag("gaming".into()));
        assert_eq!(
            Route::from_path("/home%20office"),
            Route::LegacyTag("home office".into())
        );
    }

    #[test]
    fn test_legacy_tag_roundtrip() {
        let location = Location::legacy_tag("home office");
        assert_eq!(location.path(), "/home%20office");
        assert_eq!(location.route().legacy_tag(), Some("home office"));
    }

    #[test]
    fn test_carries_filters() {
        assert!(!Location::parse("/search").carries_filters());
        assert!(!Location::parse("/search?q=").carries_filters());
        assert!(!Location::parse("/search?page=2").carries_filters());
        assert!(Location::parse("/search?tags=a").carries_filters());
    }

    #[test]
    fn test_history_back_forward() {
        let nav = Navigator::at("/");
        nav.push(Location::text_search("mouse"));
        nav.push(Location::legacy_tag("gaming"));

        assert!(nav.back());
        assert_eq!(nav.current().to_string(), "/search?q=mouse");
        assert!(nav.back());
        assert!(!nav.back());
        assert!(nav.forward());

        // A push drops the forward entries.
        nav.push(Location::search());
        assert!(!nav.forward());
        assert_eq!(nav.seq(), 6);
    }

    #[test]
    fn test_subscribers_see_change_kind() {
        let nav = Navigator::at("/search");
        let mut events = nav.subscribe();

        nav.search_by_tag("gaming");
        assert!(events.has_changed().unwrap());
        let event = events.borrow_and_update().clone();
        assert_eq!(event.change, UrlChange::SamePage);
        assert_eq!(event.location.to_string(), "/search?tags=gaming");

        nav.push(Location::legacy_tag("audio"));
        nav.search_by_tag("rgb");
        let event = events.borrow_and_update().clone();
        assert_eq!(event.change, UrlChange::Navigated);
        assert_eq!(event.location.to_string(), "/search?tags=rgb");

        nav.back();
        assert_eq!(events.borrow().change, UrlChange::PopState);
    }

    #[test]
    fn test_all_products() {
        let nav = Navigator::at("/search?q=desk");
        nav.all_products();
        assert_eq!(nav.current(), Location::search());
        assert_eq!(nav.subscribe().borrow().change, UrlChange::SamePage);
    }
}
