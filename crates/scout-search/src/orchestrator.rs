//! Search orchestration: debounce, dispatch, cancel and apply.
//!
//! A [`SearchOrchestrator`] runs as a single task that owns the filter
//! session and the lifecycle state machine. Callers talk to it through a
//! [`SearchHandle`]: commands go in over a channel, snapshots come out over
//! a watch channel. Route changes are picked up from the [`Navigator`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::api::SearchApi;
use crate::config::SearchConfig;
use crate::error::{SearchError, SearchFailure};
use crate::filter::{FilterState, PriceRange, SortBy};
use crate::lifecycle::{Completion, RequestToken, SearchLifecycle, SearchPhase, TriggerKind};
use crate::model::ResultSet;
use crate::request::SearchRequest;
use crate::route::{Location, Navigator, RouteEvent};
use crate::session::{ClearAction, FilterSession};

/// Input accepted by a running search session.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCommand {
    ToggleCategory(String),
    ToggleTag(String),
    SetSort(SortBy),
    /// Commit a price range immediately.
    SetPriceRange(PriceRange),
    /// Move the price slider; committed after the slider quiet period.
    SlidePrice(PriceRange),
    SetFeatured(bool),
    /// Apply a mobile filter draft as one refinement.
    ApplyFilters(FilterState),
    ClearFilters,
    /// Re-run the last request construction without debounce.
    Retry,
    Shutdown,
}

/// What a consumer should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchView {
    /// Nothing to show yet.
    FullSkeleton,
    /// Results are being refined; show the lightweight skeleton.
    FilterSkeleton,
    /// The last search failed.
    Error,
    /// Show the result set.
    Results,
}

/// Observable state of a search session.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub filters: FilterState,
    pub location: Location,
    /// Price bounds from the last known facets.
    pub bounds: PriceRange,
    /// Current slider position (may lead `filters.price_range`).
    pub slider: PriceRange,
    pub results: Option<ResultSet>,
    pub error: Option<SearchFailure>,
    pub phase: SearchPhase,
    /// Token of the last applied request.
    pub last_applied: Option<RequestToken>,
    /// Number of applied completions.
    pub completed: u64,
    pub is_initial_load: bool,
    pub is_searching: bool,
    pub is_filtering: bool,
    pub show_filter_skeleton: bool,
    pub has_active_filters: bool,
}

impl SearchSnapshot {
    pub fn view(&self) -> SearchView {
        if self.is_searching && self.results.is_none() {
            return SearchView::FullSkeleton;
        }
        if self.error.is_some() && !self.is_searching {
            return SearchView::Error;
        }
        if self.show_filter_skeleton {
            return SearchView::FilterSkeleton;
        }
        if self.results.is_some() {
            SearchView::Results
        } else {
            SearchView::FullSkeleton
        }
    }

    /// Whether a search has completed and nothing is pending.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SearchPhase::Succeeded | SearchPhase::Failed) && !self.is_filtering
    }
}

/// Builder for a search session task.
pub struct SearchOrchestrator {
    api: Arc<dyn SearchApi>,
    navigator: Navigator,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn SearchApi>, navigator: Navigator) -> Self {
        Self {
            api,
            navigator,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the session. The initial search is scheduled immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> SearchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let routes = self.navigator.subscribe();

        let session = FilterSession::new(self.navigator.current(), self.config.default_price_range);
        let mut worker = Worker {
            api: self.api,
            navigator: self.navigator,
            config: self.config,
            session,
            lifecycle: SearchLifecycle::new(),
            in_flight: None,
            slider: None,
            settle_at: None,
            results: None,
            error: None,
            last_applied: None,
            completed: 0,
            is_initial_load: true,
            is_searching: false,
            is_filtering: false,
            show_filter_skeleton: false,
            root: CancellationToken::new(),
            done_tx,
            snapshots: None,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(worker.snapshot());
        worker.snapshots = Some(snapshot_tx);

        let task = tokio::spawn(worker.run(command_rx, routes, done_rx));
        SearchHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Handle to a running search session.
#[derive(Debug)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<SearchCommand>,
    snapshots: watch::Receiver<SearchSnapshot>,
    task: JoinHandle<()>,
}

impl SearchHandle {
    pub fn send(&self, command: SearchCommand) -> Result<(), SearchError> {
        self.commands.send(command).map_err(|_| SearchError::Closed)
    }

    pub fn toggle_category(&self, category: impl Into<String>) -> Result<(), SearchError> {
        self.send(SearchCommand::ToggleCategory(category.into()))
    }

    pub fn toggle_tag(&self, tag: impl Into<String>) -> Result<(), SearchError> {
        self.send(SearchCommand::ToggleTag(tag.into()))
    }

    pub fn set_sort(&self, sort_by: SortBy) -> Result<(), SearchError> {
        self.send(SearchCommand::SetSort(sort_by))
    }

    pub fn set_price_range(&self, range: PriceRange) -> Result<(), SearchError> {
        self.send(SearchCommand::SetPriceRange(range))
    }

    pub fn slide_price(&self, range: PriceRange) -> Result<(), SearchError> {
        self.send(SearchCommand::SlidePrice(range))
    }

    pub fn set_featured(&self, featured: bool) -> Result<(), SearchError> {
        self.send(SearchCommand::SetFeatured(featured))
    }

    pub fn apply_filters(&self, filters: FilterState) -> Result<(), SearchError> {
        self.send(SearchCommand::ApplyFilters(filters))
    }

    pub fn clear_filters(&self) -> Result<(), SearchError> {
        self.send(SearchCommand::ClearFilters)
    }

    pub fn retry(&self) -> Result<(), SearchError> {
        self.send(SearchCommand::Retry)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SearchSnapshot) -> bool,
    ) -> Result<SearchSnapshot, SearchError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| SearchError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait until at least `completed` searches have been applied and the
    /// session is settled.
    pub async fn settled(&self, completed: u64) -> Result<SearchSnapshot, SearchError> {
        self.wait_for(|s| s.completed >= completed && s.is_settled())
            .await
    }

    /// Stop the session and wait for the task to exit.
    pub async fn shutdown(self) -> Result<(), SearchError> {
        let _ = self.commands.send(SearchCommand::Shutdown);
        self.task
            .await
            .map_err(|e| SearchError::Generic(format!("search task failed: {e}")))
    }
}

struct Done {
    token: RequestToken,
    request: SearchRequest,
    result: Result<ResultSet, SearchError>,
}

struct Worker {
    api: Arc<dyn SearchApi>,
    navigator: Navigator,
    config: SearchConfig,
    session: FilterSession,
    lifecycle: SearchLifecycle,
    in_flight: Option<(RequestToken, CancellationToken)>,
    slider: Option<(PriceRange, Instant)>,
    settle_at: Option<Instant>,
    results: Option<ResultSet>,
    error: Option<SearchFailure>,
    last_applied: Option<RequestToken>,
    completed: u64,
    is_initial_load: bool,
    is_searching: bool,
    is_filtering: bool,
    show_filter_skeleton: bool,
    root: CancellationToken,
    done_tx: mpsc::UnboundedSender<Done>,
    snapshots: Option<watch::Sender<SearchSnapshot>>,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SearchCommand>,
        mut routes: watch::Receiver<RouteEvent>,
        mut done: mpsc::UnboundedReceiver<Done>,
    ) {
        routes.borrow_and_update();
        self.trigger(TriggerKind::Initial);
        self.publish();

        let mut routes_open = true;
        loop {
            let search_at = self.lifecycle.deadline();
            let slider_at = self.slider.map(|(_, at)| at);
            let settle_at = self.settle_at;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(SearchCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                changed = routes.changed(), if routes_open => match changed {
                    Ok(()) => {
                        let event = routes.borrow_and_update().clone();
                        self.on_route(event);
                    }
                    Err(_) => routes_open = false,
                },
                Some(finished) = done.recv() => self.on_done(finished),
                () = sleep_until_opt(search_at) => self.dispatch(),
                () = sleep_until_opt(slider_at) => self.commit_slider(),
                () = sleep_until_opt(settle_at) => {
                    self.settle_at = None;
                    self.is_filtering = false;
                }
            }
            self.publish();
        }

        self.root.cancel();
        tracing::debug!("search session stopped");
    }

    fn handle(&mut self, command: SearchCommand) {
        match command {
            SearchCommand::ToggleCategory(category) => {
                self.session.toggle_category(&category);
                self.filter_changed();
            }
            SearchCommand::ToggleTag(tag) => {
                self.session.toggle_tag(&tag);
                self.filter_changed();
            }
            SearchCommand::SetSort(sort_by) => {
                self.session.set_sort(sort_by);
                self.filter_changed();
            }
            SearchCommand::SetPriceRange(range) => {
                self.slider = None;
                self.session.set_price_range(range);
                self.filter_changed();
            }
            SearchCommand::SlidePrice(range) => {
                let at = Instant::now() + self.config.slider_debounce();
                self.slider = Some((range, at));
            }
            SearchCommand::SetFeatured(featured) => {
                self.session.set_featured(featured);
                self.filter_changed();
            }
            SearchCommand::ApplyFilters(filters) => {
                self.slider = None;
                self.session.apply(filters);
                self.filter_changed();
            }
            SearchCommand::ClearFilters => self.clear_filters(),
            SearchCommand::Retry => {
                tracing::debug!("retrying search");
                self.trigger(TriggerKind::Retry);
                self.dispatch();
            }
            SearchCommand::Shutdown => {}
        }
    }

    fn on_route(&mut self, event: RouteEvent) {
        tracing::debug!(location = %event.location, change = ?event.change, "syncing filters from url");
        self.session.sync_from_location(event.location);
        self.trigger(TriggerKind::Query);
    }

    fn filter_changed(&mut self) {
        self.is_filtering = true;
        self.show_filter_skeleton = true;
        self.settle_at = None;
        self.trigger(TriggerKind::Filtering);
    }

    fn commit_slider(&mut self) {
        let Some((range, _)) = self.slider.take() else {
            return;
        };
        if range != self.session.filters().price_range {
            self.session.set_price_range(range);
            self.filter_changed();
        }
    }

    fn clear_filters(&mut self) {
        let action = self.session.clear_filters();
        tracing::debug!(?action, "clearing filters");
        match action {
            ClearAction::NoOp => return,
            ClearAction::StripParams => {
                self.cancel_search();
                self.navigator.push_same_page(Location::search());
            }
            ClearAction::NavigateToSearch => {
                self.cancel_search();
                self.navigator.push(Location::search());
            }
        }
        self.slider = None;
    }

    fn trigger(&mut self, kind: TriggerKind) {
        let debounce = match kind {
            TriggerKind::Filtering => self.config.filter_debounce(),
            TriggerKind::Retry => std::time::Duration::ZERO,
            TriggerKind::Initial | TriggerKind::Query => self.config.search_debounce(),
        };
        let scheduled = self.lifecycle.schedule(kind, debounce, Instant::now());
        if let Some(token) = scheduled.superseded {
            self.abort(token);
        }
    }

    fn cancel_search(&mut self) {
        if let Some(token) = self.lifecycle.cancel() {
            self.abort(token);
        }
    }

    fn abort(&mut self, token: RequestToken) {
        if let Some((current, cancel)) = self.in_flight.take() {
            cancel.cancel();
            tracing::debug!(request = %current, superseded = %token, "cancelled in-flight search");
        }
    }

    fn dispatch(&mut self) {
        let Some((token, kind)) = self.lifecycle.dispatch() else {
            return;
        };
        let request = self.session.build_request();
        tracing::debug!(
            generation = token.generation(),
            ?kind,
            params = ?request.to_query_pairs(),
            "dispatching search"
        );

        self.is_searching = true;
        self.error = None;

        let cancel = self.root.child_token();
        self.in_flight = Some((token, cancel.clone()));

        let api = Arc::clone(&self.api);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => Err(SearchError::Cancelled),
                result = api.search(&request) => result,
            };
            let _ = done.send(Done {
                token,
                request,
                result,
            });
        });
    }

    fn on_done(&mut self, finished: Done) {
        let Done {
            token,
            request,
            result,
        } = finished;

        if self.lifecycle.complete(token, result.is_ok()) == Completion::Stale {
            tracing::debug!(request = %token, "discarding stale search response");
            return;
        }
        if self.in_flight.as_ref().is_some_and(|(t, _)| *t == token) {
            self.in_flight = None;
        }

        match result {
            Ok(results) => {
                tracing::debug!(request = %token, total = results.total, "search completed");
                // Facets of a price-filtered request describe the filtered
                // set, not the catalog.
                if !request.carries_price() {
                    self.session.apply_facet_bounds(results.facets.price_range);
                }
                self.results = Some(results);
                self.error = None;
            }
            Err(error) => {
                self.results = None;
                self.error = SearchFailure::from_error(&error);
                if let Some(failure) = &self.error {
                    tracing::warn!(request = %token, kind = ?failure.kind, error = %error, "search failed");
                }
            }
        }

        self.last_applied = Some(token);
        self.completed += 1;
        self.is_searching = false;
        self.is_initial_load = false;
        if self.is_filtering {
            self.show_filter_skeleton = false;
            self.settle_at = Some(Instant::now() + self.config.settle_delay());
        }
    }

    fn snapshot(&self) -> SearchSnapshot {
        let filters = self.session.filters().clone();
        let slider = self
            .slider
            .map(|(range, _)| range)
            .unwrap_or(filters.price_range);
        SearchSnapshot {
            location: self.session.location().clone(),
            bounds: self.session.bounds(),
            slider,
            results: self.results.clone(),
            error: self.error.clone(),
            phase: self.lifecycle.phase(),
            last_applied: self.last_applied,
            completed: self.completed,
            is_initial_load: self.is_initial_load,
            is_searching: self.is_searching,
            is_filtering: self.is_filtering,
            show_filter_skeleton: self.show_filter_skeleton,
            has_active_filters: self.session.has_active_filters(),
            filters,
        }
    }

    fn publish(&self) {
        let Some(tx) = &self.snapshots else {
            return;
        };
        let next = self.snapshot();
        tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
