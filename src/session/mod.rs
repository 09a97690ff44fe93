//! The map screen's state machine
//!
//! [`MapSession`] wires the components together: resolver output moves the
//! viewport, viewport changes recompute the catalog filter, filter output is
//! reconciled onto the surface, and marker taps drive selection. Execution
//! is single-threaded and event-driven: async work (geocoding, location,
//! debounce timers) is spawned on the tokio runtime and re-enters the
//! session as a [`Msg`] through the session's channel.

mod messages;

pub use messages::{Msg, Notice};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::{self, FilteredResult, Point};
use crate::config::MapConfig;
use crate::geo::{AreaTag, Coordinate};
use crate::location::LocationProvider;
use crate::markers::MarkerSynchronizer;
use crate::resolver::{self, Geocoder, PlaceResolver, Suggestion};
use crate::selection::SelectionState;
use crate::surface::MapSurface;
use crate::viewport::{Viewport, ViewportController};

/// Orchestrates one map screen for the lifetime of that screen.
///
/// Dropping the session aborts every pending timer and invalidates all
/// in-flight completions; spawned tasks deliver into a closed channel and
/// their results go nowhere.
pub struct MapSession<G, L> {
    config: MapConfig,
    catalog: Vec<Point>,
    surface: Box<dyn MapSurface>,
    resolver: PlaceResolver<G>,
    location: Arc<L>,
    viewport: ViewportController,
    markers: MarkerSynchronizer,
    selection: SelectionState,
    results: Vec<FilteredResult>,

    query: String,
    area: AreaTag,
    suggestions: Vec<Suggestion>,
    show_suggestions: bool,
    is_loading_suggestions: bool,
    is_searching: bool,
    is_locating: bool,
    search_generation: u64,
    user_location: Option<Coordinate>,
    notices: Vec<Notice>,

    tx: mpsc::UnboundedSender<Msg>,
}

impl<G, L> MapSession<G, L>
where
    G: Geocoder + 'static,
    L: LocationProvider + 'static,
{
    /// Build a session over its collaborators. Returns the receiving end of
    /// the message channel; the host forwards surface gestures and UI
    /// intents into [`MapSession::sender`] and pumps the receiver through
    /// [`MapSession::update`].
    pub fn new(
        config: MapConfig,
        catalog: Vec<Point>,
        mut surface: Box<dyn MapSurface>,
        geocoder: Arc<G>,
        location: Arc<L>,
    ) -> (Self, mpsc::UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let viewport = ViewportController::new(&config, surface.zoom_range());
        let initial = viewport.snapshot();
        surface.set_view(initial.center, initial.zoom);

        let resolver = PlaceResolver::new(geocoder, &config);

        let mut session = Self {
            config,
            catalog,
            surface,
            resolver,
            location,
            viewport,
            markers: MarkerSynchronizer::new(),
            selection: SelectionState::default(),
            results: Vec::new(),
            query: String::new(),
            area: AreaTag::Unscoped,
            suggestions: Vec::new(),
            show_suggestions: false,
            is_loading_suggestions: false,
            is_searching: false,
            is_locating: false,
            search_generation: 0,
            user_location: None,
            notices: Vec::new(),
            tx,
        };
        session.refresh_results();
        session.sync_markers();
        (session, rx)
    }

    /// Sender for injecting messages from the host and the surface.
    pub fn sender(&self) -> mpsc::UnboundedSender<Msg> {
        self.tx.clone()
    }

    /// Drive the session until the host drops every sender.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Msg>) {
        while let Some(msg) = rx.recv().await {
            self.update(msg);
        }
    }

    /// Apply one message. Must be called from within the tokio runtime,
    /// since timers and lookups are spawned from here.
    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::QueryChanged(query) => self.on_query_changed(query),
            Msg::SubmitSearch => self.on_submit_search(),
            Msg::SearchResolved {
                generation,
                query,
                outcome,
            } => self.on_search_resolved(generation, query, outcome),
            Msg::SuggestionsReady {
                generation,
                suggestions,
            } => self.on_suggestions_ready(generation, suggestions),
            Msg::SuggestionPicked(index) => self.on_suggestion_picked(index),
            Msg::SuggestionsDismissed => self.show_suggestions = false,
            Msg::AreaSelected(area) => {
                self.area = area;
                self.refresh_results();
                self.sync_markers();
            }
            Msg::LocateMe { explicit } => self.on_locate_me(explicit),
            Msg::LocationResolved { explicit, outcome } => {
                self.on_location_resolved(explicit, outcome)
            }
            Msg::MapMoveStart => self.viewport.move_start(),
            Msg::MapMoveEnd { center, zoom } => {
                let tx = self.tx.clone();
                self.viewport.move_end(center, zoom, move |generation| {
                    let _ = tx.send(Msg::ViewportSettled(generation));
                });
            }
            Msg::ViewportSettled(generation) => {
                // The surface is already at the gesture's view; only the
                // derived state needs to catch up
                if self.viewport.settle(generation).is_some() {
                    self.refresh_results();
                    self.sync_markers();
                }
            }
            Msg::MarkerPressed { id, anchor } => {
                if self.results.iter().any(|r| r.point.id == id) {
                    self.selection.select(id, anchor);
                    self.sync_markers();
                } else {
                    log::debug!("tap on marker {id} not in the current result set");
                }
            }
            Msg::PopupClosed => {
                self.selection.clear();
                self.sync_markers();
            }
        }
    }

    fn on_query_changed(&mut self, query: String) {
        self.query = query;
        let tx = self.tx.clone();
        let scheduled = self
            .resolver
            .schedule_suggest(&self.query, move |generation, suggestions| {
                let _ = tx.send(Msg::SuggestionsReady {
                    generation,
                    suggestions,
                });
            });
        match scheduled {
            Some(_) => self.is_loading_suggestions = true,
            None => {
                // Too short for autocomplete: drop the list without a lookup
                self.suggestions.clear();
                self.show_suggestions = false;
                self.is_loading_suggestions = false;
            }
        }
        // Unscoped mode narrows the pins by the typed text as well
        self.refresh_results();
        self.sync_markers();
    }

    fn on_submit_search(&mut self) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.show_suggestions = false;
        self.resolver.cancel();
        self.is_loading_suggestions = false;
        self.is_searching = true;
        self.search_generation += 1;

        let generation = self.search_generation;
        let geocoder = self.resolver.geocoder();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = resolver::resolve_one(geocoder.as_ref(), &query).await;
            let _ = tx.send(Msg::SearchResolved {
                generation,
                query,
                outcome,
            });
        });
    }

    fn on_search_resolved(
        &mut self,
        generation: u64,
        query: String,
        outcome: Result<Option<Coordinate>, crate::error::GeocodeError>,
    ) {
        if generation != self.search_generation {
            log::debug!("dropping superseded search result for {query:?}");
            return;
        }
        self.is_searching = false;
        match outcome {
            Ok(Some(center)) => {
                self.area = AreaTag::for_query(&query);
                self.set_view(center, self.config.search_zoom);
                self.refresh_results();
                self.sync_markers();
            }
            Ok(None) => self.notices.push(Notice::NotFound),
            Err(err) => {
                log::warn!("search for {query:?} failed: {err}");
                self.notices.push(Notice::SearchFailed);
            }
        }
    }

    fn on_suggestions_ready(&mut self, generation: u64, suggestions: Vec<Suggestion>) {
        if !self.resolver.is_current(generation) {
            log::debug!("dropping stale suggestion list (gen {generation})");
            return;
        }
        self.is_loading_suggestions = false;
        self.show_suggestions = !suggestions.is_empty();
        self.suggestions = suggestions;
    }

    fn on_suggestion_picked(&mut self, index: usize) {
        let Some(picked) = self.suggestions.get(index).cloned() else {
            return;
        };
        self.query = picked.label.clone();
        self.area = AreaTag::for_query(&picked.label);
        self.resolver.cancel();
        self.suggestions.clear();
        self.show_suggestions = false;
        self.is_loading_suggestions = false;

        self.set_view(picked.coordinate, self.config.search_zoom);
        self.refresh_results();
        self.sync_markers();
    }

    fn on_locate_me(&mut self, explicit: bool) {
        self.is_locating = true;
        let provider = Arc::clone(&self.location);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = provider.current_location().await;
            let _ = tx.send(Msg::LocationResolved { explicit, outcome });
        });
    }

    fn on_location_resolved(
        &mut self,
        explicit: bool,
        outcome: Result<Coordinate, crate::error::LocationError>,
    ) {
        self.is_locating = false;
        match outcome {
            Ok(center) => {
                self.user_location = Some(center);
                self.area = AreaTag::Unscoped;
                self.set_view(center, self.config.default_zoom);
                self.refresh_results();
                self.sync_markers();
            }
            Err(err) if explicit => {
                log::warn!("location request failed: {err}");
                self.notices.push(Notice::LocationUnavailable);
            }
            Err(err) => {
                // Automatic attempt at screen start: keep the default view
                log::debug!("automatic location attempt failed: {err}");
            }
        }
    }

    /// Programmatic view change; pushed to the surface only when the
    /// controller applies it (Idle and above tolerance).
    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        if self.viewport.set_view(center, zoom) {
            let applied = self.viewport.snapshot();
            self.surface.set_view(applied.center, applied.zoom);
        }
    }

    /// Recompute the filtered results from the current center, area, and
    /// query, then enforce the selection invariant: a selected id that
    /// dropped out of the results clears the whole selection.
    fn refresh_results(&mut self) {
        let center = self.viewport.snapshot().center;
        self.results = if self.area == AreaTag::Unscoped {
            catalog::filter_text(&self.catalog, center, &self.query, self.config.radius_km)
        } else {
            catalog::filter(&self.catalog, center, self.area, self.config.radius_km)
        };

        let selection_still_valid = match self.selection.selected_id() {
            Some(id) => self.results.iter().any(|r| r.point.id == id),
            None => true,
        };
        if !selection_still_valid {
            self.selection.clear();
        }
    }

    fn sync_markers(&mut self) {
        self.markers.sync(
            self.surface.as_mut(),
            &self.results,
            &self.selection,
            self.user_location,
        );
    }

    // --- state read by the host UI ---

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn area(&self) -> AreaTag {
        self.area
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.snapshot()
    }

    /// Current ranked results, ascending by distance.
    pub fn results(&self) -> &[FilteredResult] {
        &self.results
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn show_suggestions(&self) -> bool {
        self.show_suggestions
    }

    pub fn is_loading_suggestions(&self) -> bool {
        self.is_loading_suggestions
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn is_locating(&self) -> bool {
        self.is_locating
    }

    pub fn user_location(&self) -> Option<Coordinate> {
        self.user_location
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The selected result with its distance, for the detail popup.
    pub fn selected_result(&self) -> Option<&FilteredResult> {
        let id = self.selection.selected_id()?;
        self.results.iter().find(|r| r.point.id == id)
    }

    pub fn surface(&self) -> &dyn MapSurface {
        self.surface.as_ref()
    }

    /// Drain pending user-visible notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
