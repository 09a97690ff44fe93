//! Message types for the map session
//!
//! Every user intent and every async completion enters the session as a
//! [`Msg`]; [`super::MapSession::update`] is the only consumer. Generation
//! fields tag completions so stale ones can be discarded.

use crate::error::{GeocodeError, LocationError};
use crate::geo::{AreaTag, Coordinate};
use crate::resolver::Suggestion;
use crate::selection::PixelPoint;

/// All session messages.
#[derive(Debug)]
pub enum Msg {
    /// The search field's text changed (keystroke, paste, clear)
    QueryChanged(String),
    /// The user submitted the search field
    SubmitSearch,
    /// A one-shot geocode finished; stale if `generation` is outdated
    SearchResolved {
        generation: u64,
        query: String,
        outcome: Result<Option<Coordinate>, GeocodeError>,
    },
    /// A debounced suggestion lookup finished
    SuggestionsReady {
        generation: u64,
        suggestions: Vec<Suggestion>,
    },
    /// The user picked the suggestion at this index
    SuggestionPicked(usize),
    /// The suggestion dropdown lost focus or was dismissed
    SuggestionsDismissed,
    /// The user tapped an area filter chip
    AreaSelected(AreaTag),
    /// A user-location fix was requested; `explicit` distinguishes a tap on
    /// the locate button from the automatic attempt at screen start
    LocateMe { explicit: bool },
    /// The location provider answered
    LocationResolved {
        explicit: bool,
        outcome: Result<Coordinate, LocationError>,
    },
    /// A drag/zoom gesture started on the map surface
    MapMoveStart,
    /// A gesture paused with the view at this center/zoom
    MapMoveEnd { center: Coordinate, zoom: f64 },
    /// The quiet period after a move-end elapsed
    ViewportSettled(u64),
    /// A catalog marker was tapped, with its on-screen pixel anchor
    MarkerPressed { id: String, anchor: PixelPoint },
    /// The detail popup was closed
    PopupClosed,
}

/// User-visible, non-fatal events for the host to surface. Data only; the
/// host owns wording and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A search resolved to zero results; suggest a more specific name
    NotFound,
    /// A search failed in transport; suggest trying again
    SearchFailed,
    /// An explicit locate request failed or was denied
    LocationUnavailable,
}
