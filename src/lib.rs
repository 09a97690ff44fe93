//! casamap: the map search and filtering engine behind the CasaConnect
//! rental screens.
//!
//! Given a catalog of point-of-interest records and a pannable viewport,
//! the engine keeps a distance-ranked subset of the catalog in sync with a
//! map surface, resolves free-text queries through a debounced geocoding
//! pipeline, and tracks marker selection. The host UI supplies events
//! ([`session::Msg`]) and renders the session's derived state; tiles,
//! widgets, and navigation live entirely outside this crate.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod markers;
pub mod resolver;
pub mod selection;
pub mod session;
pub mod surface;
pub mod timer;
pub mod viewport;

pub use catalog::{FilteredResult, Point};
pub use config::MapConfig;
pub use geo::{AreaTag, Coordinate, distance_km};
pub use resolver::Suggestion;
pub use selection::{PixelPoint, SelectionState};
pub use session::{MapSession, Msg, Notice};
pub use surface::{MapSurface, MarkerStyle, StaticSurface};
pub use viewport::{InteractionMode, Viewport};
