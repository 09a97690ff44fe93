//! Map surface collaborator boundary
//!
//! The engine never draws tiles itself; it talks to whatever renders the map
//! through [`MapSurface`]. Hosts with a real interactive map implement the
//! trait over it and translate gestures into session messages; hosts without
//! one compose in [`StaticSurface`], which keeps the filter pipeline working
//! against a non-interactive rendition. The variant is picked at composition
//! time, never by runtime type inspection.

use std::collections::HashMap;

use crate::geo::Coordinate;

/// Visual treatment of a marker. Markers are immutable once placed, so a
/// style change means remove-then-place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Regular catalog pin
    Normal,
    /// The selected pin: larger and highlighted
    Selected,
    /// The single "you are here" pin
    UserLocation,
}

/// Primitives the engine needs from a map rendering surface.
///
/// Implementations are single-writer: only the marker synchronizer mutates
/// the marker layer, and only the viewport controller sets the view.
pub trait MapSurface: Send {
    /// False until the underlying surface has finished initializing.
    /// While not ready, marker syncs are skipped and retried later.
    fn is_ready(&self) -> bool;

    /// Supported zoom range as `(min, max)`; view zoom is clamped to it.
    fn zoom_range(&self) -> (f64, f64);

    /// Jump the view to a center and zoom.
    fn set_view(&mut self, center: Coordinate, zoom: f64);

    fn center(&self) -> Coordinate;

    fn zoom(&self) -> f64;

    /// Place a marker. `id` is unique on the surface; placing an id that is
    /// already present is a host error and implementations may log it.
    fn place_marker(&mut self, id: &str, coordinate: Coordinate, style: MarkerStyle);

    /// Remove a marker; removing an absent id is a no-op.
    fn remove_marker(&mut self, id: &str);
}

/// Degraded fallback surface for hosts without an interactive map.
///
/// Holds the view state and marker set so the rest of the engine behaves
/// normally, but renders nothing and produces no gestures.
#[derive(Debug)]
pub struct StaticSurface {
    center: Coordinate,
    zoom: f64,
    markers: HashMap<String, (Coordinate, MarkerStyle)>,
}

/// OpenStreetMap tile zoom range, used by the fallback surface.
const OSM_ZOOM_RANGE: (f64, f64) = (0.0, 19.0);

impl StaticSurface {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            markers: HashMap::new(),
        }
    }

    /// Ids of all markers currently placed, for host display.
    pub fn marker_ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    pub fn marker(&self, id: &str) -> Option<(Coordinate, MarkerStyle)> {
        self.markers.get(id).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl MapSurface for StaticSurface {
    fn is_ready(&self) -> bool {
        true
    }

    fn zoom_range(&self) -> (f64, f64) {
        OSM_ZOOM_RANGE
    }

    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        log::debug!(
            "static surface view -> {:.4},{:.4} z{zoom:.1}",
            center.lat,
            center.lon
        );
        self.center = center;
        self.zoom = zoom.clamp(OSM_ZOOM_RANGE.0, OSM_ZOOM_RANGE.1);
    }

    fn center(&self) -> Coordinate {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn place_marker(&mut self, id: &str, coordinate: Coordinate, style: MarkerStyle) {
        if self
            .markers
            .insert(id.to_string(), (coordinate, style))
            .is_some()
        {
            log::warn!("marker {id} placed twice without removal");
        }
    }

    fn remove_marker(&mut self, id: &str) {
        self.markers.remove(id);
    }
}
