//! Marker reconciliation between the filtered results and the map surface

use std::collections::HashMap;

use crate::catalog::FilteredResult;
use crate::geo::Coordinate;
use crate::selection::SelectionState;
use crate::surface::{MapSurface, MarkerStyle};

/// Surface id reserved for the single user-location marker. Catalog ids are
/// plain record keys and never carry this prefix.
const USER_MARKER_ID: &str = "\u{1}user-location";

/// Single writer for the surface's marker layer.
///
/// Keeps its own record of what is live on the surface and applies the
/// minimal diff against the desired set on every sync: markers whose id left
/// the filtered set are removed, new ids are placed, and a marker whose
/// style or position changed is removed and re-placed (surface markers are
/// immutable once placed).
#[derive(Debug, Default)]
pub struct MarkerSynchronizer {
    live: HashMap<String, (Coordinate, MarkerStyle)>,
    user_marker: Option<Coordinate>,
}

impl MarkerSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the surface against the desired state.
    ///
    /// If the surface is not ready yet the call is a no-op. Bookkeeping is
    /// not advanced, so the next sync retries the full diff.
    pub fn sync(
        &mut self,
        surface: &mut dyn MapSurface,
        results: &[FilteredResult],
        selection: &SelectionState,
        user_location: Option<Coordinate>,
    ) {
        if !surface.is_ready() {
            log::debug!("surface not ready, deferring marker sync");
            return;
        }

        let desired: HashMap<&str, (Coordinate, MarkerStyle)> = results
            .iter()
            .map(|r| {
                let style = if selection.is_selected(&r.point.id) {
                    MarkerStyle::Selected
                } else {
                    MarkerStyle::Normal
                };
                (r.point.id.as_str(), (r.point.coordinate, style))
            })
            .collect();

        // Drop markers whose id left the desired set
        let stale: Vec<String> = self
            .live
            .keys()
            .filter(|id| !desired.contains_key(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            surface.remove_marker(&id);
            self.live.remove(&id);
        }

        // Place new markers and re-place changed ones
        for (id, &(coordinate, style)) in &desired {
            match self.live.get(*id) {
                Some(&current) if current == (coordinate, style) => {}
                Some(_) => {
                    surface.remove_marker(id);
                    surface.place_marker(id, coordinate, style);
                    self.live.insert(id.to_string(), (coordinate, style));
                }
                None => {
                    surface.place_marker(id, coordinate, style);
                    self.live.insert(id.to_string(), (coordinate, style));
                }
            }
        }

        self.sync_user_marker(surface, user_location);
    }

    /// The user-location marker is keyed separately from catalog markers and
    /// recreated (never mutated) whenever the coordinate changes.
    fn sync_user_marker(&mut self, surface: &mut dyn MapSurface, user_location: Option<Coordinate>) {
        if self.user_marker == user_location {
            return;
        }
        if self.user_marker.is_some() {
            surface.remove_marker(USER_MARKER_ID);
        }
        if let Some(coordinate) = user_location {
            surface.place_marker(USER_MARKER_ID, coordinate, MarkerStyle::UserLocation);
        }
        self.user_marker = user_location;
    }

    /// Number of catalog markers currently live on the surface.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Point;
    use crate::geo::AreaTag;
    use crate::selection::PixelPoint;
    use crate::surface::StaticSurface;

    fn result(id: &str, lat: f64, lon: f64, distance_km: f64) -> FilteredResult {
        FilteredResult {
            point: Point {
                id: id.to_string(),
                coordinate: Coordinate::new(lat, lon),
                area: AreaTag::QuezonCity,
                title: id.to_string(),
                address: String::new(),
                photo_url: None,
                availability: None,
                contact_name: None,
                contact_number: None,
            },
            distance_km,
        }
    }

    /// Surface that reports not-ready until flipped, recording all calls.
    struct GatedSurface {
        ready: bool,
        inner: StaticSurface,
    }

    impl MapSurface for GatedSurface {
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn zoom_range(&self) -> (f64, f64) {
            self.inner.zoom_range()
        }
        fn set_view(&mut self, center: Coordinate, zoom: f64) {
            self.inner.set_view(center, zoom);
        }
        fn center(&self) -> Coordinate {
            self.inner.center()
        }
        fn zoom(&self) -> f64 {
            self.inner.zoom()
        }
        fn place_marker(&mut self, id: &str, coordinate: Coordinate, style: MarkerStyle) {
            self.inner.place_marker(id, coordinate, style);
        }
        fn remove_marker(&mut self, id: &str) {
            self.inner.remove_marker(id);
        }
    }

    #[test]
    fn adds_and_removes_markers() {
        let mut surface = StaticSurface::new(Coordinate::new(0.0, 0.0), 13.0);
        let mut sync = MarkerSynchronizer::new();
        let selection = SelectionState::default();

        let results = vec![result("a", 1.0, 1.0, 0.5), result("b", 1.1, 1.0, 1.5)];
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.marker_count(), 2);

        let results = vec![result("b", 1.1, 1.0, 1.5), result("c", 1.2, 1.0, 2.5)];
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.marker_count(), 2);
        assert!(surface.marker("a").is_none());
        assert!(surface.marker("c").is_some());
    }

    #[test]
    fn selected_marker_gets_distinct_style() {
        let mut surface = StaticSurface::new(Coordinate::new(0.0, 0.0), 13.0);
        let mut sync = MarkerSynchronizer::new();
        let mut selection = SelectionState::default();

        let results = vec![result("a", 1.0, 1.0, 0.5), result("b", 1.1, 1.0, 1.5)];
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.marker("a").unwrap().1, MarkerStyle::Normal);

        selection.select("a", PixelPoint::new(10.0, 20.0));
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.marker("a").unwrap().1, MarkerStyle::Selected);
        assert_eq!(surface.marker("b").unwrap().1, MarkerStyle::Normal);

        // Selection moves: old pin back to normal, new pin highlighted
        selection.select("b", PixelPoint::new(30.0, 40.0));
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.marker("a").unwrap().1, MarkerStyle::Normal);
        assert_eq!(surface.marker("b").unwrap().1, MarkerStyle::Selected);
    }

    #[test]
    fn user_marker_recreated_on_location_change() {
        let mut surface = StaticSurface::new(Coordinate::new(0.0, 0.0), 13.0);
        let mut sync = MarkerSynchronizer::new();
        let selection = SelectionState::default();

        sync.sync(&mut surface, &[], &selection, Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(
            surface.marker(USER_MARKER_ID).unwrap().0,
            Coordinate::new(1.0, 1.0)
        );

        sync.sync(&mut surface, &[], &selection, Some(Coordinate::new(2.0, 2.0)));
        assert_eq!(
            surface.marker(USER_MARKER_ID).unwrap().0,
            Coordinate::new(2.0, 2.0)
        );
        assert_eq!(surface.marker_count(), 1);

        sync.sync(&mut surface, &[], &selection, None);
        assert!(surface.marker(USER_MARKER_ID).is_none());
    }

    #[test]
    fn not_ready_surface_defers_and_retries() {
        let mut surface = GatedSurface {
            ready: false,
            inner: StaticSurface::new(Coordinate::new(0.0, 0.0), 13.0),
        };
        let mut sync = MarkerSynchronizer::new();
        let selection = SelectionState::default();
        let results = vec![result("a", 1.0, 1.0, 0.5)];

        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.inner.marker_count(), 0);
        assert_eq!(sync.live_count(), 0);

        surface.ready = true;
        sync.sync(&mut surface, &results, &selection, None);
        assert_eq!(surface.inner.marker_count(), 1);
        assert_eq!(sync.live_count(), 1);
    }
}
