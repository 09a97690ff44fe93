//! Free-text place resolution: debounced autocomplete and one-shot geocoding
//!
//! The resolver owns the keystroke debounce and the request generation
//! counter. Completions are delivered to the caller tagged with their
//! generation; the session applies a suggestion list only when its generation
//! is still the latest, which guards both the timer race and out-of-order
//! network completions.

pub mod nominatim;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MapConfig;
use crate::error::GeocodeError;
use crate::geo::Coordinate;
use crate::timer::Debounce;

/// A raw record from the geocoding service. Nominatim delivers coordinates
/// as strings; they are validated at this boundary.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub label: String,
    pub lat: String,
    pub lon: String,
}

impl GeocodedPlace {
    /// Parse the coordinate pair, rejecting non-numeric or non-finite values.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat: f64 = self.lat.parse().ok()?;
        let lon: f64 = self.lon.parse().ok()?;
        (lat.is_finite() && lon.is_finite()).then(|| Coordinate::new(lat, lon))
    }
}

/// One entry of the autocomplete dropdown. No identity beyond its position;
/// the whole list is replaced on every applied lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub coordinate: Coordinate,
}

/// Boundary to the external text-geocoding service.
pub trait Geocoder: Send + Sync {
    /// Look up `query`, returning at most `limit` candidate places.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<GeocodedPlace>, GeocodeError>> + Send;
}

/// Resolve a query to a single coordinate. `Ok(None)` covers both an empty
/// response and a top result with unusable coordinates.
pub async fn resolve_one<G: Geocoder>(
    geocoder: &G,
    query: &str,
) -> Result<Option<Coordinate>, GeocodeError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }
    let places = geocoder.search(query, 1).await?;
    Ok(places.first().and_then(GeocodedPlace::coordinate))
}

/// Debounced autocomplete pipeline over a shared [`Geocoder`].
pub struct PlaceResolver<G> {
    geocoder: Arc<G>,
    debounce: Debounce,
    debounce_window: Duration,
    generation: u64,
    min_query_len: usize,
    suggest_limit: usize,
}

impl<G: Geocoder + 'static> PlaceResolver<G> {
    pub fn new(geocoder: Arc<G>, config: &MapConfig) -> Self {
        Self {
            geocoder,
            debounce: Debounce::new(),
            debounce_window: config.suggest_debounce(),
            generation: 0,
            min_query_len: config.min_query_len,
            suggest_limit: config.suggest_limit,
        }
    }

    /// Handle to the shared geocoder, for spawning one-shot lookups.
    pub fn geocoder(&self) -> Arc<G> {
        Arc::clone(&self.geocoder)
    }

    /// Schedule a suggestion lookup for `query` after the debounce window,
    /// replacing any pending one. Returns the request generation, or `None`
    /// when the query is too short. A too-short query makes no network call
    /// and invalidates everything in flight, including completions already
    /// queued for delivery.
    ///
    /// `deliver` runs on the tokio runtime when the lookup completes; lookup
    /// failures degrade to an empty list (logged, never propagated).
    pub fn schedule_suggest<F>(&mut self, query: &str, deliver: F) -> Option<u64>
    where
        F: FnOnce(u64, Vec<Suggestion>) + Send + 'static,
    {
        let query = query.trim().to_string();
        if query.chars().count() < self.min_query_len {
            self.cancel();
            return None;
        }

        self.generation += 1;
        let generation = self.generation;
        let geocoder = Arc::clone(&self.geocoder);
        let limit = self.suggest_limit;

        self.debounce.schedule(self.debounce_window, async move {
            let suggestions = match geocoder.search(&query, limit).await {
                Ok(places) => places
                    .into_iter()
                    .filter_map(|p| {
                        let coordinate = p.coordinate()?;
                        Some(Suggestion {
                            label: p.label,
                            coordinate,
                        })
                    })
                    .collect(),
                Err(err) => {
                    log::warn!("suggestion lookup for {query:?} failed: {err}");
                    Vec::new()
                }
            };
            deliver(generation, suggestions);
        });

        Some(generation)
    }

    /// Whether `generation` is still the most recently issued request.
    /// Completions failing this check are stale and must be discarded.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Cancel any pending lookup and invalidate in-flight completions.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep as advance;

    /// Geocoder returning canned places and counting calls.
    struct MockGeocoder {
        places: Vec<GeocodedPlace>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockGeocoder {
        fn with_places(places: Vec<GeocodedPlace>) -> Self {
            Self {
                places,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl Geocoder for MockGeocoder {
        async fn search(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<GeocodedPlace>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::Malformed("mock failure".into()));
            }
            Ok(self.places.iter().take(limit).cloned().collect())
        }
    }

    fn place(label: &str, lat: &str, lon: &str) -> GeocodedPlace {
        GeocodedPlace {
            label: label.to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn coordinate_parsing_rejects_garbage() {
        assert!(place("ok", "14.5", "121.0").coordinate().is_some());
        assert!(place("bad", "abc", "121.0").coordinate().is_none());
        assert!(place("bad", "14.5", "").coordinate().is_none());
        assert!(place("bad", "inf", "121.0").coordinate().is_none());
        assert!(place("bad", "NaN", "121.0").coordinate().is_none());
    }

    #[tokio::test]
    async fn resolve_one_takes_first_usable_result() {
        let geocoder = MockGeocoder::with_places(vec![place("Manila", "14.5995", "120.9842")]);
        let found = resolve_one(&geocoder, "manila").await.unwrap();
        assert_eq!(found, Some(Coordinate::new(14.5995, 120.9842)));
    }

    #[tokio::test]
    async fn resolve_one_not_found_on_empty_or_bad_response() {
        let geocoder = MockGeocoder::with_places(vec![]);
        assert_eq!(resolve_one(&geocoder, "nowhere").await.unwrap(), None);

        let geocoder = MockGeocoder::with_places(vec![place("broken", "x", "y")]);
        assert_eq!(resolve_one(&geocoder, "broken").await.unwrap(), None);

        // Blank queries never hit the network
        let geocoder = MockGeocoder::with_places(vec![]);
        assert_eq!(resolve_one(&geocoder, "   ").await.unwrap(), None);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_makes_no_network_call() {
        let geocoder = Arc::new(MockGeocoder::with_places(vec![place(
            "Antipolo",
            "14.6",
            "121.2",
        )]));
        let mut resolver = PlaceResolver::new(Arc::clone(&geocoder), &MapConfig::default());

        assert!(resolver.schedule_suggest("a", |_, _| {}).is_none());
        advance(Duration::from_secs(1)).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_collapse_to_one_request() {
        let geocoder = Arc::new(MockGeocoder::with_places(vec![place(
            "Quezon City",
            "14.676",
            "121.0437",
        )]));
        let mut resolver = PlaceResolver::new(Arc::clone(&geocoder), &MapConfig::default());

        let delivered: Arc<Mutex<Vec<(u64, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        for query in ["qu", "que", "quez", "quezo"] {
            let sink = Arc::clone(&delivered);
            resolver.schedule_suggest(query, move |generation, list| {
                sink.lock().unwrap().push((generation, list.len()));
            });
            advance(Duration::from_millis(100)).await;
        }

        advance(Duration::from_millis(400)).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);

        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        let (generation, count) = delivered[0];
        assert!(resolver.is_current(generation));
        assert_eq!(count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn results_arrive_in_service_order() {
        let geocoder = Arc::new(MockGeocoder::with_places(vec![
            place("A", "1.0", "1.0"),
            place("B", "2.0", "2.0"),
            place("C", "3.0", "3.0"),
        ]));
        let mut resolver = PlaceResolver::new(Arc::clone(&geocoder), &MapConfig::default());

        let delivered: Arc<Mutex<Vec<Suggestion>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        resolver.schedule_suggest("ab", move |_, list| {
            *sink.lock().unwrap() = list;
        });
        advance(Duration::from_millis(400)).await;

        let labels: Vec<String> = delivered
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.label.clone())
            .collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_degrades_to_empty_list() {
        let mut geocoder = MockGeocoder::with_places(vec![place("X", "1.0", "1.0")]);
        geocoder.fail = true;
        let mut resolver = PlaceResolver::new(Arc::new(geocoder), &MapConfig::default());

        let delivered: Arc<Mutex<Option<Vec<Suggestion>>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&delivered);
        resolver.schedule_suggest("ab", move |_, list| {
            *sink.lock().unwrap() = Some(list);
        });
        advance(Duration::from_millis(400)).await;

        assert_eq!(delivered.lock().unwrap().as_deref(), Some(&[][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn shortening_query_invalidates_completed_lookup() {
        let geocoder = Arc::new(MockGeocoder::with_places(vec![place(
            "Cebu City",
            "10.3157",
            "123.8854",
        )]));
        let mut resolver = PlaceResolver::new(Arc::clone(&geocoder), &MapConfig::default());

        let generation = resolver.schedule_suggest("ce", |_, _| {}).unwrap();
        advance(Duration::from_millis(400)).await;
        // The lookup already completed and its delivery may be queued
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert!(resolver.is_current(generation));

        // Backspacing below the minimum length must stale that delivery
        assert!(resolver.schedule_suggest("c", |_, _| {}).is_none());
        assert!(!resolver.is_current(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_invalidates_in_flight_generations() {
        let geocoder = Arc::new(MockGeocoder::with_places(vec![]));
        let mut resolver = PlaceResolver::new(geocoder, &MapConfig::default());

        let generation = resolver.schedule_suggest("makati", |_, _| {}).unwrap();
        assert!(resolver.is_current(generation));

        resolver.cancel();
        assert!(!resolver.is_current(generation));
    }
}
