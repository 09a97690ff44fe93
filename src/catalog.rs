//! Catalog records and the radius/area filter

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::{AreaTag, Coordinate, distance_km};

/// One point-of-interest record, supplied by the catalog collaborator.
///
/// The core only interprets `id`, `coordinate`, and `area`; the remaining
/// fields are display metadata passed through to the host UI untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique, stable identifier
    pub id: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub area: AreaTag,
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Availability date as supplied upstream, e.g. "2026-09-01"
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
}

/// A catalog point annotated with its distance from the current center.
///
/// Derived data, never persisted: recomputed from the catalog and viewport
/// whenever either changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResult {
    pub point: Point,
    pub distance_km: f64,
}

/// Rank catalog points by distance from `center`, keeping those within
/// `radius_km`. An `Unscoped` area keeps every in-radius point; any other
/// tag additionally requires an exact area match.
///
/// Output is sorted ascending by distance; ties keep catalog order.
pub fn filter(
    catalog: &[Point],
    center: Coordinate,
    area: AreaTag,
    radius_km: f64,
) -> Vec<FilteredResult> {
    let mut results: Vec<FilteredResult> = catalog
        .iter()
        .filter(|p| area == AreaTag::Unscoped || p.area == area)
        .map(|p| FilteredResult {
            point: p.clone(),
            distance_km: distance_km(center, p.coordinate),
        })
        .filter(|r| r.distance_km <= radius_km)
        .collect();

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    results
}

/// Unscoped filtering narrowed by free text: keeps in-radius points whose
/// title, address, or area label contains `query` (case-insensitive). An
/// empty query matches everything.
pub fn filter_text(
    catalog: &[Point],
    center: Coordinate,
    query: &str,
    radius_km: f64,
) -> Vec<FilteredResult> {
    let needle = query.trim().to_lowercase();
    let mut results: Vec<FilteredResult> = catalog
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.title.to_lowercase().contains(&needle)
                || p.address.to_lowercase().contains(&needle)
                || p.area.label().to_lowercase().contains(&needle)
        })
        .map(|p| FilteredResult {
            point: p.clone(),
            distance_km: distance_km(center, p.coordinate),
        })
        .filter(|r| r.distance_km <= radius_km)
        .collect();

    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    results
}

/// Load a catalog from a JSON array file.
pub fn load(path: &Path) -> Result<Vec<Point>, crate::error::ConfigError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
