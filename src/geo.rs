//! Geographic primitives: coordinates, great-circle distance, area tags

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in signed degrees.
///
/// Equality is exact; use [`Coordinate::within`] when a tolerance is needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90
    pub lat: f64,
    /// Longitude in degrees, -180 to 180
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are within `epsilon` degrees of `other`.
    pub fn within(&self, other: Coordinate, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lon - other.lon).abs() <= epsilon
    }
}

/// Great-circle distance between two coordinates in kilometers (haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    // atan2 keeps the result finite even when rounding pushes h past 1.0
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_KM * c
}

/// Closed set of catalog areas, plus the `Unscoped` sentinel ("Nearby" mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaTag {
    /// No area restriction; filter by radius only
    #[default]
    #[serde(rename = "Nearby")]
    Unscoped,
    #[serde(rename = "Tondo Manila")]
    TondoManila,
    #[serde(rename = "Quezon City")]
    QuezonCity,
    Laguna,
    Boracay,
    Cebu,
    Bataan,
}

/// Priority-ordered query patterns. First match wins, not longest match.
const QUERY_PATTERNS: &[(&str, AreaTag)] = &[
    ("tondo", AreaTag::TondoManila),
    ("quezon", AreaTag::QuezonCity),
    ("laguna", AreaTag::Laguna),
    ("boracay", AreaTag::Boracay),
    ("aklan", AreaTag::Boracay),
    ("cebu", AreaTag::Cebu),
    ("bataan", AreaTag::Bataan),
];

impl AreaTag {
    /// All tags a host UI can offer as filter chips, sentinel first.
    pub const ALL: &'static [AreaTag] = &[
        AreaTag::Unscoped,
        AreaTag::TondoManila,
        AreaTag::QuezonCity,
        AreaTag::Laguna,
        AreaTag::Boracay,
        AreaTag::Cebu,
        AreaTag::Bataan,
    ];

    /// Infer an area filter from free search text, so "Tondo apartment"
    /// scopes the catalog to Tondo Manila. Case-insensitive substring
    /// matching over the ordered pattern list; falls back to `Unscoped`.
    pub fn for_query(text: &str) -> AreaTag {
        let lower = text.trim().to_lowercase();
        QUERY_PATTERNS
            .iter()
            .find(|(pat, _)| lower.contains(pat))
            .map(|&(_, tag)| tag)
            .unwrap_or(AreaTag::Unscoped)
    }

    /// Display label matching the catalog's area strings.
    pub fn label(&self) -> &'static str {
        match self {
            AreaTag::Unscoped => "Nearby",
            AreaTag::TondoManila => "Tondo Manila",
            AreaTag::QuezonCity => "Quezon City",
            AreaTag::Laguna => "Laguna",
            AreaTag::Boracay => "Boracay",
            AreaTag::Cebu => "Cebu",
            AreaTag::Bataan => "Bataan",
        }
    }
}
