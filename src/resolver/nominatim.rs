//! OpenStreetMap Nominatim backend for the geocoder boundary

use serde::Deserialize;

use crate::error::GeocodeError;

use super::{GeocodedPlace, Geocoder};

const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying User-Agent.
const USER_AGENT: &str = "casamap/0.3 (rental map)";

/// One record of a Nominatim `format=json` search response. Coordinates come
/// back as strings and are validated downstream.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim instance.
///
/// The service is best-effort and rate-limited; each user action gets a
/// single attempt with no retry, and failures surface as [`GeocodeError`]
/// for the session to degrade on.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    /// Client against the public OSM instance.
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Client against a custom instance (self-hosted Nominatim, or a test
    /// server).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        let url = format!("{}/search", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("limit", &limit.to_string()),
                ("q", query),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let places = parse_places(&body)?;
        log::debug!("nominatim returned {} places for {query:?}", places.len());
        Ok(places)
    }
}

/// Decode a `format=json` response body. A body that is not a JSON place
/// array (an HTML error page from the rate limiter, for instance) is a
/// malformed response, not a transport failure.
fn parse_places(body: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Malformed(err.to_string()))?;
    Ok(places
        .into_iter()
        .map(|p| GeocodedPlace {
            label: p.display_name,
            lat: p.lat,
            lon: p.lon,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_record_deserializes() {
        let json = r#"[{
            "display_name": "Quezon City, Metro Manila, Philippines",
            "lat": "14.6509905",
            "lon": "121.0486254",
            "importance": 0.72
        }]"#;
        let places = parse_places(json).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, "14.6509905");
        assert!(places[0].label.starts_with("Quezon City"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            parse_places("<html>Bandwidth limit exceeded</html>"),
            Err(GeocodeError::Malformed(_))
        ));
        assert!(matches!(
            parse_places(r#"{"error": "Unable to geocode"}"#),
            Err(GeocodeError::Malformed(_))
        ));
    }

    #[test]
    fn endpoint_trailing_slash_normalized() {
        let geocoder = NominatimGeocoder::with_endpoint("http://localhost:8080/").unwrap();
        assert_eq!(geocoder.endpoint, "http://localhost:8080");
    }
}
