//! User-location collaborator boundary

use std::future::Future;

use crate::error::LocationError;
use crate::geo::Coordinate;

/// On-demand coordinate provider. One request, one response; continuous
/// position streams are out of scope for this engine.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Provider for hosts without a positioning service. Every request fails
/// with `Unavailable`, which the session treats as "leave the viewport
/// alone and place no user marker".
pub struct NoLocation;

impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unavailable)
    }
}

/// Provider returning a fixed coordinate, for hosts that know their position
/// out of band (kiosk installs) and for tests.
pub struct FixedLocation(pub Coordinate);

impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_location_is_always_unavailable() {
        assert!(matches!(
            NoLocation.current_location().await,
            Err(LocationError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn fixed_location_returns_its_coordinate() {
        let provider = FixedLocation(Coordinate::new(14.6, 121.0));
        assert_eq!(
            provider.current_location().await.unwrap(),
            Coordinate::new(14.6, 121.0)
        );
    }
}
