//! Error types for the collaborator boundaries

use thiserror::Error;

/// Failure talking to the geocoding service.
///
/// Everything here is non-fatal: the session degrades to an empty suggestion
/// list or a "not found" notice and keeps the last-known-good state.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or service failure
    #[error("geocoding transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with something we could not interpret
    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Failure obtaining the user's location.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user denied the location request
    #[error("location permission denied")]
    Denied,
    /// No location provider is available on this host
    #[error("location unavailable")]
    Unavailable,
}

/// Failure loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no config directory on this host")]
    NoConfigDir,
}
