//! Configuration for the map engine, persisted as JSON

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::Coordinate;

/// Tunable behavior of the map screen, persisted between sessions.
///
/// Defaults match the reference behavior; hosts can override individual
/// fields in the config file and leave the rest out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Radius cut for the catalog filter, in kilometers
    pub radius_km: f64,
    /// Quiet window between a keystroke and the autocomplete request
    pub suggest_debounce_ms: u64,
    /// Quiet period after a move-end before the viewport settles
    pub move_quiet_period_ms: u64,
    /// Programmatic center changes below this many degrees are no-ops
    pub center_tolerance_deg: f64,
    /// Programmatic zoom changes below this are no-ops
    pub zoom_tolerance: f64,
    /// Where the viewport starts before any search or location fix
    pub default_center: Coordinate,
    /// Zoom used at startup and after a location fix
    pub default_zoom: f64,
    /// Zoom used after a successful search or suggestion pick
    pub search_zoom: f64,
    /// Queries shorter than this never reach the geocoding service
    pub min_query_len: usize,
    /// Result count requested for autocomplete lookups
    pub suggest_limit: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            radius_km: 20.0,
            suggest_debounce_ms: 350,
            move_quiet_period_ms: 500,
            center_tolerance_deg: 0.0001,
            zoom_tolerance: 0.1,
            // Manila
            default_center: Coordinate::new(14.5995, 120.9842),
            default_zoom: 13.0,
            search_zoom: 12.0,
            min_query_len: 2,
            suggest_limit: 8,
        }
    }
}

impl MapConfig {
    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }

    pub fn move_quiet_period(&self) -> Duration {
        Duration::from_millis(self.move_quiet_period_ms)
    }

    /// Default config file location under the host's config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("casamap").join("config.json"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults (with a logged warning) on any failure. A missing file is
    /// normal on first run and only logged at debug level.
    pub fn load() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("no config directory, using defaults: {err}");
                return Self::default();
            }
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("error loading config, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save configuration to the default location, logging on failure.
    pub fn save(&self) {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                log::error!("could not resolve config path: {err}");
                return;
            }
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("failed to save config to {}: {err}", path.display());
        }
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = MapConfig::default();
        assert_eq!(config.radius_km, 20.0);
        assert_eq!(config.suggest_debounce(), Duration::from_millis(350));
        assert_eq!(config.move_quiet_period(), Duration::from_millis(500));
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.suggest_limit, 8);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: MapConfig = serde_json::from_str(r#"{ "radius_km": 5.0 }"#).unwrap();
        assert_eq!(config.radius_km, 5.0);
        assert_eq!(config.suggest_debounce_ms, 350);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = MapConfig::default();
        config.radius_km = 12.5;
        config.search_zoom = 11.0;
        config.save_to(&path).unwrap();

        let loaded = MapConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            MapConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
