//! Viewer configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use metro_transit::{Coordinate, MergeOptions, TransitError, WalkingModel};
use serde::{Deserialize, Serialize};

/// Midpoint between Ahmedabad and Gandhinagar, used when no location is known
pub const DEFAULT_FALLBACK_LOCATION: Coordinate = Coordinate::new(23.1000, 72.5800);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] TransitError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Earth radius and walking speed behind every distance and time estimate
    pub walking: WalkingModel,
    /// Location used when neither search nor geolocation has produced one
    pub fallback_location: Coordinate,
    pub merge: MergeOptions,
    pub search: SearchConfig,
    pub geocoder: GeocoderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            walking: WalkingModel::default(),
            fallback_location: DEFAULT_FALLBACK_LOCATION,
            merge: MergeOptions::default(),
            search: SearchConfig::default(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would turn every distance or walking time into nonsense
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.walking.validate()?;
        self.merge.validate()?;
        if !self.fallback_location.is_finite() {
            return Err(TransitError::InvalidData(format!(
                "fallback location must be finite, got {:?}",
                self.fallback_location
            ))
            .into());
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup is sent
    pub debounce_ms: u64,
    /// Queries shorter than this (after trimming) are not sent
    pub min_query_chars: usize,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    /// Appended to every query to bias results towards the served city
    pub locality: String,
    pub limit: u32,
    /// Nominatim's usage policy requires an identifying user agent
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            locality: "Ahmedabad, Gujarat, India".to_string(),
            limit: 5,
            user_agent: concat!("metro-core/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}
