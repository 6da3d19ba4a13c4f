use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

use crate::event::{Coordinate, Zoom};
use crate::{
    DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_GEOCODE_TIMEOUT_MS,
    DEFAULT_GEOLOCATION_TIMEOUT_MS, DEFAULT_MAP_ZOOM, MAX_REQUEST_TIMEOUT_MS,
    MIN_REQUEST_TIMEOUT_MS,
};

// --- API key wrapper: redacts Debug, zeroizes on Drop ---

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map api key is missing or blank")]
    MissingApiKey,

    #[error("{field} timeout {value} ms is outside [{min}, {max}]")]
    TimeoutOutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

const fn default_center() -> Coordinate {
    Coordinate::new_unchecked(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG)
}

const fn default_zoom() -> Zoom {
    Zoom::new_unchecked(DEFAULT_MAP_ZOOM)
}

const fn default_geolocation_timeout_ms() -> u64 {
    DEFAULT_GEOLOCATION_TIMEOUT_MS
}

const fn default_geocode_timeout_ms() -> u64 {
    DEFAULT_GEOCODE_TIMEOUT_MS
}

/// Runtime configuration handed over by the shell at startup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_key: ApiKey,
    #[serde(default = "default_center")]
    pub default_center: Coordinate,
    #[serde(default = "default_zoom")]
    pub default_zoom: Zoom,
    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,
    #[serde(default = "default_geocode_timeout_ms")]
    pub geocode_timeout_ms: u64,
}

impl Config {
    /// Config with the built-in defaults and the given key. Not validated.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(api_key),
            default_center: default_center(),
            default_zoom: default_zoom(),
            geolocation_timeout_ms: DEFAULT_GEOLOCATION_TIMEOUT_MS,
            geocode_timeout_ms: DEFAULT_GEOCODE_TIMEOUT_MS,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_blank() {
            return Err(ConfigError::MissingApiKey);
        }
        Self::check_timeout("geolocation", self.geolocation_timeout_ms)?;
        Self::check_timeout("geocode", self.geocode_timeout_ms)?;
        Ok(())
    }

    fn check_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
        if (MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::TimeoutOutOfRange {
                field,
                value,
                min: MIN_REQUEST_TIMEOUT_MS,
                max: MAX_REQUEST_TIMEOUT_MS,
            })
        }
    }
}

/// Timeouts and map defaults in effect before the shell sends a config.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_key: Option<ApiKey>,
    pub default_center: Coordinate,
    pub default_zoom: Zoom,
    pub geolocation_timeout_ms: u64,
    pub geocode_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            default_center: default_center(),
            default_zoom: default_zoom(),
            geolocation_timeout_ms: DEFAULT_GEOLOCATION_TIMEOUT_MS,
            geocode_timeout_ms: DEFAULT_GEOCODE_TIMEOUT_MS,
        }
    }
}

impl From<Config> for Settings {
    fn from(config: Config) -> Self {
        Self {
            api_key: Some(config.api_key),
            default_center: config.default_center,
            default_zoom: config.default_zoom,
            geolocation_timeout_ms: config.geolocation_timeout_ms,
            geocode_timeout_ms: config.geocode_timeout_ms,
        }
    }
}
