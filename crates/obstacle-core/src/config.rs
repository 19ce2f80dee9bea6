//! Configuration types for the obstacle registry
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstaclesConfig {
    /// Where the collection is persisted
    #[serde(default)]
    pub store: StoreConfig,

    /// How positions are acquired
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Where accepted photos are copied
    #[serde(default)]
    pub media: MediaConfig,

    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl ObstaclesConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.geolocation.validate()?;
        self.media.validate()?;
        self.registry.validate()?;
        Ok(())
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// File-backed key-value store
    File {
        /// Data directory
        dir: PathBuf,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { dir } if dir.as_os_str().is_empty() => {
                Err(crate::Error::config("Store directory cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreConfig::File { .. } => "file",
            StoreConfig::Memory => "memory",
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            dir: PathBuf::from("obstacles-data"),
        }
    }
}

/// Geolocation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeolocationConfig {
    /// Look the position up over HTTP
    Http {
        /// Endpoint returning a JSON body with latitude and longitude
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Always report the same position
    Fixed {
        /// Latitude in decimal degrees
        latitude: f64,
        /// Longitude in decimal degrees
        longitude: f64,
    },

    /// No location source; every obstacle gets the sentinel position
    #[default]
    Disabled,
}

impl GeolocationConfig {
    /// Validate the geolocation configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GeolocationConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Geolocation URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "Geolocation URL must use HTTP or HTTPS scheme. Got: {url}"
                    )));
                }
                if *timeout_secs == 0 || *timeout_secs > 120 {
                    return Err(crate::Error::config(
                        "Geolocation timeout must be between 1 and 120 seconds",
                    ));
                }
                Ok(())
            }
            GeolocationConfig::Fixed {
                latitude,
                longitude,
            } => {
                let position = crate::model::Coordinates::new(*latitude, *longitude);
                if !position.is_valid() {
                    return Err(crate::Error::config(format!(
                        "Fixed position out of range: {latitude}, {longitude}"
                    )));
                }
                Ok(())
            }
            GeolocationConfig::Disabled => Ok(()),
        }
    }

    /// Get the geolocation type name
    pub fn type_name(&self) -> &'static str {
        match self {
            GeolocationConfig::Http { .. } => "http",
            GeolocationConfig::Fixed { .. } => "fixed",
            GeolocationConfig::Disabled => "disabled",
        }
    }
}

/// Photo storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory accepted photos are copied into
    pub dir: PathBuf,
}

impl MediaConfig {
    /// Validate the media configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.dir.as_os_str().is_empty() {
            return Err(crate::Error::config("Media directory cannot be empty"));
        }
        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("obstacles-data/media"),
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Capacity of the registry event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 64 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "Event channel capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    64
}
