// # HTTP Geolocation
//
// Looks the device position up from an HTTP endpoint returning JSON.
//
// ## Purpose
//
// This is a **coarse fallback** for machines without a location sensor
// (laptops, CI). Accuracy is whatever the endpoint provides, typically
// city-level for IP geolocation services.
//
// ## Response Format
//
// Any JSON object with a latitude and longitude at the top level:
//
// ```json
// { "latitude": 48.85, "longitude": 2.35 }
// { "lat": 48.85, "lon": 2.35 }
// { "lat": 48.85, "lng": 2.35 }
// ```

use obstacle_core::error::ProviderError;
use obstacle_core::model::Coordinates;
use obstacle_core::traits::permissions::ensure_granted;
use obstacle_core::traits::{GeolocationProvider, Permission, PermissionBroker};

use std::sync::Arc;
use std::time::Duration;

/// Default request timeout for position lookups
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lon", "lng"];

/// HTTP-based geolocation provider
pub struct HttpGeolocation {
    /// URL to fetch the position from
    url: String,

    /// Location permission gate
    permissions: Arc<dyn PermissionBroker>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpGeolocation {
    /// Create a provider with the default timeout
    pub fn new(url: impl Into<String>, permissions: Arc<dyn PermissionBroker>) -> Self {
        Self::with_timeout(url, permissions, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a custom timeout
    pub fn with_timeout(
        url: impl Into<String>,
        permissions: Arc<dyn PermissionBroker>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            permissions,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch the position from the endpoint
    async fn fetch_position(&self) -> Result<Coordinates, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::acquisition(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::acquisition(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::acquisition(format!("Failed to read response: {}", e)))?;

        parse_position(&body)
    }
}

#[async_trait::async_trait]
impl GeolocationProvider for HttpGeolocation {
    async fn current_position(&self) -> Result<Coordinates, ProviderError> {
        ensure_granted(self.permissions.as_ref(), Permission::Location).await?;

        let position = self.fetch_position().await?;
        tracing::debug!("Position from {}: {}", self.url, position);
        Ok(position)
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

/// Extract a position from a JSON response body
pub fn parse_position(body: &str) -> Result<Coordinates, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body.trim())
        .map_err(|e| ProviderError::acquisition(format!("Invalid JSON response: {}", e)))?;

    let latitude = find_number(&value, LATITUDE_KEYS)
        .ok_or_else(|| ProviderError::acquisition("Response has no latitude"))?;
    let longitude = find_number(&value, LONGITUDE_KEYS)
        .ok_or_else(|| ProviderError::acquisition("Response has no longitude"))?;

    let position = Coordinates::new(latitude, longitude);
    if !position.is_valid() {
        return Err(ProviderError::acquisition(format!(
            "Position out of range: {}, {}",
            latitude, longitude
        )));
    }

    Ok(position)
}

/// First numeric field among `keys`; numeric strings are accepted too
fn find_number(value: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match value.get(*key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
