// # Geolocation Provider Trait
//
// Defines the interface for acquiring the device position.
//
// ## Implementations
//
// - Fixed position, HTTP lookup, disabled: `obstacle-providers` crate
// - Future: platform location services
//
// ## Outcomes
//
// - `Ok(Coordinates)`: a real fix
// - `Err(ProviderError::PermissionDenied)`: the user refused location access
// - `Err(ProviderError::AcquisitionFailure)`: radio off, timeout, bad response
//
// None of these abort obstacle creation. The registry falls back to
// `Coordinates::UNKNOWN` on any error.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::Coordinates;

/// Trait for geolocation provider implementations
///
/// Implementations must request the location permission themselves (see
/// [`ensure_granted`](crate::traits::permissions::ensure_granted)) before
/// touching the sensor.
///
/// # Responsibilities
///
/// - Ask for permission if not already granted
/// - Produce one position per call
///
/// A provider must not retry, cache stale fixes silently, or decide what the
/// caller does on failure. That is owned by the registry.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Acquire the current position
    async fn current_position(&self) -> Result<Coordinates, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
