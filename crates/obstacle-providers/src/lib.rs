// # obstacle-providers
//
// Concrete geolocation and image capture providers for the obstacle registry.
//
// ## Geolocation
//
// - **FixedGeolocation**: one configured position (desk machines, tests)
// - **HttpGeolocation**: coarse position from a JSON endpoint
// - **DisabledGeolocation**: no fix; obstacles get the unknown sentinel
//
// ## Image Capture
//
// - **FsImageCapture**: imports a file chosen through a `MediaPicker`
//
// Every provider except `DisabledGeolocation` asks its `PermissionBroker`
// first, so a front end decides how consent is collected.

pub mod capture;
pub mod fixed;
pub mod http;

pub use capture::FsImageCapture;
pub use fixed::{DisabledGeolocation, FixedGeolocation};
pub use http::HttpGeolocation;

use obstacle_core::config::{GeolocationConfig, MediaConfig};
use obstacle_core::model::Coordinates;
use obstacle_core::traits::{
    GeolocationProvider, ImageCaptureProvider, MediaPicker, PermissionBroker,
};
use obstacle_core::Result;

use std::sync::Arc;
use std::time::Duration;

/// Build the geolocation provider described by `config`
pub fn build_geolocation(
    config: &GeolocationConfig,
    permissions: Arc<dyn PermissionBroker>,
) -> Result<Box<dyn GeolocationProvider>> {
    config.validate()?;

    let provider: Box<dyn GeolocationProvider> = match config {
        GeolocationConfig::Http { url, timeout_secs } => Box::new(HttpGeolocation::with_timeout(
            url.clone(),
            permissions,
            Duration::from_secs(*timeout_secs),
        )),
        GeolocationConfig::Fixed {
            latitude,
            longitude,
        } => Box::new(FixedGeolocation::new(
            Coordinates::new(*latitude, *longitude),
            permissions,
        )),
        GeolocationConfig::Disabled => Box::new(DisabledGeolocation),
    };

    tracing::info!("Geolocation provider: {}", provider.provider_name());
    Ok(provider)
}

/// Build the image capture provider for `config`
pub fn build_image_capture(
    config: &MediaConfig,
    picker: Arc<dyn MediaPicker>,
    permissions: Arc<dyn PermissionBroker>,
) -> Box<dyn ImageCaptureProvider> {
    Box::new(FsImageCapture::new(config.dir.clone(), picker, permissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacle_core::traits::StaticPermissions;

    #[test]
    fn test_build_each_geolocation_type() {
        let permissions: Arc<dyn PermissionBroker> = Arc::new(StaticPermissions::all());

        let configs = [
            (
                GeolocationConfig::Http {
                    url: "https://geo.example/json".to_string(),
                    timeout_secs: 5,
                },
                "http",
            ),
            (
                GeolocationConfig::Fixed {
                    latitude: 48.85,
                    longitude: 2.35,
                },
                "fixed",
            ),
            (GeolocationConfig::Disabled, "disabled"),
        ];

        for (config, name) in configs {
            let provider = build_geolocation(&config, permissions.clone()).unwrap();
            assert_eq!(provider.provider_name(), name);
        }
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = GeolocationConfig::Fixed {
            latitude: 123.0,
            longitude: 2.35,
        };
        assert!(build_geolocation(&config, Arc::new(StaticPermissions::all())).is_err());
    }
}
