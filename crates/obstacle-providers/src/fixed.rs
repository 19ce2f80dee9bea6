//! Static geolocation providers
//!
//! [`FixedGeolocation`] reports one configured position, useful on a desk
//! machine or in tests. [`DisabledGeolocation`] never has a fix.

use obstacle_core::error::ProviderError;
use obstacle_core::model::Coordinates;
use obstacle_core::traits::permissions::ensure_granted;
use obstacle_core::traits::{GeolocationProvider, Permission, PermissionBroker};

use std::sync::Arc;

/// Always reports the same position once location is permitted
pub struct FixedGeolocation {
    position: Coordinates,
    permissions: Arc<dyn PermissionBroker>,
}

impl FixedGeolocation {
    /// Create a provider for `position`
    pub fn new(position: Coordinates, permissions: Arc<dyn PermissionBroker>) -> Self {
        Self {
            position,
            permissions,
        }
    }
}

#[async_trait::async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Result<Coordinates, ProviderError> {
        ensure_granted(self.permissions.as_ref(), Permission::Location).await?;
        Ok(self.position)
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

/// No location source configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeolocation;

#[async_trait::async_trait]
impl GeolocationProvider for DisabledGeolocation {
    async fn current_position(&self) -> Result<Coordinates, ProviderError> {
        Err(ProviderError::acquisition("location disabled"))
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacle_core::traits::StaticPermissions;

    #[tokio::test]
    async fn test_fixed_position() {
        let provider = FixedGeolocation::new(
            Coordinates::new(48.85, 2.35),
            Arc::new(StaticPermissions::all()),
        );
        assert_eq!(
            provider.current_position().await,
            Ok(Coordinates::new(48.85, 2.35))
        );
    }

    #[tokio::test]
    async fn test_fixed_position_needs_permission() {
        let provider = FixedGeolocation::new(
            Coordinates::new(48.85, 2.35),
            Arc::new(StaticPermissions::none()),
        );
        assert_eq!(
            provider.current_position().await,
            Err(ProviderError::PermissionDenied(Permission::Location))
        );
    }

    #[tokio::test]
    async fn test_disabled() {
        assert!(matches!(
            DisabledGeolocation.current_position().await,
            Err(ProviderError::AcquisitionFailure(_))
        ));
    }
}
