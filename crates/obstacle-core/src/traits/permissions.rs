// # Permission Broker
//
// Runtime permissions gate the location sensor, the photo library and the
// camera. Providers ask the broker before touching a capability:
//
// 1. `status()` returns `Granted` → proceed
// 2. otherwise `request()` prompts the user (at most once per answer)
// 3. anything other than `Granted` → `ProviderError::PermissionDenied`
//
// The broker is platform glue. The core ships `StaticPermissions` for tests
// and headless use; front ends supply an interactive implementation.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;

use crate::error::ProviderError;

/// A runtime-gated capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Foreground location
    Location,
    /// Photo library read access
    MediaLibrary,
    /// Camera capture
    Camera,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Location => "location",
            Self::MediaLibrary => "photo library",
            Self::Camera => "camera",
        })
    }
}

/// Current answer for a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user allowed access
    Granted,
    /// The user refused access
    Denied,
    /// The user has not been asked yet
    Undetermined,
}

impl PermissionStatus {
    /// Whether access is allowed
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Trait for permission broker implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait PermissionBroker: Send + Sync {
    /// Current status without prompting
    async fn status(&self, permission: Permission) -> PermissionStatus;

    /// Prompt the user if needed and return the resulting status
    async fn request(&self, permission: Permission) -> PermissionStatus;
}

/// Make sure `permission` is granted, prompting only when it is not
///
/// Providers call this before every acquisition.
pub async fn ensure_granted(
    broker: &dyn PermissionBroker,
    permission: Permission,
) -> Result<(), ProviderError> {
    if broker.status(permission).await.is_granted() {
        return Ok(());
    }

    tracing::debug!("Requesting {} permission", permission);
    if broker.request(permission).await.is_granted() {
        Ok(())
    } else {
        tracing::warn!("{} permission denied", permission);
        Err(ProviderError::PermissionDenied(permission))
    }
}

/// Broker with a fixed set of granted permissions
///
/// Requests never prompt; anything not in the set is denied.
///
/// # Example
///
/// ```rust
/// use obstacle_core::traits::{Permission, StaticPermissions};
///
/// let permissions = StaticPermissions::granting([Permission::Location]);
/// assert!(permissions.grants(Permission::Location));
/// assert!(!permissions.grants(Permission::Camera));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<Permission>,
}

impl StaticPermissions {
    /// Grant every permission
    pub fn all() -> Self {
        Self::granting([
            Permission::Location,
            Permission::MediaLibrary,
            Permission::Camera,
        ])
    }

    /// Deny every permission
    pub fn none() -> Self {
        Self::default()
    }

    /// Grant exactly the given permissions
    pub fn granting(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: permissions.into_iter().collect(),
        }
    }

    /// Whether `permission` is granted
    pub fn grants(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}

#[async_trait]
impl PermissionBroker for StaticPermissions {
    async fn status(&self, permission: Permission) -> PermissionStatus {
        if self.grants(permission) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn request(&self, permission: Permission) -> PermissionStatus {
        self.status(permission).await
    }
}
