// # Image Capture Provider Trait
//
// Defines the interface for attaching a photo to a new obstacle.
//
// ## Outcomes
//
// - `Ok(ImageRef)`: a local reference the registry stores as-is
// - `Err(ProviderError::PermissionDenied)`: library or camera access refused
// - `Err(ProviderError::Cancelled)`: the user closed the picker
// - `Err(ProviderError::AcquisitionFailure)`: unreadable or unsupported file
//
// All outcomes other than `Ok` leave the obstacle without an image.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ProviderError;
use crate::model::ImageRef;

/// Where a picker should look for a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Existing photo library
    Library,
    /// Freshly taken camera photo
    Camera,
}

/// Trait for image capture provider implementations
#[async_trait]
pub trait ImageCaptureProvider: Send + Sync {
    /// Let the user choose an existing photo
    async fn pick_from_library(&self) -> Result<ImageRef, ProviderError>;

    /// Let the user take a new photo
    async fn capture_from_camera(&self) -> Result<ImageRef, ProviderError>;
}

/// User-facing chooser behind an image provider
///
/// Returns the selected file, or `None` when the user cancelled. This is the
/// piece a front end implements (file dialog, prompt, camera UI).
#[async_trait]
pub trait MediaPicker: Send + Sync {
    /// Ask the user for a file from `source`
    async fn choose(&self, source: ImageSource) -> Option<PathBuf>;
}
