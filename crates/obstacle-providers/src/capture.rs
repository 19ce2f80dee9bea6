//! Filesystem-backed image capture
//!
//! A [`MediaPicker`] front end names a file; [`FsImageCapture`] checks the
//! matching permission, validates the file and copies it into the media
//! directory so the stored reference stays valid after the original moves.

use obstacle_core::error::ProviderError;
use obstacle_core::model::ImageRef;
use obstacle_core::traits::permissions::ensure_granted;
use obstacle_core::traits::{
    ImageCaptureProvider, ImageSource, MediaPicker, Permission, PermissionBroker,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// File extensions accepted as photos (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "webp", "gif"];

/// Image provider that imports picked files into a media directory
pub struct FsImageCapture {
    media_dir: PathBuf,
    picker: Arc<dyn MediaPicker>,
    permissions: Arc<dyn PermissionBroker>,
    sequence: AtomicU64,
}

impl FsImageCapture {
    /// Create a provider storing imported photos under `media_dir`
    pub fn new(
        media_dir: impl Into<PathBuf>,
        picker: Arc<dyn MediaPicker>,
        permissions: Arc<dyn PermissionBroker>,
    ) -> Self {
        Self {
            media_dir: media_dir.into(),
            picker,
            permissions,
            sequence: AtomicU64::new(0),
        }
    }

    async fn acquire(&self, source: ImageSource) -> Result<ImageRef, ProviderError> {
        let permission = match source {
            ImageSource::Library => Permission::MediaLibrary,
            ImageSource::Camera => Permission::Camera,
        };
        ensure_granted(self.permissions.as_ref(), permission).await?;

        let picked = self.picker.choose(source).await.ok_or(ProviderError::Cancelled)?;
        let extension = image_extension(&picked).ok_or_else(|| {
            ProviderError::acquisition(format!("{} is not a supported image", picked.display()))
        })?;

        let metadata = tokio::fs::metadata(&picked).await.map_err(|e| {
            ProviderError::acquisition(format!("Cannot read {}: {}", picked.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ProviderError::acquisition(format!(
                "{} is not a file",
                picked.display()
            )));
        }

        tokio::fs::create_dir_all(&self.media_dir).await.map_err(|e| {
            ProviderError::acquisition(format!(
                "Cannot create media directory {}: {}",
                self.media_dir.display(),
                e
            ))
        })?;

        let target = self.media_dir.join(self.unique_name(&extension));
        tokio::fs::copy(&picked, &target).await.map_err(|e| {
            ProviderError::acquisition(format!("Failed to import {}: {}", picked.display(), e))
        })?;

        tracing::debug!("Imported {} as {}", picked.display(), target.display());
        Ok(ImageRef::new(target))
    }

    fn unique_name(&self, extension: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("obstacle-{}-{}.{}", millis, sequence, extension)
    }
}

#[async_trait::async_trait]
impl ImageCaptureProvider for FsImageCapture {
    async fn pick_from_library(&self) -> Result<ImageRef, ProviderError> {
        self.acquire(ImageSource::Library).await
    }

    async fn capture_from_camera(&self) -> Result<ImageRef, ProviderError> {
        self.acquire(ImageSource::Camera).await
    }
}

/// Lowercased extension of `path` if it names a supported image type
fn image_extension(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacle_core::traits::StaticPermissions;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Picker returning a fixed answer and remembering the sources asked for
    struct FixedPicker {
        answer: Option<PathBuf>,
        asked: Mutex<Vec<ImageSource>>,
    }

    impl FixedPicker {
        fn new(answer: Option<PathBuf>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                asked: Mutex::new(Vec::new()),
            })
        }

        fn asked(&self) -> Vec<ImageSource> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl MediaPicker for FixedPicker {
        async fn choose(&self, source: ImageSource) -> Option<PathBuf> {
            self.asked.lock().unwrap().push(source);
            self.answer.clone()
        }
    }

    #[tokio::test]
    async fn test_library_photo_is_imported() {
        let outside = tempdir().unwrap();
        let media = tempdir().unwrap();
        let original = outside.path().join("Pole.JPG");
        std::fs::write(&original, b"jpeg bytes").unwrap();

        let picker = FixedPicker::new(Some(original.clone()));
        let capture = FsImageCapture::new(
            media.path(),
            picker.clone(),
            Arc::new(StaticPermissions::all()),
        );

        let image = capture.pick_from_library().await.unwrap();

        assert!(image.path().starts_with(media.path()));
        assert_eq!(image.path().extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(image.path()).unwrap(), b"jpeg bytes");
        assert_eq!(picker.asked(), vec![ImageSource::Library]);

        // Importing the same file twice never overwrites
        let again = capture.pick_from_library().await.unwrap();
        assert_ne!(image, again);
    }

    #[tokio::test]
    async fn test_cancelled_picker() {
        let media = tempdir().unwrap();
        let capture = FsImageCapture::new(
            media.path(),
            FixedPicker::new(None),
            Arc::new(StaticPermissions::all()),
        );

        assert_eq!(
            capture.capture_from_camera().await,
            Err(ProviderError::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_permission_checked_per_source() {
        let outside = tempdir().unwrap();
        let media = tempdir().unwrap();
        let original = outside.path().join("gate.png");
        std::fs::write(&original, b"png bytes").unwrap();

        let picker = FixedPicker::new(Some(original));
        let capture = FsImageCapture::new(
            media.path(),
            picker.clone(),
            Arc::new(StaticPermissions::granting([Permission::MediaLibrary])),
        );

        assert_eq!(
            capture.capture_from_camera().await,
            Err(ProviderError::PermissionDenied(Permission::Camera))
        );
        // Denied before the picker was shown
        assert!(picker.asked().is_empty());

        assert!(capture.pick_from_library().await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_unsupported_or_missing_files() {
        let outside = tempdir().unwrap();
        let media = tempdir().unwrap();
        let notes = outside.path().join("notes.txt");
        std::fs::write(&notes, b"text").unwrap();

        for picked in [notes, outside.path().join("missing.jpg")] {
            let capture = FsImageCapture::new(
                media.path(),
                FixedPicker::new(Some(picked)),
                Arc::new(StaticPermissions::all()),
            );
            assert!(matches!(
                capture.pick_from_library().await,
                Err(ProviderError::AcquisitionFailure(_))
            ));
        }

        assert_eq!(std::fs::read_dir(media.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(Path::new("a/b.HEIC")).as_deref(), Some("heic"));
        assert_eq!(image_extension(Path::new("a/b.webp")).as_deref(), Some("webp"));
        assert_eq!(image_extension(Path::new("a/b.pdf")), None);
        assert_eq!(image_extension(Path::new("a/b")), None);
    }
}
