//! Test doubles and common utilities for registry contract tests
//!
//! The doubles are cheap to clone and share their counters, so a test can
//! hand one copy to the registry and keep another to inspect calls.

#![allow(dead_code)]

use obstacle_core::error::{Error, ProviderError, Result};
use obstacle_core::model::{Coordinates, ImageRef};
use obstacle_core::registry::{ObstacleRegistry, RegistryEvent};
use obstacle_core::state::{KvObstacleStore, MemoryKeyValueStore, OBSTACLES_KEY};
use obstacle_core::traits::{GeolocationProvider, ImageCaptureProvider, KeyValueStore};
use obstacle_core::{ImageChoice, Obstacle, RegistryConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A geolocation provider returning a fixed outcome
#[derive(Clone)]
pub struct ScriptedGeolocation {
    outcome: std::result::Result<Coordinates, ProviderError>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGeolocation {
    /// Location granted at the given position
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_outcome(Ok(Coordinates::new(latitude, longitude)))
    }

    /// Location permission refused
    pub fn denied() -> Self {
        Self::with_outcome(Err(ProviderError::PermissionDenied(
            obstacle_core::traits::Permission::Location,
        )))
    }

    /// Sensor error
    pub fn failing() -> Self {
        Self::with_outcome(Err(ProviderError::acquisition("GPS timeout")))
    }

    pub fn with_outcome(outcome: std::result::Result<Coordinates, ProviderError>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current_position() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GeolocationProvider for ScriptedGeolocation {
    async fn current_position(&self) -> std::result::Result<Coordinates, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// An image provider returning fixed outcomes per source
#[derive(Clone)]
pub struct ScriptedImages {
    library: std::result::Result<ImageRef, ProviderError>,
    camera: std::result::Result<ImageRef, ProviderError>,
    library_calls: Arc<AtomicUsize>,
    camera_calls: Arc<AtomicUsize>,
}

impl ScriptedImages {
    pub fn new(
        library: std::result::Result<ImageRef, ProviderError>,
        camera: std::result::Result<ImageRef, ProviderError>,
    ) -> Self {
        Self {
            library,
            camera,
            library_calls: Arc::new(AtomicUsize::new(0)),
            camera_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Both sources yield a photo
    pub fn returning(path: &str) -> Self {
        Self::new(Ok(ImageRef::new(path)), Ok(ImageRef::new(path)))
    }

    /// The user closes every picker
    pub fn cancelled() -> Self {
        Self::new(Err(ProviderError::Cancelled), Err(ProviderError::Cancelled))
    }

    /// Every permission refused
    pub fn denied() -> Self {
        use obstacle_core::traits::Permission;
        Self::new(
            Err(ProviderError::PermissionDenied(Permission::MediaLibrary)),
            Err(ProviderError::PermissionDenied(Permission::Camera)),
        )
    }

    pub fn library_calls(&self) -> usize {
        self.library_calls.load(Ordering::SeqCst)
    }

    pub fn camera_calls(&self) -> usize {
        self.camera_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageCaptureProvider for ScriptedImages {
    async fn pick_from_library(&self) -> std::result::Result<ImageRef, ProviderError> {
        self.library_calls.fetch_add(1, Ordering::SeqCst);
        self.library.clone()
    }

    async fn capture_from_camera(&self) -> std::result::Result<ImageRef, ProviderError> {
        self.camera_calls.fetch_add(1, Ordering::SeqCst);
        self.camera.clone()
    }
}

/// A key-value store whose reads and writes can be made to fail
#[derive(Clone, Default)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl FlakyKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get the number of successful set() calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw persisted blob
    pub async fn blob(&self) -> Option<String> {
        self.inner.get(OBSTACLES_KEY).await.unwrap()
    }

    /// Seed the persisted blob directly
    pub async fn seed(&self, blob: &str) {
        self.inner.set(OBSTACLES_KEY, blob).await.unwrap();
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::storage_read("simulated read failure"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage_write("simulated disk full"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}

/// Build a registry over the given doubles
pub fn registry_with(
    geolocation: &ScriptedGeolocation,
    images: &ScriptedImages,
    store: &FlakyKeyValueStore,
) -> (ObstacleRegistry, mpsc::Receiver<RegistryEvent>) {
    ObstacleRegistry::new(
        Box::new(geolocation.clone()),
        Box::new(images.clone()),
        Box::new(KvObstacleStore::new(store.clone())),
        &RegistryConfig::default(),
    )
    .expect("registry construction succeeds")
}

/// Create an obstacle without a photo, panicking on failure
pub async fn create_plain(registry: &ObstacleRegistry, title: &str) -> Obstacle {
    registry
        .create(title, &format!("{title} on the route"), ImageChoice::None)
        .await
        .expect("create succeeds")
}

/// Drain every event currently buffered
pub fn drain(events: &mut mpsc::Receiver<RegistryEvent>) -> Vec<RegistryEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Two persisted obstacles with ids `A` and `B`
pub const TWO_OBSTACLES: &str = r#"[
    {"id":"A","title":"Pole","description":"Low overhead cable","latitude":48.85,"longitude":2.35,"imageUri":""},
    {"id":"B","title":"Gate","description":"Locked farm gate","latitude":45.76,"longitude":4.84,"imageUri":"/media/gate.jpg"}
]"#;
