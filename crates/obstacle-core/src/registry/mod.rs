//! Obstacle registry
//!
//! The ObstacleRegistry is responsible for:
//! - Owning the canonical in-memory collection
//! - Validating new obstacles before any side effect
//! - Acquiring position and photo through the providers
//! - Persisting the whole collection after every mutation
//! - Rolling back in-memory state when persistence fails
//!
//! ## Architecture
//!
//! ```text
//!   create(title, description, image)
//!         │
//!         ▼
//!   ┌────────────┐   invalid
//!   │  validate  │──────────────► Error::Validation
//!   └────────────┘
//!         │
//!         ▼
//!   ┌──────────────────────┐   ┌──────────────────────┐
//!   │ GeolocationProvider  │   │ ImageCaptureProvider │   failures absorbed:
//!   │ (position or 0,0)    │   │ (photo or none)      │   RegistryEvent only
//!   └──────────────────────┘   └──────────────────────┘
//!         │
//!         ▼
//!   ┌──────────────────────────────────────┐
//!   │ lock → assign id → append → write_all │──► Error::Persist + rollback
//!   └──────────────────────────────────────┘
//!         │
//!         ▼
//!   snapshot + RegistryEvent::Created
//! ```
//!
//! ## Concurrency
//!
//! The read-modify-write of the collection and the following persist run
//! under one async mutex, so racing calls serialize. Provider calls happen
//! before the lock is taken.

mod id;

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, ProviderError, Result};
use crate::model::{Coordinates, ImageChoice, ImageRef, Obstacle, ObstacleId};
use crate::traits::{GeolocationProvider, ImageCaptureProvider, ObstacleStore};
use id::IdGenerator;

/// Read-only view of the collection at one point in time
pub type Snapshot = Arc<Vec<Obstacle>>;

/// Events emitted by the ObstacleRegistry
///
/// These are informational. Front ends use them to show notices such as
/// "location unavailable"; nothing here requires a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Collection loaded from the store
    Loaded { count: usize },

    /// Loading failed; the collection was reset to empty
    LoadFailed { error: String },

    /// Obstacle created and persisted
    Created { id: ObstacleId },

    /// Obstacle deleted and persisted
    Deleted { id: ObstacleId },

    /// Delete requested for an id that is not in the collection
    DeleteSkipped { id: ObstacleId },

    /// No position could be acquired; the sentinel was used
    LocationUnavailable { reason: ProviderError },

    /// A photo was requested but none was attached
    ImageSkipped { reason: ProviderError },

    /// A mutation could not be persisted and was rolled back
    PersistFailed { error: String },
}

/// Core obstacle registry
///
/// ## Lifecycle
///
/// 1. Create with [`ObstacleRegistry::new()`]
/// 2. Call [`ObstacleRegistry::load()`] once at startup
/// 3. Use [`create`](ObstacleRegistry::create),
///    [`delete`](ObstacleRegistry::delete) and
///    [`list`](ObstacleRegistry::list)
pub struct ObstacleRegistry {
    /// Position source used at creation time
    geolocation: Box<dyn GeolocationProvider>,

    /// Photo source used at creation time
    images: Box<dyn ImageCaptureProvider>,

    /// Whole-collection persistence
    store: Box<dyn ObstacleStore>,

    /// Canonical collection and id allocator
    state: Mutex<Collection>,

    /// Latest snapshot for subscribers
    snapshot_tx: watch::Sender<Snapshot>,

    /// Event sender for front ends
    event_tx: mpsc::Sender<RegistryEvent>,
}

#[derive(Debug, Default)]
struct Collection {
    obstacles: Vec<Obstacle>,
    ids: IdGenerator,
}

impl ObstacleRegistry {
    /// Create a new registry with an empty collection
    ///
    /// # Returns
    ///
    /// A tuple of (registry, event_receiver) where event_receiver yields registry events
    pub fn new(
        geolocation: Box<dyn GeolocationProvider>,
        images: Box<dyn ImageCaptureProvider>,
        store: Box<dyn ObstacleStore>,
        config: &RegistryConfig,
    ) -> Result<(Self, mpsc::Receiver<RegistryEvent>)> {
        config.validate()?;

        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let (snapshot_tx, _) = watch::channel(Snapshot::default());

        let registry = Self {
            geolocation,
            images,
            store,
            state: Mutex::new(Collection::default()),
            snapshot_tx,
            event_tx,
        };

        Ok((registry, event_rx))
    }

    /// Replace the in-memory collection with the persisted one
    ///
    /// # Returns
    ///
    /// - `Ok(count)`: Number of obstacles loaded (0 if nothing was ever saved)
    /// - `Err(Error::Load)`: The store could not be read; the collection is now empty
    pub async fn load(&self) -> Result<usize> {
        let mut state = self.state.lock().await;

        match self.store.read_all().await {
            Ok(obstacles) => {
                let (obstacles, reassigned) = state.ids.reassign_duplicates(obstacles, Utc::now());
                if reassigned > 0 {
                    warn!("Re-keyed {} obstacle(s) with duplicate ids", reassigned);

                    // Persist the repair so the new ids survive a restart
                    if let Err(e) = self.store.write_all(&obstacles).await {
                        warn!("Failed to persist re-keyed ids: {}", e);
                    }
                }

                state.ids.observe(&obstacles);
                state.obstacles = obstacles;
                let count = state.obstacles.len();
                self.publish(&state);

                info!("Loaded {} obstacle(s)", count);
                self.emit_event(RegistryEvent::Loaded { count });
                Ok(count)
            }
            Err(e) => {
                state.obstacles.clear();
                self.publish(&state);

                warn!("Failed to load obstacles, starting empty: {}", e);
                self.emit_event(RegistryEvent::LoadFailed {
                    error: e.to_string(),
                });
                Err(Error::Load(e.to_string()))
            }
        }
    }

    /// Record a new obstacle
    ///
    /// Title and description must not be blank. This is checked before any
    /// permission prompt; the text itself is kept exactly as given.
    ///
    /// Location and photo failures are not errors: the obstacle gets
    /// [`Coordinates::UNKNOWN`] and/or no image, and a [`RegistryEvent`]
    /// reports why.
    ///
    /// # Returns
    ///
    /// - `Ok(Obstacle)`: The created and persisted obstacle
    /// - `Err(Error::Validation)`: Empty title or description; nothing changed
    /// - `Err(Error::Persist)`: The write failed; the collection is unchanged
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        image: ImageChoice,
    ) -> Result<Obstacle> {
        validate_text(title, description)?;

        let position = self.acquire_position().await;
        let image = self.acquire_image(image).await;

        let mut state = self.state.lock().await;
        let id = {
            let Collection { obstacles, ids } = &mut *state;
            ids.next(obstacles.as_slice(), Utc::now())
        };

        let obstacle = Obstacle::new(
            id.clone(),
            title.to_string(),
            description.to_string(),
            position,
            image,
        );
        state.obstacles.push(obstacle.clone());

        if let Err(e) = self.store.write_all(&state.obstacles).await {
            state.obstacles.pop();
            return Err(self.persist_failed("create", e));
        }

        self.publish(&state);
        info!("Created obstacle {} ({})", id, obstacle.title());
        self.emit_event(RegistryEvent::Created { id });
        Ok(obstacle)
    }

    /// Remove the obstacle with `id`
    ///
    /// Deleting an id that is not in the collection is a no-op.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The obstacle was removed and the collection persisted
    /// - `Ok(false)`: No obstacle had this id
    /// - `Err(Error::Persist)`: The write failed; the obstacle is still present
    pub async fn delete(&self, id: &ObstacleId) -> Result<bool> {
        let mut state = self.state.lock().await;

        let Some(index) = state.obstacles.iter().position(|o| o.id() == id) else {
            debug!("Delete skipped, no obstacle {}", id);
            self.emit_event(RegistryEvent::DeleteSkipped { id: id.clone() });
            return Ok(false);
        };

        let removed = state.obstacles.remove(index);

        if let Err(e) = self.store.write_all(&state.obstacles).await {
            state.obstacles.insert(index, removed);
            return Err(self.persist_failed("delete", e));
        }

        self.publish(&state);
        info!("Deleted obstacle {}", id);
        self.emit_event(RegistryEvent::Deleted { id: id.clone() });
        Ok(true)
    }

    /// Snapshot of the collection in insertion order
    pub async fn list(&self) -> Vec<Obstacle> {
        self.state.lock().await.obstacles.clone()
    }

    /// Look up a single obstacle
    pub async fn get(&self, id: &ObstacleId) -> Option<Obstacle> {
        let state = self.state.lock().await;
        state.obstacles.iter().find(|o| o.id() == id).cloned()
    }

    /// Number of obstacles in the collection
    pub async fn len(&self) -> usize {
        self.state.lock().await.obstacles.len()
    }

    /// Check if the collection is empty
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.obstacles.is_empty()
    }

    /// Stream of snapshots, starting with the current one
    ///
    /// A new snapshot is published after load and after every successful
    /// mutation. Rolled-back mutations publish nothing.
    pub fn subscribe(&self) -> WatchStream<Snapshot> {
        WatchStream::new(self.snapshot_tx.subscribe())
    }

    async fn acquire_position(&self) -> Coordinates {
        match self.geolocation.current_position().await {
            Ok(position) => {
                debug!(
                    "Position from {}: {}",
                    self.geolocation.provider_name(),
                    position
                );
                position
            }
            Err(reason) => {
                warn!(
                    "Location unavailable from {}: {}",
                    self.geolocation.provider_name(),
                    reason
                );
                self.emit_event(RegistryEvent::LocationUnavailable { reason });
                Coordinates::UNKNOWN
            }
        }
    }

    async fn acquire_image(&self, choice: ImageChoice) -> Option<ImageRef> {
        let outcome = match choice {
            ImageChoice::None => return None,
            ImageChoice::Library => self.images.pick_from_library().await,
            ImageChoice::Camera => self.images.capture_from_camera().await,
        };

        match outcome {
            Ok(image) => {
                debug!("Attached image {}", image);
                Some(image)
            }
            Err(reason) => {
                warn!("No image attached: {}", reason);
                self.emit_event(RegistryEvent::ImageSkipped { reason });
                None
            }
        }
    }

    fn persist_failed(&self, operation: &str, error: Error) -> Error {
        warn!("Failed to persist {}, rolled back: {}", operation, error);
        self.emit_event(RegistryEvent::PersistFailed {
            error: error.to_string(),
        });
        Error::Persist(error.to_string())
    }

    fn publish(&self, state: &Collection) {
        self.snapshot_tx
            .send_replace(Arc::new(state.obstacles.clone()));
    }

    /// Emit an event (non-blocking)
    ///
    /// When the channel is full the event is dropped and a warning logged.
    fn emit_event(&self, event: RegistryEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Event channel full, dropping event: {:?}", event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // Nobody is listening
            }
        }
    }
}

/// Check the required text fields
///
/// Blank (empty or whitespace-only) fields fail with `Error::Validation`
/// naming the first one. Accepted text is stored as typed.
pub fn validate_text(title: &str, description: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title is required"));
    }
    if description.trim().is_empty() {
        return Err(Error::validation("description is required"));
    }

    Ok(())
}
