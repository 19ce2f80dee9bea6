// # obstacle-core
//
// Core library for recording route obstacles offline.
//
// ## Architecture Overview
//
// This library provides the core functionality for the obstacle log:
// - **GeolocationProvider**: Trait for acquiring the device position
// - **ImageCaptureProvider**: Trait for picking or taking a photo
// - **PermissionBroker**: Trait for runtime permission prompts
// - **KeyValueStore**: Trait for the persistent key-value substrate
// - **ObstacleStore**: Trait for whole-collection persistence
// - **ObstacleRegistry**: Core component owning the collection and its invariants
// - **CreationFlow**: State machine for the "new obstacle" form
//
// ## Design Principles
//
// 1. **Single Owner**: Only the registry mutates or persists the collection
// 2. **Fail Safe**: Location and photo failures never abort creation
// 3. **All or Nothing**: A mutation that cannot be persisted is rolled back
// 4. **Library-First**: Front ends are thin; all rules live here

pub mod config;
pub mod error;
pub mod flow;
pub mod model;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{GeolocationConfig, MediaConfig, ObstaclesConfig, RegistryConfig, StoreConfig};
pub use error::{Error, ProviderError, Result};
pub use flow::{CreationFlow, FlowError, FlowState};
pub use model::{Coordinates, ImageChoice, ImageRef, Obstacle, ObstacleId};
pub use registry::{ObstacleRegistry, RegistryEvent, Snapshot};
pub use state::{FileKeyValueStore, KvObstacleStore, MemoryKeyValueStore};
pub use traits::{
    GeolocationProvider, ImageCaptureProvider, KeyValueStore, ObstacleStore, PermissionBroker,
};
