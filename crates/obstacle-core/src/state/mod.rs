// # Store Implementations
//
// Key-value substrates and the obstacle store built on top of them.

pub mod file;
pub mod memory;
pub mod obstacle;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use obstacle::{KvObstacleStore, OBSTACLES_KEY};

use crate::config::StoreConfig;
use crate::traits::ObstacleStore;

/// Create the obstacle store described by `config`
pub async fn open_store(config: &StoreConfig) -> Result<Box<dyn ObstacleStore>, crate::Error> {
    config.validate()?;

    match config {
        StoreConfig::File { dir } => {
            let substrate = FileKeyValueStore::new(dir).await?;
            Ok(Box::new(KvObstacleStore::new(substrate)))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; obstacles will not survive a restart");
            Ok(Box::new(KvObstacleStore::new(MemoryKeyValueStore::new())))
        }
    }
}
