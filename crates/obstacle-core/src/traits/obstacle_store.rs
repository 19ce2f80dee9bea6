// # Obstacle Store Trait
//
// Whole-collection persistence for obstacles.
//
// Every mutation rewrites the full collection. For a single user's list of
// route obstacles this is small, and it keeps the persisted blob trivially
// consistent. An indexed store keyed by id can replace an implementation
// later without changing this contract.

use async_trait::async_trait;

use crate::model::Obstacle;

/// Trait for obstacle store implementations
///
/// # Trust Level
///
/// Stores perform I/O only. They never validate obstacles, assign ids, or
/// decide when to write; the registry owns all of that and is the sole
/// caller of [`ObstacleStore::write_all`].
#[async_trait]
pub trait ObstacleStore: Send + Sync {
    /// Read the persisted collection
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Obstacle>)`: The collection in stored order (empty if never written)
    /// - `Err(Error::StorageRead)`: The blob could not be read or decoded
    async fn read_all(&self) -> Result<Vec<Obstacle>, crate::Error>;

    /// Atomically replace the persisted collection
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The new snapshot is durable
    /// - `Err(Error::StorageWrite)`: Nothing was replaced
    async fn write_all(&self, obstacles: &[Obstacle]) -> Result<(), crate::Error>;
}
