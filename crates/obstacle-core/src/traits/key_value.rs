// # Key-Value Store Trait
//
// The generic persistent substrate under the obstacle store: string keys
// mapping to string values, each `set` durably replacing the previous value.
//
// ## Implementations
//
// - `FileKeyValueStore`: one file per key, atomic write-then-rename
// - `MemoryKeyValueStore`: in-process map, lost on restart

use async_trait::async_trait;

/// Trait for key-value store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Errors
///
/// Read failures are reported as `Error::StorageRead`, write failures as
/// `Error::StorageWrite`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored value
    /// - `Ok(None)`: Nothing has been written under `key`
    /// - `Err(Error)`: Storage error
    async fn get(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Replace the value stored under `key`
    ///
    /// Either the new value is fully stored or the old one is kept.
    async fn set(&self, key: &str, value: &str) -> Result<(), crate::Error>;
}
