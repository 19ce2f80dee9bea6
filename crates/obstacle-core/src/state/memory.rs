// # Memory Key-Value Store
//
// In-memory implementation of KeyValueStore.
//
// ## Purpose
//
// A fast substrate that doesn't persist across restarts. Useful for tests
// and for trying the app without touching the filesystem.
//
// ## Crash Behavior
//
// - All obstacles are lost on restart/crash
// - No recovery possible (state is in-memory only)

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::KeyValueStore;

/// In-memory key-value store
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the registry wrote.
///
/// # Example
///
/// ```rust
/// use obstacle_core::state::MemoryKeyValueStore;
/// use obstacle_core::traits::KeyValueStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryKeyValueStore::new();
///     store.set("obstacles", "[]").await?;
///     assert_eq!(store.get("obstacles").await?.as_deref(), Some("[]"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of keys in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
